use std::fs;

use reportgen_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("reports");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn artifact_bytes_are_written_exactly_and_replaced() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("reports"));

    let markdown = "# Title\n\nBody with ünïcode\n";
    let first = writer
        .write("blockchain_scalability_solutions.md", markdown.as_bytes())
        .unwrap();
    assert_eq!(first.file_name().unwrap(), "blockchain_scalability_solutions.md");
    assert_eq!(fs::read(&first).unwrap(), markdown.as_bytes());

    let second = writer
        .write("blockchain_scalability_solutions.md", b"second")
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "second");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("report.md", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("report.md").exists());
}

#[test]
fn path_like_names_are_refused() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    for name in ["../escape.md", "nested/report.md", "", ".."] {
        assert!(
            matches!(writer.write(name, b"x"), Err(PersistError::InvalidFilename(_))),
            "{name}"
        );
    }
}

#[test]
fn replacing_an_artifact_leaves_only_the_new_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    let target = temp.path().join("report.html");
    fs::write(&target, "<p>old</p>").unwrap();
    let before = fs::metadata(&target).unwrap().len();

    let written = writer.write("report.html", b"<p>new report</p>").unwrap();

    assert_eq!(written, target);
    assert_ne!(fs::metadata(&target).unwrap().len(), before);
    assert_eq!(fs::read_to_string(&target).unwrap(), "<p>new report</p>");
    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}
