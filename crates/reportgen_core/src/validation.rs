use std::path::{Path, PathBuf};

/// Largest upload the pipeline service accepts (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const MEDIA_TEXT: &str = "text/plain";
const MEDIA_PDF: &str = "application/pdf";
const MEDIA_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const ACCEPTED: &[(&str, &str)] = &[("txt", MEDIA_TEXT), ("pdf", MEDIA_PDF), ("docx", MEDIA_DOCX)];

/// A user-selected file pending submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub name: String,
    /// Media type as declared by whoever selected the file, if any.
    pub media_type: Option<String>,
    pub size: u64,
}

impl FileDescriptor {
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        media_type: Option<String>,
        size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            media_type,
            size,
        }
    }

    /// Describe a file by path alone; the media type is guessed from the extension.
    pub fn from_path(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = media_type_for_name(&name).map(ToOwned::to_owned);
        Self {
            path,
            name,
            media_type,
            size,
        }
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unsupported file type for {name}: only .txt, .pdf and .docx are accepted")]
    UnsupportedType {
        name: String,
        media_type: Option<String>,
    },
    #[error("file is too large ({size} bytes, max {max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

/// Media type for a filename with an accepted extension.
pub fn media_type_for_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?;
    ACCEPTED
        .iter()
        .find(|(accepted, _)| accepted.eq_ignore_ascii_case(ext))
        .map(|(_, media)| *media)
}

/// Checks size first, then declared type or extension.
pub fn validate_file(file: &FileDescriptor) -> Result<(), ValidationError> {
    if file.size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size: file.size,
            max: MAX_UPLOAD_BYTES,
        });
    }

    let type_ok = file
        .media_type
        .as_deref()
        .map(|declared| {
            let essence = declared.split(';').next().unwrap_or(declared).trim();
            ACCEPTED
                .iter()
                .any(|(_, media)| media.eq_ignore_ascii_case(essence))
        })
        .unwrap_or(false);
    let ext_ok = file
        .extension()
        .map(|ext| ACCEPTED.iter().any(|(accepted, _)| *accepted == ext))
        .unwrap_or(false);

    if type_ok || ext_ok {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedType {
            name: file.name.clone(),
            media_type: file.media_type.clone(),
        })
    }
}
