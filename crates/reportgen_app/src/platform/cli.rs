//! Command-line surface of `reportgen`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reportgen_core::ExportFormat;

/// Turn a document and a topic into a research report via the pipeline service.
#[derive(Debug, Parser)]
#[command(name = "reportgen", version)]
pub struct Cli {
    /// Config file (RON). Defaults to `./reportgen.ron` when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a document, follow the pipeline stages and export the report.
    Generate(GenerateArgs),
    /// Check that the pipeline service is reachable.
    Health(HealthArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Source document (.txt, .pdf or .docx, at most 10 MiB).
    #[arg(long)]
    pub file: PathBuf,

    /// Research topic.
    #[arg(long)]
    pub topic: String,

    /// Which artifacts to write once the report is ready.
    #[arg(long, value_enum, default_value_t = FormatChoice::Both)]
    pub format: FormatChoice,

    /// Directory for exported artifacts.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Pipeline process endpoint, overriding the config.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Print the HTML report after it is ready.
    #[arg(long)]
    pub view: bool,

    /// Cancel the request if it has not finished after this many seconds.
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Args)]
pub struct HealthArgs {
    /// Pipeline process endpoint, overriding the config.
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatChoice {
    Markdown,
    Html,
    Both,
    None,
}

impl FormatChoice {
    pub fn formats(self) -> &'static [ExportFormat] {
        match self {
            FormatChoice::Markdown => &[ExportFormat::Markdown],
            FormatChoice::Html => &[ExportFormat::Html],
            FormatChoice::Both => &[ExportFormat::Markdown, ExportFormat::Html],
            FormatChoice::None => &[],
        }
    }
}
