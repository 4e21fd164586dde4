use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "chapter-split",
    version,
    about = "Split EPUB books into per-chapter CSV files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve chapters for one EPUB or a folder of EPUBs and write CSVs.
    Split(SplitArgs),
    /// Print the flattened navigation entries of one EPUB.
    Toc(TocArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// An .epub file or a folder of EPUBs (not searched recursively).
    pub input: PathBuf,

    /// Pages of leading text sent to the title oracle.
    #[arg(long, default_value_t = 15)]
    pub preview_pages: usize,

    #[arg(long, default_value_t = 2000)]
    pub chars_per_page: usize,

    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value = "gpt-4o-mini")]
    pub oracle_model: String,

    #[arg(long, default_value = "https://api.openai.com/v1")]
    pub oracle_base_url: String,

    #[arg(long, default_value_t = 120)]
    pub oracle_timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = CredentialCheck::Deferred)]
    pub credential_check: CredentialCheck,

    /// Write a JSON run manifest here.
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl SplitArgs {
    pub fn preview_chars(&self) -> usize {
        self.preview_pages.saturating_mul(self.chars_per_page)
    }
}

/// When a missing oracle credential skips a book.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CredentialCheck {
    /// Only when the title oracle is actually needed.
    Deferred,
    /// Before any processing of the book.
    Eager,
}

impl CredentialCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deferred => "deferred",
            Self::Eager => "eager",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TocArgs {
    pub book: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
