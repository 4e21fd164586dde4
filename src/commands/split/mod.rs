use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::book::load_book;
use crate::cli::{CredentialCheck, SplitArgs};
use crate::model::{BookReport, SplitCounts, SplitPaths, SplitRunManifest};
use crate::oracle::{OpenAiTitleOracle, OracleConfig, TitleOracle};
use crate::resolve::{Chapter, Resolution, ResolveConfig, SkipReason, resolve_chapters};
use crate::util::{
    ensure_directory, file_stem_string, now_utc_string, sha256_file, utc_compact_string,
    write_atomic, write_json_pretty,
};

mod csv_output;
mod discover;
mod process;
mod run;

pub use run::run;

use csv_output::*;
use discover::*;
use process::*;
