//! Environment-driven library setup and logging.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use mapdeps_core::PathResolver;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_MAPFILE_VAR: &str = "MS_DEFAULT_MAPFILE";
pub const PROJ_LIB_VAR: &str = "PROJ_LIB";
pub const ERROR_FILE_VAR: &str = "MS_ERRORFILE";
pub const DEBUG_LEVEL_VAR: &str = "MS_DEBUGLEVEL";

const CRATES: [&str; 3] = ["map_deps", "mapdeps_core", "mapdeps_mapfile"];

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogDestination {
    #[default]
    Stderr,
    Stdout,
    /// Appended to.
    File(PathBuf),
}

impl LogDestination {
    fn parse(value: &str) -> Self {
        match value {
            "" | "stderr" => LogDestination::Stderr,
            "stdout" => LogDestination::Stdout,
            path => LogDestination::File(PathBuf::from(path)),
        }
    }
}

/// Settings read from the environment once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Parent directory of `MS_DEFAULT_MAPFILE`.
    pub fallback_root: Option<PathBuf>,
    pub proj_lib: Option<PathBuf>,
    pub log_destination: LogDestination,
    pub debug_level: Option<u8>,
}

impl LibraryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let fallback_root = lookup(DEFAULT_MAPFILE_VAR)
            .filter(|v| !v.is_empty())
            .and_then(|v| PathResolver::fallback_from_default_mapfile(Path::new(&v)));

        let proj_lib = lookup(PROJ_LIB_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let log_destination = lookup(ERROR_FILE_VAR)
            .map(|v| LogDestination::parse(&v.to_string_lossy()))
            .unwrap_or_default();

        let debug_level =
            lookup(DEBUG_LEVEL_VAR).and_then(|v| v.to_string_lossy().trim().parse().ok());

        Self {
            fallback_root,
            proj_lib,
            log_destination,
            debug_level,
        }
    }

    /// A `--proj-lib` argument replaces `PROJ_LIB`.
    pub fn with_proj_lib(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.proj_lib = dir;
        }
        self
    }
}

/// Filter used when `RUST_LOG` is not set.
fn default_directives(debug_level: Option<u8>) -> String {
    let level = match debug_level {
        None | Some(0) => "warn",
        Some(1) => "info",
        Some(_) => "debug",
    };
    CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber.
pub fn init_logging(config: &LibraryConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.debug_level)));
    let registry = tracing_subscriber::registry().with(filter);

    match &config.log_destination {
        LogDestination::Stderr => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogDestination::Stdout => registry
            .with(fmt::layer().with_writer(std::io::stdout))
            .try_init()?,
        LogDestination::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()?
        }
    }
    Ok(())
}

/// Log the library settings and sanity-check the projection directory.
pub fn report_library(config: &LibraryConfig) {
    tracing::info!(
        fallback_root = ?config.fallback_root,
        proj_lib = ?config.proj_lib,
        log_destination = ?config.log_destination,
        "Library configured"
    );
    if let Some(dir) = config.proj_lib.as_deref().filter(|d| !d.is_dir()) {
        tracing::warn!(dir = %dir.display(), "PROJ_LIB is not a directory");
    }
}
