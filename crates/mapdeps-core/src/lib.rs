//! # mapdeps-core
//!
//! Inventory of the files a MapServer mapfile depends on.
//!
//! [`inspect`] walks a loaded map (anything implementing [`MapSource`]) and
//! returns an [`Inspection`]: a [`DependencyLedger`] of canonical paths with
//! reference counts, and a [`ReviewLog`] of constructs whose dependencies
//! cannot be determined statically, such as network connection types, tile
//! indexes and plugin libraries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use mapdeps_core::{TextReport, WalkOptions, inspect};
//!
//! let map = mapdeps_mapfile::load_map(Path::new("demo.map")).unwrap();
//! let inspection = inspect(&map, WalkOptions::default()).unwrap();
//! print!("{}", TextReport(&inspection));
//! ```
//!
//! The walk temporarily changes the process working directory to the map
//! path. [`ScopedWorkingDir`] guarantees it is restored and serialises
//! concurrent walks.

mod error;
mod glob_expand;
mod inspect;
mod ledger;
mod report;
mod resolver;
mod review;
mod source;
mod walker;
mod workdir;

pub use error::{Error, Result};
pub use glob_expand::{dataset_path, expand, wildcard_pattern};
pub use inspect::inspect;
pub use ledger::DependencyLedger;
pub use report::{TextReport, render_json};
pub use resolver::{PathResolver, Resolution};
pub use review::ReviewLog;
pub use source::MapSource;
pub use walker::{Inspection, MapfileWalker, WalkOptions};
pub use workdir::ScopedWorkingDir;
