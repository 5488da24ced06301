//! Top-level inventory of a loaded map.

use crate::error::Result;
use crate::source::MapSource;
use crate::walker::{Inspection, MapfileWalker, WalkOptions};

/// Inventory everything `map` depends on, including its own documents.
///
/// The mapfile (kind `mapfile`) and each INCLUDE (kind `include`) are
/// registered first, against the caller's working directory. The walk then
/// covers output formats, tables, the WEB block and layers.
pub fn inspect<M: MapSource + ?Sized>(map: &M, options: WalkOptions) -> Result<Inspection> {
    let mut walker = MapfileWalker::new(map, options);
    walker.add_documents()?;
    walker.walk()
}
