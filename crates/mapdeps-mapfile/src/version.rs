//! Version reporting for the mapfile reader
//!
//! The command-line tool prints this line before processing so reports can be
//! tied to the reader that produced them, the same way a MapServer build
//! announces its version and compiled-in features.

/// Features understood by this reader, in the order they are announced
const SUPPORTS: &[&str] = &["INCLUDE", "FONTSET", "SYMBOLSET", "DEFAULT_SUBSTITUTIONS"];

/// One-line reader banner: package version and supported features.
pub fn version() -> String {
    format!(
        "mapdeps-mapfile version {} SUPPORTS={}",
        env!("CARGO_PKG_VERSION"),
        SUPPORTS.join(",")
    )
}
