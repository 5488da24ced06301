//! Traversal of a map's object graph, collecting file dependencies.
//!
//! The walk runs with the working directory switched to the map path so
//! that relative references resolve the way the map server resolves them.
//! Everything that cannot be turned into a local file is recorded in the
//! [`ReviewLog`] instead of failing the walk.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use mapdeps_mapfile::{Class, ConnectionType, Layer, Style, SymbolKind};

use crate::error::Result;
use crate::glob_expand;
use crate::ledger::DependencyLedger;
use crate::resolver::{PathResolver, Resolution};
use crate::review::ReviewLog;
use crate::source::MapSource;
use crate::workdir::ScopedWorkingDir;

const OUTPUT_TEMPLATE_DRIVER: &str = "TEMPLATE";
const OUTPUT_FILE_OPTION: &str = "FILE=";
const JAVASCRIPT_SCHEME: &str = "javascript://";
const PLACEHOLDER_TEMPLATE: &str = "dummy";

/// Settings for one traversal.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Directory tried before the working directory for every reference.
    pub fallback_root: Option<PathBuf>,
    /// Print progress lines to standard output.
    pub debug: bool,
}

/// Result of a traversal.
#[derive(Debug, Clone, Default)]
pub struct Inspection {
    pub ledger: DependencyLedger,
    pub review: ReviewLog,
}

impl Inspection {
    pub fn needs_review(&self) -> bool {
        self.review.needs_review()
    }
}

pub struct MapfileWalker<'a, M: MapSource + ?Sized> {
    source: &'a M,
    resolver: PathResolver,
    debug: bool,
    ledger: DependencyLedger,
    review: ReviewLog,
    missing_symbols: HashSet<String>,
}

impl<'a, M: MapSource + ?Sized> MapfileWalker<'a, M> {
    pub fn new(source: &'a M, options: WalkOptions) -> Self {
        let resolver = PathResolver::new(
            source.map_path().map(Path::to_path_buf),
            options.fallback_root,
        );
        Self {
            source,
            resolver,
            debug: options.debug,
            ledger: DependencyLedger::new(),
            review: ReviewLog::new(),
            missing_symbols: HashSet::new(),
        }
    }

    /// Register `path` under `kind`, or warn that it is missing.
    ///
    /// Relative paths are taken against the current working directory, so
    /// outside [`walk`](Self::walk) callers hold a [`ScopedWorkingDir`].
    pub fn add_file(&mut self, path: &Path, kind: &str) {
        match self.resolver.resolve(path) {
            Resolution::Found(canonical) => {
                self.progress(format_args!("Found {}: {}", kind, canonical.display()));
                self.ledger.record(canonical);
            }
            Resolution::NotFound(expected) => {
                self.review
                    .warn(format!("{}: {} not found!", kind, expected.display()));
            }
        }
    }

    /// Register the font file behind a fontset alias.
    pub fn add_font(&mut self, alias: &str) {
        self.progress(format_args!("Reference font {}", alias));

        let source = self.source;
        match source.lookup_font(alias) {
            Some(file) => self.add_file(file, "font"),
            None => self
                .review
                .warn(format!("FONT {} not found in fontset", alias)),
        }
    }

    /// Register what a named symbol depends on.
    ///
    /// Every symbol carrying the name contributes, not just the first. A
    /// name that matches nothing is reported once however often it is used.
    pub fn add_symbol(&mut self, name: &str) {
        self.progress(format_args!("Reference symbol {}", name));

        let source = self.source;
        let mut found = false;
        for symbol in source
            .symbols()
            .iter()
            .filter(|s| s.name.as_deref() == Some(name))
        {
            found = true;
            match symbol.kind {
                SymbolKind::Truetype => {
                    if let Some(font) = &symbol.font {
                        self.add_font(font);
                    }
                }
                SymbolKind::Pixmap => {
                    if let Some(image) = &symbol.full_pixmap_path {
                        self.add_file(image, "image");
                    }
                }
                _ => {}
            }
        }

        if !found && self.missing_symbols.insert(name.to_string()) {
            self.review.warn(format!("Symbol {} NOT FOUND", name));
        }
    }

    /// Walk the whole map with the working directory set to its map path.
    pub fn walk(mut self) -> Result<Inspection> {
        let source = self.source;
        let map_path = source.map_path();
        let _cwd = ScopedWorkingDir::enter(map_path)?;
        tracing::info!(
            map_path = ?map_path,
            fallback_root = ?self.resolver.fallback_root(),
            "Collecting mapfile dependencies"
        );

        if let Some(dir) = map_path {
            self.progress(format_args!("Found mappath: {}", dir.display()));
        }
        if let Some(shape_path) = source.shape_path() {
            self.progress(format_args!("Found shapepath: {}", shape_path));
        }

        self.walk_output_formats();
        self.walk_tables();
        self.walk_web();
        for layer in source.layers() {
            self.walk_layer(layer);
        }

        tracing::info!(
            files = self.ledger.len(),
            warnings = self.review.warnings().len(),
            "Finished collecting dependencies"
        );
        Ok(Inspection {
            ledger: self.ledger,
            review: self.review,
        })
    }

    /// Register the documents that make up the map: the mapfile itself and
    /// every INCLUDE, resolved against the caller's working directory.
    pub(crate) fn add_documents(&mut self) -> Result<()> {
        let source = self.source;
        let _cwd = ScopedWorkingDir::enter(None)?;
        if let Some(mapfile) = source.mapfile() {
            self.add_file(mapfile, "mapfile");
        }
        for include in source.includes() {
            self.add_file(include, "include");
        }
        Ok(())
    }

    fn walk_output_formats(&mut self) {
        let source = self.source;
        for format in source.output_formats() {
            if format.driver != OUTPUT_TEMPLATE_DRIVER {
                continue;
            }
            let name = format.name.as_deref().unwrap_or_default();
            for option in format
                .format_options
                .iter()
                .filter(|o| o.starts_with(OUTPUT_FILE_OPTION))
            {
                self.review.warn(format!(
                    "OUTPUTFORMAT: {} {} {}",
                    name, format.driver, option
                ));
            }
        }
    }

    fn walk_tables(&mut self) {
        let source = self.source;
        if let Some(fontset) = source.fontset_filename() {
            self.progress(format_args!(
                "Found FONTSET {} with {} fonts.",
                fontset,
                source.font_count()
            ));
            self.add_file(Path::new(fontset), "fontset");
        }
        if let Some(symbolset) = source.symbolset_filename() {
            self.progress(format_args!(
                "Found SYMBOLSET {} with {} symbols",
                symbolset,
                source.symbols().len()
            ));
            self.add_file(Path::new(symbolset), "symbolset");
        }
    }

    fn walk_web(&mut self) {
        let source = self.source;
        let web = source.web();
        let fields = [
            (&web.header, "web.header"),
            (&web.footer, "web.footer"),
            (&web.empty, "web.empty"),
            (&web.error, "web.error"),
            (&web.template, "web.template"),
            (&web.min_template, "web.mintemplate"),
            (&web.max_template, "web.maxtemplate"),
        ];
        for (value, kind) in fields {
            if let Some(file) = value {
                self.add_file(Path::new(file), kind);
            }
        }
    }

    fn walk_layer(&mut self, layer: &Layer) {
        let Some(name) = layer.name.as_deref().filter(|n| !n.is_empty()) else {
            tracing::debug!("Skipping unnamed layer");
            return;
        };
        self.progress(format_args!("Layer {}", name));

        for class in &layer.classes {
            self.walk_class(class);
        }

        self.walk_connection(layer);

        if let Some(footer) = &layer.footer {
            self.add_file(Path::new(footer), "layer.footer");
        }
        if let Some(header) = &layer.header {
            self.add_file(Path::new(header), "layer.header");
        }
        if let Some(template) = layer
            .template
            .as_deref()
            .filter(|t| *t != PLACEHOLDER_TEMPLATE)
        {
            self.add_file(Path::new(template), "layer.template");
        }

        if let Some(style_item) = layer
            .style_item
            .as_deref()
            .filter(|s| s.starts_with(JAVASCRIPT_SCHEME))
        {
            self.review
                .warn(format!("Found javascript STYLEITEM {}", style_item));
        }
        if let Some(tileindex) = &layer.tileindex {
            self.review
                .warn(format!("Found TILEINDEX {} needs manual review", tileindex));
        }
        if let Some(library) = &layer.plugin_library {
            self.review
                .warn(format!("Found Plugin Library {} needs manual review", library));
        }
    }

    fn walk_class(&mut self, class: &Class) {
        if let Some(template) = &class.template {
            self.add_file(Path::new(template), "layer.class.template");
        }
        for style in &class.styles {
            self.walk_style(style);
        }
        for label in &class.labels {
            if let Some(font) = label.font_name() {
                self.add_font(font);
            }
            for style in &label.styles {
                self.walk_style(style);
            }
        }
    }

    fn walk_style(&mut self, style: &Style) {
        if let Some(symbol) = style.symbol_name() {
            self.add_symbol(symbol);
        }
    }

    fn walk_connection(&mut self, layer: &Layer) {
        match &layer.connection_type {
            ConnectionType::Inline => {}
            ConnectionType::Shapefile => {
                if let Some(tileindex) = &layer.tileindex {
                    self.review.warn("TILEINDEX needs manual review");
                    self.add_dataset(tileindex, "layer.tileindex");
                } else if let Some(data) = &layer.data {
                    self.add_dataset(data, "layer.data");
                }
            }
            ConnectionType::TiledShapefile
            | ConnectionType::Ogr
            | ConnectionType::Postgis
            | ConnectionType::Wms
            | ConnectionType::OracleSpatial
            | ConnectionType::Wfs
            | ConnectionType::Graticule
            | ConnectionType::Mysql
            | ConnectionType::Raster
            | ConnectionType::Plugin
            | ConnectionType::Union
            | ConnectionType::UvRaster
            | ConnectionType::Contour => {
                self.review.warn(format!(
                    "CONNECTIONTYPE {} requires manual review",
                    layer.connection_type
                ));
            }
            ConnectionType::Other(raw) => {
                self.review.warn(format!(
                    "CONNECTIONTYPE unknown ({}), requires manual review.",
                    raw
                ));
            }
        }
    }

    /// Register every file of a dataset named without its extension.
    fn add_dataset(&mut self, reference: &str, kind: &str) {
        let pattern = glob_expand::wildcard_pattern(self.source.shape_path(), reference);
        match glob_expand::expand(&pattern) {
            Ok(files) if files.is_empty() => {
                let literal = glob_expand::dataset_path(self.source.shape_path(), reference);
                let expected = self.resolver.expected_path(&literal);
                self.review
                    .warn(format!("{}: {} not found!", kind, expected.display()));
            }
            Ok(files) => {
                for file in files {
                    self.add_file(&file, kind);
                }
            }
            Err(e) => {
                self.review
                    .warn(format!("{}: invalid pattern {}: {}", kind, pattern, e));
            }
        }
    }

    fn progress(&self, line: fmt::Arguments<'_>) {
        tracing::debug!("{}", line);
        if self.debug {
            println!("\t{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapdeps_mapfile::{
        FontRef, Label, Map, OutputFormat, Symbol, SymbolRef, Web,
    };
    use pretty_assertions::assert_eq;
    use std::fs;

    struct Fixture {
        _temp: tempfile::TempDir,
        dir: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = tempfile::tempdir().unwrap();
            let dir = fs::canonicalize(temp.path()).unwrap();
            Self { _temp: temp, dir }
        }

        fn touch(&self, name: &str) -> PathBuf {
            let path = self.dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"").unwrap();
            path
        }

        fn map(&self) -> Map {
            Map {
                map_path: Some(self.dir.clone()),
                ..Map::default()
            }
        }
    }

    fn walk(map: &Map) -> Inspection {
        MapfileWalker::new(map, WalkOptions::default())
            .walk()
            .unwrap()
    }

    fn named_layer(name: &str) -> Layer {
        Layer {
            name: Some(name.to_string()),
            ..Layer::default()
        }
    }

    fn symbol_style(name: &str) -> Style {
        Style {
            symbol: Some(SymbolRef::Name(name.to_string())),
        }
    }

    fn files(inspection: &Inspection) -> Vec<(PathBuf, usize)> {
        inspection
            .ledger
            .entries()
            .map(|(p, n)| (p.to_path_buf(), n))
            .collect()
    }

    #[test]
    fn test_empty_map_yields_nothing() {
        let inspection = walk(&Map::default());
        assert!(inspection.ledger.is_empty());
        assert!(!inspection.needs_review());
    }

    #[test]
    fn test_template_output_format_is_flagged() {
        let fixture = Fixture::new();
        fixture.touch("out.html");
        let mut map = fixture.map();
        map.output_formats = vec![
            OutputFormat {
                name: Some("html".into()),
                driver: "TEMPLATE".into(),
                format_options: vec!["FILE=out.html".into(), "ATTACHMENT=x".into()],
            },
            OutputFormat {
                name: Some("png".into()),
                driver: "AGG/PNG".into(),
                format_options: vec!["FILE=ignored.png".into()],
            },
        ];

        let inspection = walk(&map);

        assert!(inspection.ledger.is_empty());
        assert_eq!(
            inspection.review.warnings(),
            ["OUTPUTFORMAT: html TEMPLATE FILE=out.html"]
        );
    }

    #[test]
    fn test_web_fields_resolve_relative_to_map_path() {
        let fixture = Fixture::new();
        let header = fixture.touch("templates/header.html");
        let mut map = fixture.map();
        map.web = Web {
            header: Some("templates/header.html".into()),
            max_template: Some("templates/max.html".into()),
            ..Web::default()
        };

        let inspection = walk(&map);

        assert_eq!(files(&inspection), vec![(header, 1)]);
        assert_eq!(
            inspection.review.warnings(),
            [format!(
                "web.maxtemplate: {} not found!",
                fixture.dir.join("templates/max.html").display()
            )]
        );
    }

    #[test]
    fn test_shared_font_counts_twice() {
        let fixture = Fixture::new();
        let font = fixture.touch("fonts/vera.ttf");
        let mut map = fixture.map();
        map.fontset.fonts.insert("vera".into(), font.clone());
        map.symbolset.symbols.push(Symbol {
            name: Some("letter".into()),
            kind: SymbolKind::Truetype,
            font: Some("vera".into()),
            ..Symbol::default()
        });
        let mut layer = named_layer("points");
        layer.connection_type = ConnectionType::Inline;
        for _ in 0..2 {
            layer.classes.push(Class {
                styles: vec![symbol_style("letter")],
                ..Class::default()
            });
        }
        map.layers.push(layer);

        let inspection = walk(&map);

        assert_eq!(files(&inspection), vec![(font, 2)]);
        assert!(!inspection.needs_review());
    }

    #[test]
    fn test_missing_font_warns_once_without_entry() {
        let fixture = Fixture::new();
        let mut map = fixture.map();
        let mut layer = named_layer("labels");
        layer.connection_type = ConnectionType::Inline;
        layer.classes.push(Class {
            labels: vec![Label {
                font: Some(FontRef::Name("comic".into())),
                ..Label::default()
            }],
            ..Class::default()
        });
        map.layers.push(layer);

        let inspection = walk(&map);

        assert!(inspection.ledger.is_empty());
        assert_eq!(
            inspection.review.warnings(),
            ["FONT comic not found in fontset"]
        );
    }

    #[test]
    fn test_missing_symbol_warns_once() {
        let fixture = Fixture::new();
        let mut map = fixture.map();
        let mut layer = named_layer("roads");
        layer.connection_type = ConnectionType::Inline;
        layer.classes.push(Class {
            styles: vec![symbol_style("ghost"), symbol_style("ghost")],
            ..Class::default()
        });
        layer.classes.push(Class {
            styles: vec![symbol_style("ghost")],
            ..Class::default()
        });
        map.layers.push(layer);

        let inspection = walk(&map);

        assert!(inspection.ledger.is_empty());
        assert_eq!(inspection.review.warnings(), ["Symbol ghost NOT FOUND"]);
    }

    #[test]
    fn test_duplicate_symbol_names_all_contribute() {
        let fixture = Fixture::new();
        let first = fixture.touch("a.png");
        let second = fixture.touch("b.png");
        let mut map = fixture.map();
        for path in [&first, &second] {
            map.symbolset.symbols.push(Symbol {
                name: Some("marker".into()),
                kind: SymbolKind::Pixmap,
                full_pixmap_path: Some(path.clone()),
                ..Symbol::default()
            });
        }
        let mut layer = named_layer("poi");
        layer.connection_type = ConnectionType::Inline;
        layer.classes.push(Class {
            styles: vec![symbol_style("marker")],
            ..Class::default()
        });
        map.layers.push(layer);

        let inspection = walk(&map);

        assert_eq!(files(&inspection), vec![(first, 1), (second, 1)]);
    }

    #[test]
    fn test_shapefile_data_registers_every_shard() {
        let fixture = Fixture::new();
        let dbf = fixture.touch("data/roads.dbf");
        let shp = fixture.touch("data/roads.shp");
        let shx = fixture.touch("data/roads.shx");
        let mut map = fixture.map();
        map.shape_path = Some("data".into());
        let mut layer = named_layer("roads");
        layer.data = Some("roads".into());
        map.layers.push(layer);

        let inspection = walk(&map);

        assert_eq!(files(&inspection), vec![(dbf, 1), (shp, 1), (shx, 1)]);
        assert!(!inspection.needs_review());
    }

    #[test]
    fn test_shapefile_data_without_files_warns() {
        let fixture = Fixture::new();
        let mut map = fixture.map();
        let mut layer = named_layer("roads");
        layer.data = Some("roads".into());
        map.layers.push(layer);

        let inspection = walk(&map);

        assert!(inspection.ledger.is_empty());
        assert_eq!(
            inspection.review.warnings(),
            [format!(
                "layer.data: {} not found!",
                fixture.dir.join("roads.*").display()
            )]
        );
    }

    #[test]
    fn test_missing_dataset_warning_shows_unescaped_path() {
        let fixture = Fixture::new();
        let mut map = fixture.map();
        let mut layer = named_layer("roads");
        layer.data = Some("roads[1]".into());
        map.layers.push(layer);

        let inspection = walk(&map);

        assert_eq!(
            inspection.review.warnings(),
            [format!(
                "layer.data: {} not found!",
                fixture.dir.join("roads[1].*").display()
            )]
        );
    }

    #[test]
    fn test_bracketed_dataset_name_matches_literally() {
        let fixture = Fixture::new();
        let shp = fixture.touch("roads[1].shp");
        fixture.touch("roads1.shp");
        let mut map = fixture.map();
        let mut layer = named_layer("roads");
        layer.data = Some("roads[1]".into());
        map.layers.push(layer);

        let inspection = walk(&map);

        assert_eq!(files(&inspection), vec![(shp, 1)]);
        assert!(inspection.review.warnings().is_empty());
    }

    #[test]
    fn test_shapefile_tileindex_takes_priority() {
        let fixture = Fixture::new();
        let index = fixture.touch("tiles.shp");
        fixture.touch("roads.shp");
        let mut map = fixture.map();
        let mut layer = named_layer("tiled");
        layer.tileindex = Some("tiles".into());
        layer.data = Some("roads".into());
        map.layers.push(layer);

        let inspection = walk(&map);

        assert_eq!(files(&inspection), vec![(index, 1)]);
        assert_eq!(
            inspection.review.warnings(),
            [
                "TILEINDEX needs manual review",
                "Found TILEINDEX tiles needs manual review"
            ]
        );
    }

    #[test]
    fn test_network_connection_types_are_flagged() {
        let fixture = Fixture::new();
        let mut map = fixture.map();
        let mut wms = named_layer("wms");
        wms.connection_type = ConnectionType::Wms;
        wms.data = Some("ignored".into());
        let mut oracle = named_layer("oracle");
        oracle.connection_type = ConnectionType::OracleSpatial;
        let mut odd = named_layer("odd");
        odd.connection_type = ConnectionType::Other("SDE".into());
        map.layers.extend([wms, oracle, odd]);

        let inspection = walk(&map);

        assert!(inspection.ledger.is_empty());
        assert_eq!(
            inspection.review.warnings(),
            [
                "CONNECTIONTYPE WMS requires manual review",
                "CONNECTIONTYPE ORACLESPATIAL requires manual review",
                "CONNECTIONTYPE unknown (SDE), requires manual review."
            ]
        );
    }

    #[test]
    fn test_layer_files_and_flags() {
        let fixture = Fixture::new();
        let footer = fixture.touch("foot.html");
        let class_template = fixture.touch("class.html");
        let mut map = fixture.map();
        let mut layer = named_layer("flags");
        layer.connection_type = ConnectionType::Inline;
        layer.footer = Some("foot.html".into());
        layer.template = Some("dummy".into());
        layer.style_item = Some("javascript://foo.js".into());
        layer.plugin_library = Some("/usr/lib/msplugin.so".into());
        layer.classes.push(Class {
            template: Some("class.html".into()),
            ..Class::default()
        });
        map.layers.push(layer);

        let inspection = walk(&map);

        assert_eq!(files(&inspection), vec![(class_template, 1), (footer, 1)]);
        assert_eq!(
            inspection.review.warnings(),
            [
                "Found javascript STYLEITEM javascript://foo.js",
                "Found Plugin Library /usr/lib/msplugin.so needs manual review"
            ]
        );
    }

    #[test]
    fn test_unnamed_layers_are_skipped() {
        let fixture = Fixture::new();
        let mut map = fixture.map();
        map.layers.push(Layer {
            connection_type: ConnectionType::Wms,
            ..Layer::default()
        });
        map.layers.push(Layer {
            name: Some(String::new()),
            connection_type: ConnectionType::Wfs,
            ..Layer::default()
        });

        let inspection = walk(&map);

        assert!(!inspection.needs_review());
    }

    #[test]
    fn test_working_directory_restored() {
        let fixture = Fixture::new();
        let before = {
            let _guard = ScopedWorkingDir::enter(None).unwrap();
            std::env::current_dir().unwrap()
        };

        walk(&fixture.map());

        let _guard = ScopedWorkingDir::enter(None).unwrap();
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_missing_map_path_is_an_error() {
        let map = Map {
            map_path: Some(PathBuf::from("/no/such/map/dir")),
            ..Map::default()
        };

        let result = MapfileWalker::new(&map, WalkOptions::default()).walk();

        assert!(matches!(
            result,
            Err(crate::Error::WorkingDirectory { .. })
        ));
    }
}
