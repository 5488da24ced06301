//! End-to-end runs of the map-deps binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

const MAPFILE: &str = r#"MAP
  NAME "cli"
  FONTSET "fonts.txt"
  LAYER
    NAME "basemap"
    CONNECTIONTYPE WMS
    CONNECTION "http://example.com/wms"
  END
END
"#;

fn fixture() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let dir = fs::canonicalize(temp.path()).unwrap();
    fs::write(dir.join("fonts.txt"), "vera vera.ttf\n").unwrap();
    fs::write(dir.join("cli.map"), MAPFILE).unwrap();
    (temp, dir)
}

/// Run the binary with a clean MapServer environment.
fn map_deps(args: &[&str], envs: &[(&str, &Path)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_map-deps"));
    command
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("MS_DEFAULT_MAPFILE")
        .env_remove("MS_ERRORFILE")
        .env_remove("MS_DEBUGLEVEL")
        .env_remove("PROJ_LIB");
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().expect("Failed to execute map-deps")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_missing_argument_prints_usage() {
    let output = map_deps(&[], &[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Usage"));
}

#[test]
fn test_nonexistent_mapfile() {
    let output = map_deps(&["/no/such/file.map"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Mapfile: \"/no/such/file.map\" doesn't exist!"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_text_report_with_warnings_succeeds() {
    let (_temp, dir) = fixture();
    let mapfile = dir.join("cli.map");

    let output = map_deps(&[mapfile.to_str().unwrap()], &[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let expected_tail = format!(
        "Required Files:\n\
         \tRefs:\tFilename:\n\
         \t1\t{}\n\
         \t1\t{}\n\
         \tWARNING: Requires Manual Review\n\
         \tWARNING: CONNECTIONTYPE WMS requires manual review\n",
        mapfile.display(),
        dir.join("fonts.txt").display()
    );
    let out = stdout(&output);
    assert!(out.starts_with("Found mapfile reader:\nmapdeps-mapfile version "));
    assert!(out.contains(&format!("Trying mapfile {:?}\n", mapfile)));
    assert!(out.ends_with(&expected_tail), "stdout: {}", out);
}

#[test]
fn test_json_report() {
    let (_temp, dir) = fixture();
    let mapfile = dir.join("cli.map");

    let output = map_deps(&[mapfile.to_str().unwrap(), "--format", "json"], &[]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["needs_manual_review"], serde_json::json!(true));
    assert_eq!(
        json["files"][1]["path"],
        serde_json::json!(dir.join("fonts.txt").to_str().unwrap())
    );
    assert_eq!(
        json["warnings"],
        serde_json::json!(["CONNECTIONTYPE WMS requires manual review"])
    );
}

#[test]
fn test_parse_error_is_fatal() {
    let (_temp, dir) = fixture();
    let broken = dir.join("broken.map");
    fs::write(&broken, "MAP\n  LAYER\n    NAME \"a\"\n").unwrap();

    let output = map_deps(&[broken.to_str().unwrap()], &[]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Error: Failed to load mapfile"), "stderr: {}", err);
    assert!(!stdout(&output).contains("Required Files:"));
}

#[test]
fn test_debug_prints_progress() {
    let (_temp, dir) = fixture();
    let mapfile = dir.join("cli.map");

    let output = map_deps(&[mapfile.to_str().unwrap(), "--debug"], &[]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(&format!("\tFound fontset: {}\n", dir.join("fonts.txt").display())));
    assert!(out.contains("\tLayer basemap\n"));
}

#[test]
fn test_default_mapfile_directory_is_searched_first() {
    let (_temp, dir) = fixture();
    let defaults = dir.join("defaults");
    fs::create_dir(&defaults).unwrap();
    fs::write(defaults.join("fonts.txt"), "vera vera.ttf\n").unwrap();
    let mapfile = dir.join("cli.map");
    let default_mapfile = defaults.join("default.map");

    let output = map_deps(
        &[mapfile.to_str().unwrap()],
        &[("MS_DEFAULT_MAPFILE", default_mapfile.as_path())],
    );

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(&format!("\t1\t{}\n", defaults.join("fonts.txt").display())));
    assert!(!out.contains(&format!("\t1\t{}\n", dir.join("fonts.txt").display())));
}

#[test]
fn test_error_file_receives_debug_log() {
    let (_temp, dir) = fixture();
    let log = dir.join("ms.log");

    let output = Command::new(env!("CARGO_BIN_EXE_map-deps"))
        .arg(dir.join("cli.map"))
        .env_remove("RUST_LOG")
        .env_remove("MS_DEFAULT_MAPFILE")
        .env("MS_ERRORFILE", &log)
        .env("MS_DEBUGLEVEL", "2")
        .output()
        .expect("Failed to execute map-deps");

    assert!(output.status.success());
    let contents = fs::read_to_string(&log).expect("log file written");
    assert!(contents.contains("Collecting mapfile dependencies"));
    assert!(stderr(&output).is_empty());
}

#[test]
fn test_version_flag() {
    let output = map_deps(&["--version"], &[]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        format!("map-deps {}\n", env!("CARGO_PKG_VERSION"))
    );
}
