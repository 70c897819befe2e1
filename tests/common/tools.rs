//! Stand-in extraction programs built from `sh`

use pvr_extract::{CommandEntry, CommandRegistry};
use std::path::{Path, PathBuf};

/// Fake extractor: `sh fake-extract.sh <kind> <archive>`
///
/// Writes `<archive file name>.<kind>.out` into the working directory, or
/// fails with exit code 2 when the archive name contains "corrupt".
const FAKE_EXTRACT_SCRIPT: &str = r#"#!/bin/sh
kind="$1"
archive="$2"
name=$(basename "$archive")
case "$name" in
    *corrupt*) echo "CRC failed in $name" >&2; exit 2 ;;
esac
[ -f "$archive" ] || { echo "missing $archive" >&2; exit 3; }
printf '%s\n' "$archive" > "$name.$kind.out"
"#;

/// Write the fake extractor script into `dir` and return its path
pub fn install_fake_extractor(dir: &Path) -> PathBuf {
    let script = dir.join("fake-extract.sh");
    std::fs::write(&script, FAKE_EXTRACT_SCRIPT).unwrap();
    script
}

/// Registry mapping the usual extensions to the fake extractor
pub fn fake_registry(script: &Path) -> CommandRegistry {
    let entry = |extension: &str, kind: &str| {
        CommandEntry::new(extension, "/bin/sh", &format!("{} {}", script.display(), kind))
    };
    CommandRegistry::from_entries([
        entry(".rar", "rar"),
        entry(".zip", "zip"),
        entry(".7z", "7z"),
        entry(".tar.gz", "targz"),
    ])
    .unwrap()
}

/// Create a file (and its parent folders) with some content
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"archive bytes").unwrap();
}
