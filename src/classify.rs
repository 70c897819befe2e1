//! File classification: decide whether a downloaded file is an archive to extract
//!
//! Extensions are split the way a file name reads: the last extension
//! (`.rar`) and the one before it (`.part02`). Leading dots of a file name
//! (`.rar` as a hidden file) are not extensions.

use crate::registry::{CommandEntry, CommandRegistry};
use std::path::Path;

/// Result of classifying one file of a finished download
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Extract the file with this command
    Extract(&'a CommandEntry),
    /// A later volume of a multi-part RAR set; part 1 extracts the whole set
    SkipMultiVolumeContinuation,
    /// Not a recognized archive
    NotArchive,
}

/// Classify a file path against the registry
///
/// Order of checks:
/// 1. compound extension (`.tar.gz`) registered: extract with it
/// 2. `.partN.rar` with numeric N other than 1: skip
/// 3. simple extension registered: extract with it
/// 4. otherwise: not an archive
pub fn classify<'a>(path: &Path, registry: &'a CommandRegistry) -> Classification<'a> {
    let Some(last_ext) = dotted_extension(path) else {
        return Classification::NotArchive;
    };
    let second_ext = path
        .file_stem()
        .map(Path::new)
        .and_then(dotted_extension);

    if let Some(second) = &second_ext
        && let Some(entry) = registry.lookup(&format!("{second}{last_ext}"))
    {
        return Classification::Extract(entry);
    }

    if last_ext == ".rar"
        && second_ext.as_deref().and_then(is_first_rar_volume) == Some(false)
    {
        return Classification::SkipMultiVolumeContinuation;
    }

    match registry.lookup(&last_ext) {
        Some(entry) => Classification::Extract(entry),
        None => Classification::NotArchive,
    }
}

/// The extension of `path` with its leading dot, e.g. ".rar"
fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
}

/// Whether a `.partNN` extension names volume 1
///
/// `None` when the extension has no "part" marker or the text after it is not
/// a plain decimal number. The digits are compared as text, so volume numbers
/// of any length are handled.
fn is_first_rar_volume(ext: &str) -> Option<bool> {
    let digits = ext.split("part").nth(1)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.trim_start_matches('0') == "1")
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CommandRegistry {
        CommandRegistry::from_entries([
            CommandEntry::new(".rar", "unrar", "x -or -y"),
            CommandEntry::new(".zip", "unzip", ""),
            CommandEntry::new(".tar", "tar", "-xf"),
            CommandEntry::new(".gz", "gunzip", "-k"),
            CommandEntry::new(".tar.gz", "tar", "-xzf"),
            CommandEntry::new(".tar.bz2", "tar", "-xjf"),
            CommandEntry::new(".7z", "7zr", "x"),
        ])
        .unwrap()
    }

    fn extension_of(c: Classification<'_>) -> Option<String> {
        match c {
            Classification::Extract(entry) => Some(entry.extension.clone()),
            _ => None,
        }
    }

    #[test]
    fn test_compound_extension_wins_over_simple_ones() {
        let registry = registry();
        for path in ["Show/pack.tar.gz", "a.b.tar.gz", "/abs/x.tar.gz"] {
            assert_eq!(
                extension_of(classify(Path::new(path), &registry)).as_deref(),
                Some(".tar.gz"),
                "{path}"
            );
        }
        assert_eq!(
            extension_of(classify(Path::new("x.tar.bz2"), &registry)).as_deref(),
            Some(".tar.bz2")
        );
    }

    #[test]
    fn test_lone_tar_uses_simple_entry() {
        let registry = registry();
        assert_eq!(
            extension_of(classify(Path::new("dump.tar"), &registry)).as_deref(),
            Some(".tar")
        );
        assert_eq!(
            extension_of(classify(Path::new("notes.txt.tar"), &registry)).as_deref(),
            Some(".tar")
        );
    }

    #[test]
    fn test_simple_extensions() {
        let registry = registry();
        assert_eq!(
            extension_of(classify(Path::new("Movie/movie.rar"), &registry)).as_deref(),
            Some(".rar")
        );
        assert_eq!(
            extension_of(classify(Path::new("album.zip"), &registry)).as_deref(),
            Some(".zip")
        );
        assert_eq!(
            extension_of(classify(Path::new("backup.7z"), &registry)).as_deref(),
            Some(".7z")
        );
    }

    #[test]
    fn test_first_rar_volume_is_extracted() {
        let registry = registry();
        for path in [
            "Show/show.part1.rar",
            "show.part01.rar",
            "show.part001.rar",
            "show.part00000000000000000000001.rar",
        ] {
            assert_eq!(
                extension_of(classify(Path::new(path), &registry)).as_deref(),
                Some(".rar"),
                "{path}"
            );
        }
    }

    #[test]
    fn test_later_rar_volumes_are_skipped() {
        let registry = registry();
        for path in [
            "show.part2.rar",
            "show.part02.rar",
            "Show/show.part10.rar",
            "show.part0.rar",
            "show.part99999999999999999999999.rar",
            "show.part00000000000000000000002.rar",
        ] {
            assert_eq!(
                classify(Path::new(path), &registry),
                Classification::SkipMultiVolumeContinuation,
                "{path}"
            );
        }
    }

    #[test]
    fn test_non_numeric_part_suffix_falls_through_to_rar() {
        let registry = registry();
        for path in ["show.partA.rar", "show.part.rar", "show.part2b.rar", "counterpart.rar"] {
            assert_eq!(
                extension_of(classify(Path::new(path), &registry)).as_deref(),
                Some(".rar"),
                "{path}"
            );
        }
    }

    #[test]
    fn test_part_rule_only_applies_to_rar() {
        let registry = registry();
        assert_eq!(
            extension_of(classify(Path::new("disc.part2.zip"), &registry)).as_deref(),
            Some(".zip")
        );
    }

    #[test]
    fn test_unknown_files_are_not_archives() {
        let registry = registry();
        for path in [
            "movie.mkv",
            "README",
            ".rar",
            "Show/.hidden",
            "sample.r00",
            "archive.",
            "MOVIE.RAR",
        ] {
            assert_eq!(
                classify(Path::new(path), &registry),
                Classification::NotArchive,
                "{path}"
            );
        }
    }

    #[test]
    fn test_first_rar_volume_detection() {
        assert_eq!(is_first_rar_volume(".part1"), Some(true));
        assert_eq!(is_first_rar_volume(".part0001"), Some(true));
        assert_eq!(is_first_rar_volume(".part007"), Some(false));
        assert_eq!(is_first_rar_volume(".part0"), Some(false));
        assert_eq!(is_first_rar_volume(".part10"), Some(false));
        assert_eq!(
            is_first_rar_volume(".part18446744073709551617"),
            Some(false)
        );
        assert_eq!(is_first_rar_volume(".part"), None);
        assert_eq!(is_first_rar_volume(".partx"), None);
        assert_eq!(is_first_rar_volume(".cd1"), None);
    }
}
