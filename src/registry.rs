//! Extraction command registry
//!
//! Maps archive extensions (simple like `.rar` or compound like `.tar.gz`) to
//! the external program that extracts them. The table is fixed per platform
//! and filtered at startup down to the programs actually found on the host.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A single extension → program mapping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandEntry {
    /// Extension including the leading dot, possibly compound (".tar.gz")
    pub extension: String,
    /// Program to run (resolved path, or a bare name looked up on PATH)
    pub executable: PathBuf,
    /// Argument tokens placed before the archive path
    pub args: Vec<String>,
}

impl CommandEntry {
    /// Create an entry from an extension, program and whitespace-separated arguments
    pub fn new(extension: &str, executable: impl Into<PathBuf>, args: &str) -> Self {
        Self {
            extension: extension.to_string(),
            executable: executable.into(),
            args: args.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// POSIX tool table: (extension, program, arguments)
#[cfg(not(windows))]
const POSIX_COMMANDS: &[(&str, &str, &str)] = &[
    (".rar", "unrar", "x -or -y"),
    (".tar", "tar", "-xf"),
    (".zip", "unzip", ""),
    (".tar.gz", "tar", "-xzf"),
    (".tgz", "tar", "-xzf"),
    (".tar.bz2", "tar", "-xjf"),
    (".tbz", "tar", "-xjf"),
    (".tar.lzma", "tar", "--lzma -xf"),
    (".tlz", "tar", "--lzma -xf"),
    (".tar.xz", "tar", "--xz -xf"),
    (".txz", "tar", "--xz -xf"),
    (".7z", "7zr", "x"),
];

/// Candidate locations of the 7-Zip command line tool, in priority order
#[cfg(windows)]
const WINDOWS_7Z_CANDIDATES: &[&str] = &[
    "7z.exe",
    "C:\\Program Files\\7-Zip\\7z.exe",
    "C:\\Program Files (x86)\\7-Zip\\7z.exe",
];

/// Extensions 7-Zip can extract with a single command
#[cfg(windows)]
const WINDOWS_7Z_EXTENSIONS: &[&str] = &[".rar", ".zip", ".tar", ".7z", ".xz", ".lzma"];

/// Registry of usable extraction commands, keyed by extension
#[derive(Clone, Debug)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandEntry>,
}

impl CommandRegistry {
    /// Build the registry for this platform from the programs found on PATH
    ///
    /// Every program that cannot be resolved disables all extensions it serves,
    /// with a warning per extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoExtractors`] when no program at all is available.
    pub fn detect() -> Result<Self> {
        Self::with_resolver(|program| which::which(program).ok())
    }

    /// Build the registry using a custom program resolver
    pub(crate) fn with_resolver<F>(resolve: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let entries = platform_entries(&resolve);
        let registry = Self::from_entries(entries)?;

        info!(
            extensions = ?registry.extensions(),
            "extraction commands available"
        );

        Ok(registry)
    }

    /// Build a registry from explicit entries
    ///
    /// Later entries for the same extension replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoExtractors`] when `entries` is empty.
    pub fn from_entries(entries: impl IntoIterator<Item = CommandEntry>) -> Result<Self> {
        let commands: HashMap<String, CommandEntry> = entries
            .into_iter()
            .map(|entry| (entry.extension.clone(), entry))
            .collect();

        if commands.is_empty() {
            return Err(Error::NoExtractors);
        }

        Ok(Self { commands })
    }

    /// Look up the command for an extension such as ".zip" or ".tar.gz"
    pub fn lookup(&self, extension: &str) -> Option<&CommandEntry> {
        self.commands.get(extension)
    }

    /// All registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Number of registered extensions
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry is empty (never true for a constructed registry)
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(not(windows))]
fn platform_entries<F>(resolve: &F) -> Vec<CommandEntry>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    let mut resolved: HashMap<&str, Option<PathBuf>> = HashMap::new();
    let mut entries = Vec::new();

    for &(extension, program, args) in POSIX_COMMANDS {
        let path = resolved
            .entry(program)
            .or_insert_with(|| resolve(program))
            .clone();

        match path {
            Some(path) => {
                debug!(extension, ?path, "found extraction program");
                entries.push(CommandEntry::new(extension, path, args));
            }
            None => {
                warn!(
                    program,
                    extension,
                    "{} not found, disabling support for {}",
                    program,
                    extension
                );
            }
        }
    }

    entries
}

#[cfg(windows)]
fn platform_entries<F>(resolve: &F) -> Vec<CommandEntry>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    let Some(path) = WINDOWS_7Z_CANDIDATES
        .iter()
        .find_map(|candidate| resolve(candidate))
    else {
        warn!("7-Zip not found, disabling support for all archive types");
        return Vec::new();
    };

    debug!(?path, "found 7-Zip");
    WINDOWS_7Z_EXTENSIONS
        .iter()
        .map(|extension| CommandEntry::new(extension, path.clone(), "x -y"))
        .collect()
}
