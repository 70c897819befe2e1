//! Destination folder selection for extracted files

use crate::config::Config;
use crate::error::{ExtractionError, Result};
use crate::utils::normalize_path;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Compute, and create if needed, the folder an archive of a download is extracted into
///
/// - The base folder is `config.extract_path`, or the download's own location
///   when `in_place_extraction` is set (the configured path is then ignored).
/// - With `use_name_folder`, files go to `base/download_name`, unless that path
///   already exists as something other than a folder. That happens for
///   single-file downloads, whose name is the file itself; they extract
///   straight into `base`.
///
/// Calling it again with the same inputs returns the same folder; an existing
/// folder is not an error.
///
/// # Errors
///
/// Returns [`ExtractionError::DestinationCreateFailed`] or
/// [`ExtractionError::DestinationNotDirectory`] when the folder cannot be
/// created. The caller aborts the remaining archives of the download.
pub fn resolve_destination(
    download_name: &str,
    download_location: &Path,
    config: &Config,
) -> Result<PathBuf> {
    let base = if config.in_place_extraction {
        download_location.to_path_buf()
    } else {
        normalize_path(&config.extract_path)
    };
    let named = base.join(download_name);

    let target = if config.use_name_folder && (!named.exists() || named.is_dir()) {
        named
    } else {
        base
    };

    create_destination(&target)?;
    debug!(?target, "resolved extraction destination");
    Ok(target)
}

fn create_destination(path: &Path) -> Result<()> {
    match std::fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(_) if path.is_dir() => Ok(()),
        Err(e) if path.exists() => {
            error!(?path, error = %e, "error creating destination folder");
            Err(ExtractionError::DestinationNotDirectory {
                path: path.to_path_buf(),
            }
            .into())
        }
        Err(e) => {
            error!(?path, error = %e, "error creating destination folder");
            Err(ExtractionError::DestinationCreateFailed {
                path: path.to_path_buf(),
                source: e,
            }
            .into())
        }
    }
}
