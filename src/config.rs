//! Configuration types for pvr-extract
//!
//! The configuration is a flat record. Its serialized form keeps the key names
//! used by the preferences UI and the persisted store (`sonarr_radarr_support`,
//! comma-joined `supported_labels`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Persisted key for [`Config::extract_path`]
pub const KEY_EXTRACT_PATH: &str = "extract_path";
/// Persisted key for [`Config::supported_labels`]
pub const KEY_SUPPORTED_LABELS: &str = "supported_labels";
/// Persisted key for [`Config::use_name_folder`]
pub const KEY_USE_NAME_FOLDER: &str = "use_name_folder";
/// Persisted key for [`Config::in_place_extraction`]
pub const KEY_IN_PLACE_EXTRACTION: &str = "in_place_extraction";
/// Persisted key for [`Config::pvr_support`]
pub const KEY_PVR_SUPPORT: &str = "sonarr_radarr_support";

/// Set of download labels that extraction is restricted to
///
/// Serialized as a comma-separated string. Parsing trims each entry and drops
/// empty ones, so `" tv, ,movies "` becomes `{"movies", "tv"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    /// Parse a comma-separated label list
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// An empty set means "no label filter"
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the set contains the given label
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    /// Iterate the labels in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        // Same trim/drop-empty rule as parse
        let joined: Vec<String> = iter.into_iter().map(Into::into).collect();
        Self::parse(&joined.join(","))
    }
}

impl From<String> for LabelSet {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<LabelSet> for String {
    fn from(labels: LabelSet) -> Self {
        labels.to_string()
    }
}

impl std::fmt::Display for LabelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

/// Extraction configuration
///
/// Read on every finished-download event. It is only ever replaced wholesale
/// (see [`Config::merged`]), so readers always hold a complete snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root folder archives are extracted into (empty = host download location)
    #[serde(default)]
    pub extract_path: PathBuf,

    /// Only downloads with one of these labels are extracted (empty = all)
    #[serde(default)]
    pub supported_labels: LabelSet,

    /// Extract into a sub-folder named after the download (default: true)
    #[serde(default = "default_true")]
    pub use_name_folder: bool,

    /// Extract next to the downloaded files instead of under `extract_path` (default: true)
    #[serde(default = "default_true")]
    pub in_place_extraction: bool,

    /// Hold back the host's "ready" flag until extraction finishes (default: true)
    #[serde(rename = "sonarr_radarr_support", default = "default_true")]
    pub pvr_support: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extract_path: PathBuf::new(),
            supported_labels: LabelSet::default(),
            use_name_folder: true,
            in_place_extraction: true,
            pvr_support: true,
        }
    }
}

impl Config {
    /// Whether a download carrying `label` passes the label filter
    pub fn label_allowed(&self, label: &str) -> bool {
        self.supported_labels.is_empty() || self.supported_labels.contains(label)
    }

    /// Return a new record with every key set in `update` applied
    pub fn merged(&self, update: &ConfigUpdate) -> Config {
        let mut next = self.clone();
        if let Some(extract_path) = &update.extract_path {
            next.extract_path = extract_path.clone();
        }
        if let Some(labels) = &update.supported_labels {
            next.supported_labels = labels.clone();
        }
        if let Some(use_name_folder) = update.use_name_folder {
            next.use_name_folder = use_name_folder;
        }
        if let Some(in_place) = update.in_place_extraction {
            next.in_place_extraction = in_place;
        }
        if let Some(pvr_support) = update.pvr_support {
            next.pvr_support = pvr_support;
        }
        next
    }
}

/// Partial configuration update sent by a preferences UI or automation client
///
/// Keys left as `None` keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// New extraction root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_path: Option<PathBuf>,

    /// New label filter (comma-separated when serialized)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_labels: Option<LabelSet>,

    /// New name-folder flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_name_folder: Option<bool>,

    /// New in-place flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_place_extraction: Option<bool>,

    /// New PVR hold-back flag
    #[serde(
        rename = "sonarr_radarr_support",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pvr_support: Option<bool>,
}

impl ConfigUpdate {
    /// Whether the update sets no key at all
    pub fn is_empty(&self) -> bool {
        *self == ConfigUpdate::default()
    }
}

fn default_true() -> bool {
    true
}
