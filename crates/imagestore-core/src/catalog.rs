//! Version catalog: which image URLs exist for each release.
//!
//! The catalog is built once (built-in table or override) and never mutated.
//! Validation is lazy: an entry without `iso_url` is accepted here and only
//! fails when something resolves it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::url_model;

/// Asset key of the live ISO, the image `populate` fetches for every version.
pub const ISO_URL_KEY: &str = "iso_url";
/// Asset key of the live root filesystem image.
pub const ROOTFS_URL_KEY: &str = "rootfs_url";

/// Named URLs for one version (e.g. `iso_url`, `rootfs_url`).
pub type AssetDescriptor = BTreeMap<String, String>;

const MIRROR: &str = "https://mirror.openshift.com/pub/openshift-v4/dependencies/rhcos";

/// Built-in RHCOS releases: (version, iso path, rootfs path) under [`MIRROR`].
const DEFAULT_VERSIONS: &[(&str, &str, &str)] = &[
    (
        "4.6",
        "4.6/4.6.8/rhcos-4.6.8-x86_64-live.x86_64.iso",
        "4.6/4.6.8/rhcos-live-rootfs.x86_64.img",
    ),
    (
        "4.7",
        "4.7/4.7.13/rhcos-4.7.13-x86_64-live.x86_64.iso",
        "4.7/4.7.13/rhcos-live-rootfs.x86_64.img",
    ),
    (
        "4.8",
        "pre-release/4.8.0-rc.3/rhcos-4.8.0-rc.3-x86_64-live.x86_64.iso",
        "pre-release/4.8.0-rc.3/rhcos-live-rootfs.x86_64.img",
    ),
];

/// Immutable mapping from version identifier to its asset descriptor.
///
/// Serializes as a plain map, so the same shape is accepted from JSON
/// (`{"4.8": {"iso_url": "..."}}`) and from a TOML `[versions]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionCatalog {
    entries: BTreeMap<String, AssetDescriptor>,
}

impl Default for VersionCatalog {
    fn default() -> Self {
        let entries = DEFAULT_VERSIONS
            .iter()
            .map(|(version, iso, rootfs)| {
                let mut assets = AssetDescriptor::new();
                assets.insert(ISO_URL_KEY.to_string(), format!("{MIRROR}/{iso}"));
                assets.insert(ROOTFS_URL_KEY.to_string(), format!("{MIRROR}/{rootfs}"));
                (version.to_string(), assets)
            })
            .collect();
        Self { entries }
    }
}

impl FromIterator<(String, AssetDescriptor)> for VersionCatalog {
    fn from_iter<I: IntoIterator<Item = (String, AssetDescriptor)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl VersionCatalog {
    /// Parse a JSON override. The override replaces the default table entirely.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::config("version catalog override", e))
    }

    /// Resolve an optional override, falling back to the built-in table when
    /// it is absent or blank.
    pub fn from_override(json: Option<&str>) -> Result<Self, StoreError> {
        match json.map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => Self::from_json(json),
            None => Ok(Self::default()),
        }
    }

    pub fn contains(&self, version: &str) -> bool {
        self.entries.contains_key(version)
    }

    pub fn get(&self, version: &str) -> Option<&AssetDescriptor> {
        self.entries.get(version)
    }

    /// URL stored under `key` for `version`.
    pub fn asset_url(&self, version: &str, key: &str) -> Result<&str, StoreError> {
        let assets = self.get(version).ok_or_else(|| StoreError::UnknownVersion {
            version: version.to_string(),
        })?;
        assets
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| StoreError::MissingAsset {
                version: version.to_string(),
                key: key.to_string(),
            })
    }

    /// Version identifiers in sorted order.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Groups of versions whose `iso_url` share a basename and would therefore
    /// be written to the same local file. Entries without a usable `iso_url`
    /// are skipped.
    pub fn basename_collisions(&self) -> Vec<(String, Vec<String>)> {
        let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (version, assets) in &self.entries {
            let Some(url) = assets.get(ISO_URL_KEY) else {
                continue;
            };
            if let Some(name) = url_model::basename(url) {
                by_name.entry(name).or_default().push(version.clone());
            }
        }
        by_name.into_iter().filter(|(_, v)| v.len() > 1).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_known_versions() {
        let c = VersionCatalog::default();
        assert_eq!(c.versions().collect::<Vec<_>>(), ["4.6", "4.7", "4.8"]);
        assert!(c.contains("4.8"));
        assert!(!c.contains("9.9"));
        let iso = c.asset_url("4.8", ISO_URL_KEY).unwrap();
        assert!(iso.ends_with("/rhcos-4.8.0-rc.3-x86_64-live.x86_64.iso"));
        assert!(c.asset_url("4.6", ROOTFS_URL_KEY).is_ok());
        assert!(c.basename_collisions().is_empty());
    }

    #[test]
    fn override_replaces_default() {
        let c = VersionCatalog::from_override(Some(
            r#"{"X": {"iso_url": "http://h/a.iso"}}"#,
        ))
        .unwrap();
        assert_eq!(c.len(), 1);
        assert!(!c.contains("4.8"));
        assert_eq!(c.asset_url("X", ISO_URL_KEY).unwrap(), "http://h/a.iso");
    }

    #[test]
    fn blank_override_uses_default() {
        assert_eq!(
            VersionCatalog::from_override(None).unwrap(),
            VersionCatalog::default()
        );
        assert_eq!(
            VersionCatalog::from_override(Some("  ")).unwrap(),
            VersionCatalog::default()
        );
    }

    #[test]
    fn malformed_override_is_config_error() {
        for bad in [
            "not json",
            r#"["4.8"]"#,
            r#"{"4.8": "http://h/a.iso"}"#,
            r#"{"4.8": {"iso_url": 7}}"#,
        ] {
            match VersionCatalog::from_json(bad) {
                Err(StoreError::Config { .. }) => {}
                other => panic!("expected Config error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_iso_url_is_accepted_until_resolved() {
        let c = VersionCatalog::from_json(r#"{"Z": {"rootfs_url": "http://h/r.img"}}"#).unwrap();
        assert!(c.contains("Z"));
        match c.asset_url("Z", ISO_URL_KEY) {
            Err(StoreError::MissingAsset { version, key }) => {
                assert_eq!(version, "Z");
                assert_eq!(key, ISO_URL_KEY);
            }
            other => panic!("expected MissingAsset, got {other:?}"),
        }
        match c.asset_url("Q", ISO_URL_KEY) {
            Err(StoreError::UnknownVersion { version }) => assert_eq!(version, "Q"),
            other => panic!("expected UnknownVersion, got {other:?}"),
        }
    }

    #[test]
    fn reports_basename_collisions() {
        let c = VersionCatalog::from_json(
            r#"{
                "a": {"iso_url": "http://one/live.iso"},
                "b": {"iso_url": "http://two/live.iso"},
                "c": {"iso_url": "http://two/other.iso"}
            }"#,
        )
        .unwrap();
        let collisions = c.basename_collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].0, "live.iso");
        assert_eq!(collisions[0].1, ["a", "b"]);
    }
}
