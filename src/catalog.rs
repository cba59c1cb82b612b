use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::filter::FilterRule;

/// Per-platform test catalog: the default target list plus the filter
/// rules that exclude sub-tests (or whole targets) on this platform.
///
/// Loaded from a JSON file of the form:
///
/// ```json
/// {
///   "targets": ["base_unittests", "nplb"],
///   "filters": [
///     {"target_name": "nplb", "config": "qa", "test_name": "Thread.Join"},
///     {"target_name": "net_unittests", "test_name": "*"}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformCatalog {
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterRule>,
}

impl PlatformCatalog {
    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let input = std::fs::read_to_string(path).map_err(|e| CatalogError {
            message: format!("failed to read {}", path.display()),
            detail: Some(e.to_string()),
        })?;
        serde_json::from_str(&input).map_err(|e| CatalogError {
            message: format!("failed to parse {}", path.display()),
            detail: Some(e.to_string()),
        })
    }
}

/// Error loading or parsing a platform catalog file.
#[derive(Debug, Clone)]
pub struct CatalogError {
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.message, detail),
            None => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FILTER_ALL;

    #[test]
    fn catalog_parses_targets_and_filters() {
        let catalog: PlatformCatalog = serde_json::from_str(
            r#"{
                "targets": ["base_unittests", "nplb"],
                "filters": [
                    {"target_name": "nplb", "config": "qa", "test_name": "Thread.Join"},
                    {"target_name": "net_unittests", "test_name": "*"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(catalog.targets, ["base_unittests", "nplb"]);
        assert_eq!(catalog.filters.len(), 2);
        assert_eq!(catalog.filters[1].test_name, FILTER_ALL);
    }

    #[test]
    fn catalog_fields_default_to_empty() {
        let catalog: PlatformCatalog = serde_json::from_str("{}").unwrap();
        assert!(catalog.targets.is_empty());
        assert!(catalog.filters.is_empty());
    }

    #[test]
    fn load_reads_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linux-x64x11.json");
        std::fs::write(&path, r#"{"targets": ["nplb"], "filters": []}"#).unwrap();

        let catalog = PlatformCatalog::load(&path).unwrap();
        assert_eq!(catalog.targets, ["nplb"]);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let err = PlatformCatalog::load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(err.message.contains("failed to read"));
        assert!(err.detail.is_some());
    }

    #[test]
    fn load_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = PlatformCatalog::load(&path).unwrap_err();
        assert!(err.message.contains("failed to parse"));
        assert!(err.to_string().contains("failed to parse"));
    }
}
