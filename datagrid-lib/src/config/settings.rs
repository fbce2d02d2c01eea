//! Pagination, sorting, search, export and audit settings.

use serde::Deserialize;

use crate::export::ExportFormat;
use crate::view::SortSpec;

/// Pagination settings.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::PaginationConfig;
///
/// let pagination = PaginationConfig::default()
///     .with_items_per_page(25)
///     .with_options(vec![25, 50]);
/// assert_eq!(pagination.clamp_items_per_page(40), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    /// Whether rows are split into pages.
    ///
    /// Default: true
    pub enabled: bool,

    /// Rows per page.
    ///
    /// Default: 10
    pub items_per_page: usize,

    /// Page sizes offered to the user. Empty means any positive size.
    ///
    /// Default: `[10, 25, 50, 100]`
    pub items_per_page_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            items_per_page: 10,
            items_per_page_options: vec![10, 25, 50, 100],
        }
    }
}

impl PaginationConfig {
    /// Pagination turned off: every filtered row is on the single page.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the rows per page.
    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    /// Sets the offered page sizes.
    pub fn with_options(mut self, options: Vec<usize>) -> Self {
        self.items_per_page_options = options;
        self
    }

    /// Clamps a requested page size to the nearest offered option.
    ///
    /// Ties go to the smaller option. Without options any size of at least 1
    /// is accepted.
    pub fn clamp_items_per_page(&self, requested: usize) -> usize {
        self.items_per_page_options
            .iter()
            .copied()
            .filter(|&option| option > 0)
            .min_by_key(|&option| (option.abs_diff(requested), option))
            .unwrap_or(requested.max(1))
    }
}

/// Sorting settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortingConfig {
    /// Default: true
    pub enabled: bool,

    /// Sort applied when the table is created.
    ///
    /// Default: none
    pub default_sort: Option<SortSpec>,
}

impl Default for SortingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_sort: None,
        }
    }
}

impl SortingConfig {
    /// Sorting turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            default_sort: None,
        }
    }

    /// Sets the default sort.
    pub fn with_default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = Some(sort);
        self
    }
}

/// Free-text search settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Default: true
    pub enabled: bool,

    pub placeholder: Option<String>,

    /// Column ids or field paths searched. Empty searches every data column.
    pub search_fields: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            placeholder: None,
            search_fields: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Search turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the searched fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Default: true
    pub enabled: bool,

    /// Default: `["csv"]`
    pub formats: Vec<ExportFormat>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            formats: vec![ExportFormat::Csv],
        }
    }
}

impl ExportConfig {
    /// Export turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            formats: Vec::new(),
        }
    }

    /// Sets the offered formats.
    pub fn with_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.formats = formats;
        self
    }
}

/// Audit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditConfig {
    /// Default: false
    pub enabled: bool,

    /// Default: false
    pub track_actions: bool,
}

impl AuditConfig {
    /// Audit with action tracking.
    pub fn tracking() -> Self {
        Self {
            enabled: true,
            track_actions: true,
        }
    }

    /// Returns `true` if dispatches emit audit events.
    pub fn tracks_actions(&self) -> bool {
        self.enabled && self.track_actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_items_per_page() {
        let pagination = PaginationConfig::default();
        assert_eq!(pagination.clamp_items_per_page(10), 10);
        assert_eq!(pagination.clamp_items_per_page(30), 25);
        assert_eq!(pagination.clamp_items_per_page(1000), 100);
        assert_eq!(pagination.clamp_items_per_page(0), 10);

        let free = PaginationConfig::default().with_options(Vec::new());
        assert_eq!(free.clamp_items_per_page(7), 7);
        assert_eq!(free.clamp_items_per_page(0), 1);
    }

    #[test]
    fn test_clamp_ties_pick_smaller() {
        let pagination = PaginationConfig::default().with_options(vec![10, 20]);
        assert_eq!(pagination.clamp_items_per_page(15), 10);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let pagination: PaginationConfig = serde_json::from_str(r#"{"itemsPerPage": 25}"#).unwrap();
        assert!(pagination.enabled);
        assert_eq!(pagination.items_per_page, 25);
        assert_eq!(pagination.items_per_page_options, vec![10, 25, 50, 100]);
    }
}
