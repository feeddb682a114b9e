use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, TS)]
#[serde(rename_all = "lowercase")]
#[ts(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Lenient parse used for URL values; anything but `asc`/`desc` is `None`.
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pick in the manufacturer -> model hierarchy.
///
/// `level` is always `path.len() - 1`; use [`HierarchicalSelection::from_path`]
/// to keep `display` and `level` consistent with the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, TS)]
pub struct HierarchicalSelection {
    pub path: Vec<String>,
    pub display: String,
    pub level: u32,
}

impl HierarchicalSelection {
    /// Returns `None` for an empty path.
    pub fn from_path<I, S>(path: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path: Vec<String> = path.into_iter().map(Into::into).collect();
        if path.is_empty() {
            return None;
        }
        let display = path.join(" ");
        let level = u32::try_from(path.len() - 1).unwrap_or(u32::MAX);
        Some(Self {
            path,
            display,
            level,
        })
    }

    pub fn root(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or_default()
    }

    pub fn leaf(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema, TS)]
pub struct RangeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// The structured filter model mirrored into the page URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, TS)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct DomainFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    pub page: u32,
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    #[serde(default)]
    pub selected_items: Vec<HierarchicalSelection>,
    #[serde(default)]
    pub column_filters: BTreeMap<String, String>,
    #[serde(default)]
    pub range_filters: BTreeMap<String, RangeFilter>,
}

impl Default for DomainFilters {
    fn default() -> Self {
        Self::with_pagination(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

impl DomainFilters {
    pub fn with_pagination(page: u32, size: u32) -> Self {
        Self {
            q: None,
            page,
            size,
            sort: None,
            sort_direction: None,
            selected_items: Vec::new(),
            column_filters: BTreeMap::new(),
            range_filters: BTreeMap::new(),
        }
    }

    /// True when the filters narrow the result set; pagination and sort alone
    /// never do.
    pub fn has_active_filters(&self) -> bool {
        !self.selected_items.is_empty()
            || !self.column_filters.is_empty()
            || !self.range_filters.is_empty()
            || self.q.as_deref().is_some_and(|q| !q.is_empty())
    }

    /// Zero-based offset of the first row on the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }

    /// Collapse "present but empty" into "absent" so equal filters compare
    /// equal regardless of how they were built.
    pub fn normalized(mut self) -> Self {
        self.q = self.q.filter(|q| !q.is_empty());
        self.sort = self.sort.filter(|s| !s.is_empty());
        self.selected_items.retain(|item| !item.path.is_empty());
        self.column_filters.retain(|_, value| !value.is_empty());
        self.range_filters.retain(|_, range| !range.is_empty());
        self
    }
}
