//! Partial updates to [`DomainFilters`].

use std::collections::BTreeMap;

use autos_protocol::DEFAULT_PAGE;
use autos_protocol::DomainFilters;
use autos_protocol::HierarchicalSelection;
use autos_protocol::RangeFilter;
use autos_protocol::SortDirection;
use autos_url_codec::CodecConfig;

use crate::error::ValidationError;

/// What a patch does to one optional field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate<T> {
    Set(T),
    Remove,
}

impl<T> FieldUpdate<T> {
    fn apply(self, slot: &mut Option<T>) {
        *slot = match self {
            FieldUpdate::Set(value) => Some(value),
            FieldUpdate::Remove => None,
        };
    }
}

/// A partial [`DomainFilters`]: absent fields are left alone, `Remove` deletes.
///
/// Touching anything other than `page` or `size` without also giving `page`
/// sends the user back to the first page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub q: Option<FieldUpdate<String>>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<FieldUpdate<String>>,
    pub sort_direction: Option<FieldUpdate<SortDirection>>,
    /// Replaces the whole selection; an empty list clears it
    pub selected_items: Option<Vec<HierarchicalSelection>>,
    pub column_filters: BTreeMap<String, FieldUpdate<String>>,
    pub range_filters: BTreeMap<String, FieldUpdate<RangeFilter>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(FieldUpdate::Set(q.into()));
        self
    }

    pub fn clear_query(mut self) -> Self {
        self.q = Some(FieldUpdate::Remove);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(FieldUpdate::Set(column.into()));
        self.sort_direction = Some(FieldUpdate::Set(direction));
        self
    }

    pub fn clear_sort(mut self) -> Self {
        self.sort = Some(FieldUpdate::Remove);
        self.sort_direction = Some(FieldUpdate::Remove);
        self
    }

    pub fn select(mut self, items: Vec<HierarchicalSelection>) -> Self {
        self.selected_items = Some(items);
        self
    }

    pub fn clear_selection(self) -> Self {
        self.select(Vec::new())
    }

    pub fn column(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.column_filters
            .insert(key.into(), FieldUpdate::Set(value.into()));
        self
    }

    pub fn remove_column(mut self, key: impl Into<String>) -> Self {
        self.column_filters.insert(key.into(), FieldUpdate::Remove);
        self
    }

    pub fn range(mut self, key: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        self.range_filters
            .insert(key.into(), FieldUpdate::Set(RangeFilter::new(min, max)));
        self
    }

    pub fn remove_range(mut self, key: impl Into<String>) -> Self {
        self.range_filters.insert(key.into(), FieldUpdate::Remove);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// True when the patch changes anything besides pagination.
    pub fn touches_filters(&self) -> bool {
        self.q.is_some()
            || self.sort.is_some()
            || self.sort_direction.is_some()
            || self.selected_items.is_some()
            || !self.column_filters.is_empty()
            || !self.range_filters.is_empty()
    }

    pub fn validate(&self, config: &CodecConfig) -> Result<(), ValidationError> {
        if self.page == Some(0) {
            return Err(ValidationError::PageOutOfRange);
        }
        if let Some(size) = self.size
            && (size == 0 || size > config.max_size)
        {
            return Err(ValidationError::SizeOutOfRange {
                max: config.max_size,
                actual: size,
            });
        }
        if let Some(FieldUpdate::Set(column)) = &self.sort
            && !is_sortable_column(column)
        {
            return Err(ValidationError::InvalidSort(column.clone()));
        }
        if let Some(items) = &self.selected_items
            && items
                .iter()
                .any(|item| item.path.is_empty() || item.path.iter().any(|s| s.trim().is_empty()))
        {
            return Err(ValidationError::EmptySelection);
        }
        for key in self.column_filters.keys() {
            if !config.is_column_key(key) {
                return Err(ValidationError::UnknownColumn(key.clone()));
            }
        }
        for (key, update) in &self.range_filters {
            if !config.is_range_key(key) {
                return Err(ValidationError::UnknownRange(key.clone()));
            }
            if let FieldUpdate::Set(range) = update {
                validate_range(key, range)?;
            }
        }
        Ok(())
    }

    /// Merge into `current`, returning the normalized result.
    pub fn apply_to(self, current: &DomainFilters) -> DomainFilters {
        let reset_page = self.touches_filters() && self.page.is_none();
        let mut next = current.clone();

        if let Some(update) = self.q {
            update.apply(&mut next.q);
        }
        if let Some(page) = self.page {
            next.page = page;
        } else if reset_page {
            next.page = DEFAULT_PAGE;
        }
        if let Some(size) = self.size {
            next.size = size;
        }
        if let Some(update) = self.sort {
            update.apply(&mut next.sort);
        }
        if let Some(update) = self.sort_direction {
            update.apply(&mut next.sort_direction);
        }
        // Segments are trimmed the same way the `selected` URL parameter is
        // parsed, so an edit and its URL compare equal.
        if let Some(items) = self.selected_items {
            next.selected_items = items
                .into_iter()
                .filter_map(|item| {
                    HierarchicalSelection::from_path(
                        item.path
                            .iter()
                            .map(String::as_str)
                            .map(str::trim)
                            .filter(|segment| !segment.is_empty()),
                    )
                })
                .collect();
        }
        for (key, update) in self.column_filters {
            match update {
                FieldUpdate::Set(value) => {
                    next.column_filters.insert(key, value);
                }
                FieldUpdate::Remove => {
                    next.column_filters.remove(&key);
                }
            }
        }
        for (key, update) in self.range_filters {
            match update {
                FieldUpdate::Set(range) => {
                    next.range_filters.insert(key, range);
                }
                FieldUpdate::Remove => {
                    next.range_filters.remove(&key);
                }
            }
        }

        next.normalized()
    }
}

/// Index field paths: letters, digits, `_` and `.`.
fn is_sortable_column(column: &str) -> bool {
    !column.is_empty()
        && column
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.')
}

fn validate_range(key: &str, range: &RangeFilter) -> Result<(), ValidationError> {
    let finite = |bound: Option<f64>| bound.is_none_or(f64::is_finite);
    if !finite(range.min) || !finite(range.max) {
        return Err(ValidationError::NonFiniteBound(key.to_string()));
    }
    if let (Some(min), Some(max)) = (range.min, range.max)
        && min > max
    {
        return Err(ValidationError::InvertedRange {
            key: key.to_string(),
            min,
            max,
        });
    }
    Ok(())
}
