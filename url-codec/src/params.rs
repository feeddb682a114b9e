use std::collections::BTreeMap;

use autos_protocol::DomainFilters;
use autos_protocol::RangeFilter;
use autos_protocol::SortDirection;
use tracing::debug;

use crate::config::CodecConfig;
use crate::selection::decode_selections;
use crate::selection::encode_selections;

/// Flat string-keyed view of the URL query string.
pub type ParamMap = BTreeMap<String, String>;

pub const PARAM_QUERY: &str = "q";
pub const PARAM_PAGE: &str = "page";
pub const PARAM_SIZE: &str = "size";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_SORT_DIRECTION: &str = "sortDirection";
pub const PARAM_SELECTED: &str = "selected";

pub(crate) const RESERVED_PARAMS: [&str; 6] = [
    PARAM_QUERY,
    PARAM_PAGE,
    PARAM_SIZE,
    PARAM_SORT,
    PARAM_SORT_DIRECTION,
    PARAM_SELECTED,
];

pub fn range_min_param(key: &str) -> String {
    format!("{key}Min")
}

pub fn range_max_param(key: &str) -> String {
    format!("{key}Max")
}

/// Build filters from URL parameters.
///
/// Never fails: malformed values fall back to defaults (pagination) or are
/// dropped (everything else). Unknown parameters are ignored.
pub fn parse(config: &CodecConfig, params: &ParamMap) -> DomainFilters {
    let mut filters = DomainFilters::with_pagination(config.default_page, config.default_size);

    filters.q = non_empty(params.get(PARAM_QUERY));
    filters.page = params
        .get(PARAM_PAGE)
        .map(String::as_str)
        .and_then(parse_page)
        .unwrap_or(config.default_page);
    filters.size = params
        .get(PARAM_SIZE)
        .map(String::as_str)
        .and_then(parse_integer)
        .map(|size| config.clamp_size(size))
        .unwrap_or(config.default_size);
    filters.sort = non_empty(params.get(PARAM_SORT));
    filters.sort_direction = params
        .get(PARAM_SORT_DIRECTION)
        .map(String::as_str)
        .and_then(SortDirection::from_param);

    if let Some(raw) = params.get(PARAM_SELECTED) {
        filters.selected_items = decode_selections(raw);
    }

    for key in &config.column_filter_keys {
        if let Some(value) = non_empty(params.get(key)) {
            filters.column_filters.insert(key.clone(), value);
        }
    }

    for key in &config.range_filter_keys {
        let range = RangeFilter::new(
            params
                .get(&range_min_param(key))
                .map(String::as_str)
                .and_then(parse_number),
            params
                .get(&range_max_param(key))
                .map(String::as_str)
                .and_then(parse_number),
        );
        if !range.is_empty() {
            filters.range_filters.insert(key.clone(), range);
        }
    }

    filters
}

/// Flatten filters into URL parameters. Empty values are omitted entirely so
/// that clearing a filter removes it from the URL.
pub fn serialize(filters: &DomainFilters) -> ParamMap {
    let mut params = ParamMap::new();

    if let Some(q) = filters.q.as_deref().filter(|q| !q.is_empty()) {
        params.insert(PARAM_QUERY.to_string(), q.to_string());
    }
    params.insert(PARAM_PAGE.to_string(), filters.page.to_string());
    params.insert(PARAM_SIZE.to_string(), filters.size.to_string());
    if let Some(sort) = filters.sort.as_deref().filter(|s| !s.is_empty()) {
        params.insert(PARAM_SORT.to_string(), sort.to_string());
    }
    if let Some(direction) = filters.sort_direction {
        params.insert(
            PARAM_SORT_DIRECTION.to_string(),
            direction.as_str().to_string(),
        );
    }

    let selected = encode_selections(&filters.selected_items);
    if !selected.is_empty() {
        params.insert(PARAM_SELECTED.to_string(), selected);
    }

    for (key, value) in &filters.column_filters {
        if value.is_empty() {
            continue;
        }
        if RESERVED_PARAMS.contains(&key.as_str()) {
            debug!(key = %key, "column filter shadows a reserved parameter; not written");
            continue;
        }
        params.insert(key.clone(), value.clone());
    }

    for (key, range) in &filters.range_filters {
        if let Some(min) = range.min.filter(|v| v.is_finite()) {
            params.insert(range_min_param(key), min.to_string());
        }
        if let Some(max) = range.max.filter(|v| v.is_finite()) {
            params.insert(range_max_param(key), max.to_string());
        }
    }

    params
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn parse_integer(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

fn parse_page(raw: &str) -> Option<u32> {
    parse_integer(raw).filter(|page| *page >= 1)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
