use url::form_urlencoded;

use crate::config::CodecConfig;
use crate::params::ParamMap;
use crate::params::RESERVED_PARAMS;
use crate::params::range_max_param;
use crate::params::range_min_param;

/// Split a raw query string (with or without the leading `?`) into a
/// [`ParamMap`]. Later duplicates win, matching `URLSearchParams.get` on the
/// last assignment.
pub fn parse_query_string(raw: &str) -> ParamMap {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    form_urlencoded::parse(raw.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Render parameters as a query string (no leading `?`) in a stable order:
/// reserved parameters first, then configured column keys, then range bounds,
/// then anything else alphabetically.
pub fn to_query_string(config: &CodecConfig, params: &ParamMap) -> String {
    let mut ordered: Vec<String> = RESERVED_PARAMS.iter().map(ToString::to_string).collect();
    ordered.extend(config.column_filter_keys.iter().cloned());
    for key in &config.range_filter_keys {
        ordered.push(range_min_param(key));
        ordered.push(range_max_param(key));
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for key in &ordered {
        if let Some(value) = params.get(key) {
            serializer.append_pair(key, value);
        }
    }
    for (key, value) in params {
        if !ordered.contains(key) {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}
