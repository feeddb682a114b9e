use std::collections::HashSet;

use autos_protocol::DEFAULT_PAGE;
use autos_protocol::DEFAULT_PAGE_SIZE;
use autos_protocol::MAX_PAGE_SIZE;
use serde::Deserialize;
use serde::Serialize;

use crate::error::CodecError;
use crate::params::RESERVED_PARAMS;
use crate::params::range_max_param;
use crate::params::range_min_param;

/// Which URL parameters the codec understands and how pagination defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Page used when `page` is absent or malformed
    #[serde(default = "default_page")]
    pub default_page: u32,

    /// Page size used when `size` is absent or malformed
    #[serde(default = "default_size")]
    pub default_size: u32,

    /// Upper bound for `size`; larger values are clamped
    #[serde(default = "default_max_size")]
    pub max_size: u32,

    /// Parameters copied verbatim into `columnFilters`, in URL order
    #[serde(default = "default_column_filter_keys")]
    pub column_filter_keys: Vec<String>,

    /// Keys read as `<key>Min` / `<key>Max` into `rangeFilters`
    #[serde(default = "default_range_filter_keys")]
    pub range_filter_keys: Vec<String>,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_column_filter_keys() -> Vec<String> {
    [
        "manufacturer",
        "model",
        "bodyClass",
        "bodyStyle",
        "dataSource",
        "vin",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_range_filter_keys() -> Vec<String> {
    vec!["year".to_string()]
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_page: default_page(),
            default_size: default_size(),
            max_size: default_max_size(),
            column_filter_keys: default_column_filter_keys(),
            range_filter_keys: default_range_filter_keys(),
        }
    }
}

impl CodecConfig {
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.default_page == 0 {
            return Err(CodecError::InvalidDefaultPage);
        }
        if self.max_size == 0 || self.max_size > MAX_PAGE_SIZE {
            return Err(CodecError::MaxSizeOutOfBounds {
                limit: MAX_PAGE_SIZE,
                actual: self.max_size,
            });
        }
        if self.default_size == 0 || self.default_size > self.max_size {
            return Err(CodecError::DefaultSizeOutOfBounds {
                default_size: self.default_size,
                max_size: self.max_size,
            });
        }

        let mut seen: HashSet<String> = RESERVED_PARAMS.iter().map(ToString::to_string).collect();
        for key in &self.column_filter_keys {
            claim(&mut seen, key.clone(), key)?;
        }
        for key in &self.range_filter_keys {
            claim(&mut seen, range_min_param(key), key)?;
            claim(&mut seen, range_max_param(key), key)?;
        }
        Ok(())
    }

    pub fn is_column_key(&self, key: &str) -> bool {
        self.column_filter_keys.iter().any(|k| k == key)
    }

    pub fn is_range_key(&self, key: &str) -> bool {
        self.range_filter_keys.iter().any(|k| k == key)
    }

    pub fn clamp_size(&self, size: u32) -> u32 {
        size.clamp(1, self.max_size.max(1))
    }
}

fn claim(seen: &mut HashSet<String>, param: String, key: &str) -> Result<(), CodecError> {
    if key.is_empty() {
        return Err(CodecError::EmptyKey);
    }
    if RESERVED_PARAMS.contains(&param.as_str()) {
        return Err(CodecError::ReservedKey(key.to_string()));
    }
    if !seen.insert(param) {
        return Err(CodecError::DuplicateKey(key.to_string()));
    }
    Ok(())
}
