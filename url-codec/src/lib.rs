/*!
# URL codec

Pure conversions between [`DomainFilters`] and the flat parameter map that
lives in the page URL.

| Param | Format | Example |
|---|---|---|
| `q` | raw string | `q=mustang` |
| `page` | positive integer | `page=2` |
| `size` | integer, 1..=max | `size=50` |
| `sort` | column key | `sort=year` |
| `sortDirection` | `asc` / `desc` | `sortDirection=desc` |
| `selected` | comma-joined `segment:segment` tuples | `selected=Ford:F-150,Chevrolet:Corvette` |
| `<columnKey>` | raw string | `bodyClass=Pickup` |
| `<rangeKey>Min` / `<rangeKey>Max` | number | `yearMin=2015&yearMax=2020` |

Parsing is total: a hand-edited URL degrades to defaults instead of failing.
*/

mod config;
mod error;
mod params;
mod query_string;
mod selection;

pub use autos_protocol::DomainFilters;
pub use config::CodecConfig;
pub use error::CodecError;
pub use params::PARAM_PAGE;
pub use params::PARAM_QUERY;
pub use params::PARAM_SELECTED;
pub use params::PARAM_SIZE;
pub use params::PARAM_SORT;
pub use params::PARAM_SORT_DIRECTION;
pub use params::ParamMap;
pub use params::parse;
pub use params::range_max_param;
pub use params::range_min_param;
pub use params::serialize;
pub use query_string::parse_query_string;
pub use query_string::to_query_string;
pub use selection::decode_selections;
pub use selection::encode_selections;

/// A validated [`CodecConfig`] bundled with the codec operations.
#[derive(Debug, Clone)]
pub struct UrlCodec {
    config: CodecConfig,
}

impl UrlCodec {
    pub fn new(config: CodecConfig) -> Result<Self, CodecError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Filters in their initial state: default page and size, nothing else.
    pub fn defaults(&self) -> DomainFilters {
        DomainFilters::with_pagination(self.config.default_page, self.config.default_size)
    }

    pub fn parse(&self, params: &ParamMap) -> DomainFilters {
        params::parse(&self.config, params)
    }

    pub fn serialize(&self, filters: &DomainFilters) -> ParamMap {
        params::serialize(filters)
    }

    pub fn parse_query(&self, raw: &str) -> DomainFilters {
        self.parse(&parse_query_string(raw))
    }

    pub fn to_query(&self, filters: &DomainFilters) -> String {
        to_query_string(&self.config, &self.serialize(filters))
    }

    /// The canonical URL form of whatever `raw` says.
    pub fn normalize_query(&self, raw: &str) -> String {
        self.to_query(&self.parse_query(raw))
    }
}

impl Default for UrlCodec {
    fn default() -> Self {
        Self {
            config: CodecConfig::default(),
        }
    }
}
