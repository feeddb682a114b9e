use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

use crate::filters::DomainFilters;
use crate::vehicle::VehicleResult;

/// Everything the dashboard UI renders from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema, TS)]
pub struct AppState {
    pub filters: DomainFilters,
    pub results: Vec<VehicleResult>,
    pub total: u64,
    pub loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppState {
    pub fn new(filters: DomainFilters) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }
}
