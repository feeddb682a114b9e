use tokio::time::Instant;

use crate::error::RequestError;

/// Loading/error bookkeeping for one request key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestRecord {
    pub loading: bool,
    pub error: Option<RequestError>,
    pub last_updated: Option<Instant>,
}

impl RequestRecord {
    pub(crate) fn started(previous: &RequestRecord) -> Self {
        Self {
            loading: true,
            error: None,
            last_updated: previous.last_updated,
        }
    }

    pub(crate) fn finished(error: Option<RequestError>, now: Instant) -> Self {
        Self {
            loading: false,
            error,
            last_updated: Some(now),
        }
    }
}
