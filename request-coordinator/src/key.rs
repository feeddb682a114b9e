use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use sha1::Digest;
use sha1::Sha1;

/// Deterministic identifier of one logical request.
///
/// Built from an endpoint name and the canonical JSON form of the request
/// parameters, so logically identical requests share a key no matter which
/// code path issued them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<RequestKey> for String {
    fn from(key: RequestKey) -> Self {
        key.0
    }
}

pub fn request_key<P>(endpoint: &str, params: &P) -> Result<RequestKey, serde_json::Error>
where
    P: Serialize + ?Sized,
{
    let canonical = canonical_json(params)?;
    let digest = Sha1::digest(canonical.as_bytes());
    Ok(RequestKey(format!("{endpoint}:{digest:x}")))
}

/// JSON with object keys sorted at every depth.
pub fn canonical_json<P>(params: &P) -> Result<String, serde_json::Error>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params)?;
    serde_json::to_string(&sorted(value))
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let entries: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(key, value)| (key, sorted(value)))
                .collect();
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}
