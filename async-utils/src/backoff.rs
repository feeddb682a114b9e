use std::time::Duration;

/// Delay before retry number `retry_index` (zero-based): `base * 2^retry_index`.
///
/// Saturates instead of overflowing for absurd indices.
pub fn backoff_delay(base: Duration, retry_index: u32) -> Duration {
    let factor = 1u32.checked_shl(retry_index).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// All delays a caller configured with `retries` attempts may wait through.
pub fn backoff_schedule(base: Duration, retries: u32) -> Vec<Duration> {
    (0..retries).map(|idx| backoff_delay(base, idx)).collect()
}
