//! Freshness calculations for stored star system data.

use chrono::{DateTime, Utc};

/// Determines whether data last refreshed at `last_updated` has outlived `threshold`.
///
/// Data refreshed exactly `threshold` ago is still considered fresh. Timestamps in the
/// future (clock skew between writers) are treated as fresh as well.
///
/// # Arguments
/// - `last_updated` - When the data was last refreshed from a remote authority
/// - `now` - Current UTC timestamp to measure the age against
/// - `threshold` - Maximum age before the data must be refetched
///
/// # Returns
/// - `true` - The data is older than `threshold`
/// - `false` - The data is still fresh, or `threshold` is too large to ever be exceeded
pub fn is_outdated(
    last_updated: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold: std::time::Duration,
) -> bool {
    let Ok(threshold) = chrono::Duration::from_std(threshold) else {
        return false;
    };

    now.signed_duration_since(last_updated) > threshold
}
