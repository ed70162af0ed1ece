//! Device geolocation resolver.
//!
//! Reads the live fix from the request envelope and accepts it only if it
//! is accurate and fresh. Anything short of that yields `None`: a fix is
//! never partially trusted.

use chrono::{DateTime, Duration};
use tracing::debug;

use crate::domain::Coordinate;

use super::envelope::RequestEnvelope;

/// Fixes with an accuracy radius at or above this are rejected.
pub const ACCURACY_THRESHOLD_METERS: f64 = 100.0;

/// Fixes at least this old (relative to the request) are rejected.
pub const FRESHNESS_THRESHOLD_SECS: i64 = 60;

/// Acceptance thresholds for a geolocation fix.
#[derive(Debug, Clone)]
pub struct FixPolicy {
    /// Exclusive upper bound on the accuracy radius, in meters.
    pub max_accuracy_meters: f64,
    /// Exclusive upper bound on fix age.
    pub max_age: Duration,
}

impl FixPolicy {
    /// Create a policy with the given thresholds.
    pub fn new(max_accuracy_meters: f64, max_age: Duration) -> Self {
        Self {
            max_accuracy_meters,
            max_age,
        }
    }

    /// Whether a fix with this accuracy and age is usable.
    ///
    /// A missing accuracy radius is never accepted.
    pub fn accepts(&self, accuracy_meters: Option<f64>, age: Duration) -> bool {
        accuracy_meters.is_some_and(|a| a < self.max_accuracy_meters) && age < self.max_age
    }
}

impl Default for FixPolicy {
    fn default() -> Self {
        Self {
            max_accuracy_meters: ACCURACY_THRESHOLD_METERS,
            max_age: Duration::seconds(FRESHNESS_THRESHOLD_SECS),
        }
    }
}

/// Resolve the user's coordinates from the device's live fix.
///
/// Returns `None` if the device lacks the geolocation capability, or if
/// the fix is missing, malformed, inaccurate or stale. A fix whose
/// timestamp (or the request's) is not RFC 3339 counts as stale.
pub fn resolve_device_geolocation(envelope: &RequestEnvelope) -> Option<Coordinate> {
    resolve_device_geolocation_with(envelope, &FixPolicy::default())
}

/// Like [`resolve_device_geolocation`], with explicit thresholds.
pub fn resolve_device_geolocation_with(
    envelope: &RequestEnvelope,
    policy: &FixPolicy,
) -> Option<Coordinate> {
    if !envelope.supports_geolocation() {
        debug!("geolocation not available");
        return None;
    }

    let Some(geo) = envelope.geolocation_fix() else {
        debug!("geolocation validation failed: no usable fix in request");
        return None;
    };

    let request_ts = envelope.request.timestamp.as_str();
    let fix_ts = geo.timestamp.as_deref();

    let Some(age) = fix_age(request_ts, fix_ts) else {
        // Unparseable timestamps count as stale.
        debug!(
            request_timestamp = request_ts,
            fix_timestamp = ?fix_ts,
            "freshness check failed, geolocation validation failed"
        );
        return None;
    };

    match geo.coordinate.as_ref() {
        Some(c) if policy.accepts(c.accuracy_in_meters, age) => Some(Coordinate::new(
            c.latitude_in_degrees,
            c.longitude_in_degrees,
        )),
        other => {
            debug!(
                accuracy_meters = ?other.and_then(|c| c.accuracy_in_meters),
                age_secs = age.num_seconds(),
                "geolocation validation failed"
            );
            None
        }
    }
}

/// Time between the fix and the request.
///
/// Returns `None` if either timestamp is missing or not RFC 3339.
pub fn fix_age(request_timestamp: &str, fix_timestamp: Option<&str>) -> Option<Duration> {
    let request = DateTime::parse_from_rfc3339(request_timestamp).ok()?;
    let fix = DateTime::parse_from_rfc3339(fix_timestamp?).ok()?;
    Some(request.signed_duration_since(fix))
}
