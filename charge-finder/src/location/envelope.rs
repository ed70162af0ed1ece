//! Voice-assistant request envelope.
//!
//! Only the parts of the platform's JSON envelope that the resolvers read
//! are modelled here; everything else is ignored during deserialization.
//! Key casing follows the platform (`System` and `Geolocation` are
//! PascalCase inside `context`, everything else camelCase).
//!
//! The live fix is kept as raw JSON and decoded on demand, so a malformed
//! fix never makes the rest of the envelope unreadable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Top-level request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    pub context: Context,
    pub request: Request,
}

/// Request context: device information and the live geolocation fix.
#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    #[serde(rename = "System")]
    pub system: SystemState,

    /// Present only when the device shares its location. Decoded by
    /// [`RequestEnvelope::geolocation_fix`].
    #[serde(rename = "Geolocation", default)]
    pub geolocation: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    pub device: Device,

    /// Base URL for platform service calls (device address lookup).
    #[serde(default)]
    pub api_endpoint: Option<String>,

    /// Bearer token for platform service calls.
    #[serde(default)]
    pub api_access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,

    #[serde(default)]
    pub supported_interfaces: SupportedInterfaces,
}

/// Capabilities declared by the device.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupportedInterfaces {
    #[serde(rename = "Geolocation", default)]
    pub geolocation: Option<GeolocationInterface>,
}

/// Marker object; its presence is the capability.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeolocationInterface {}

/// A single device-reported location reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geolocation {
    /// RFC 3339 time at which the fix was taken.
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub coordinate: Option<GeoCoordinate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoCoordinate {
    pub latitude_in_degrees: f64,
    pub longitude_in_degrees: f64,

    /// Accuracy radius in meters.
    #[serde(default)]
    pub accuracy_in_meters: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// RFC 3339 time at which the platform sent the request.
    pub timestamp: String,
}

impl RequestEnvelope {
    /// Parse an envelope from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether the originating device declares the geolocation capability.
    pub fn supports_geolocation(&self) -> bool {
        self.context
            .system
            .device
            .supported_interfaces
            .geolocation
            .is_some()
    }

    /// The live fix, if one is present and well-formed.
    ///
    /// A fix that does not match the expected shape is treated as absent.
    pub fn geolocation_fix(&self) -> Option<Geolocation> {
        let raw = self.context.geolocation.as_ref()?;
        match Geolocation::deserialize(raw) {
            Ok(geo) => Some(geo),
            Err(e) => {
                debug!(error = %e, "ignoring malformed geolocation fix");
                None
            }
        }
    }

    /// The originating device's identifier.
    pub fn device_id(&self) -> &str {
        &self.context.system.device.device_id
    }
}
