//! Station behaviour configuration

use std::time::Duration;

use serde::Deserialize;

use crate::adapters::websocket::HeartbeatSettings;
use crate::application::CoordinatorSettings;
use crate::domain::station::{AdmissionPolicy, Track};

use super::error::ValidationError;

/// Upper bound for the per-connection outbound queue.
pub const MAX_OUTBOUND_BUFFER: usize = 65_536;

/// Station configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    /// What happens when a second broadcaster tries to go live
    #[serde(default)]
    pub admission_policy: AdmissionPolicy,

    /// Forward binary frames from the broadcaster to listeners
    #[serde(default)]
    pub binary_relay: bool,

    /// Check sender roles on offer/answer/candidate
    #[serde(default)]
    pub strict_signaling: bool,

    /// Frames queued per connection before it is dropped as unresponsive
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Seconds between protocol pings on every socket
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// Seconds of silence after which a socket is closed
    #[serde(default = "default_heartbeat_timeout_secs")]
    pub heartbeat_timeout_secs: u64,

    /// Track shown while nobody is broadcasting
    #[serde(default = "default_title")]
    pub default_title: String,

    #[serde(default = "default_artist")]
    pub default_artist: String,

    pub default_cover: Option<String>,
}

impl StationConfig {
    /// The validated idle track.
    pub fn default_track(&self) -> Result<Track, ValidationError> {
        Track::new(
            self.default_title.clone(),
            self.default_artist.clone(),
            self.default_cover.clone(),
        )
        .map_err(|e| ValidationError::InvalidDefaultTrack(e.to_string()))
    }

    /// Coordinator settings for this configuration.
    pub fn coordinator_settings(&self) -> Result<CoordinatorSettings, ValidationError> {
        Ok(CoordinatorSettings::new(self.default_track()?)
            .with_admission_policy(self.admission_policy)
            .with_binary_relay(self.binary_relay)
            .with_strict_signaling(self.strict_signaling))
    }

    pub fn heartbeat(&self) -> HeartbeatSettings {
        HeartbeatSettings::new(
            Duration::from_secs(self.heartbeat_interval_secs),
            Duration::from_secs(self.heartbeat_timeout_secs),
        )
    }

    /// Validate station configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.outbound_buffer == 0 || self.outbound_buffer > MAX_OUTBOUND_BUFFER {
            return Err(ValidationError::InvalidOutboundBuffer {
                max: MAX_OUTBOUND_BUFFER,
            });
        }
        if self.heartbeat_interval_secs == 0
            || self.heartbeat_timeout_secs < self.heartbeat_interval_secs
        {
            return Err(ValidationError::InvalidHeartbeat {
                interval: self.heartbeat_interval_secs,
                timeout: self.heartbeat_timeout_secs,
            });
        }
        self.default_track()?;
        Ok(())
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            admission_policy: AdmissionPolicy::default(),
            binary_relay: false,
            strict_signaling: false,
            outbound_buffer: default_outbound_buffer(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            heartbeat_timeout_secs: default_heartbeat_timeout_secs(),
            default_title: default_title(),
            default_artist: default_artist(),
            default_cover: None,
        }
    }
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_heartbeat_interval_secs() -> u64 {
    25
}

fn default_heartbeat_timeout_secs() -> u64 {
    60
}

fn default_title() -> String {
    "Off Air".to_string()
}

fn default_artist() -> String {
    "Station Relay".to_string()
}
