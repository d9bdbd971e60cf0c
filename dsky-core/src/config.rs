//! Console configuration.
//!
//! A JSON file with camelCase keys; every field is optional:
//!
//! ```json
//! {
//!   "tickMs": 10,
//!   "alarmPollMs": 500,
//!   "startTime": "1969-07-20T20:17:40",
//!   "gps": { "latitude": 28.5, "longitude": -80.6, "altitude": 3.0,
//!            "hour": 13, "minute": 32, "second": 0 },
//!   "imu": { "gyro": { "x": 0, "y": 0, "z": 0 } },
//!   "trace": false
//! }
//! ```

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{DskyError, DskyResult};
use crate::hardware::{Gps, GpsFix, Hardware, Imu, Rtc};

fn default_tick_ms() -> u64 {
    10
}

fn default_alarm_poll_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// Milliseconds per machine step.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// How often the RTC alarm is checked.
    #[serde(default = "default_alarm_poll_ms")]
    pub alarm_poll_ms: u64,
    /// Clock reading at power-up. Host local time if absent.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub gps: Option<GpsFix>,
    #[serde(default)]
    pub imu: Imu,
    #[serde(default)]
    pub trace: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            alarm_poll_ms: default_alarm_poll_ms(),
            start_time: None,
            gps: None,
            imu: Imu::default(),
            trace: false,
        }
    }
}

impl ConsoleConfig {
    pub fn from_json(text: &str) -> DskyResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> DskyResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> DskyResult<()> {
        if self.tick_ms == 0 {
            return Err(DskyError::InvalidConfig("tickMs must be at least 1".into()));
        }
        // the alarm matches on a whole second, so polls must not skip one
        if !(1..=1000).contains(&self.alarm_poll_ms) {
            return Err(DskyError::InvalidConfig(
                "alarmPollMs must be between 1 and 1000".into(),
            ));
        }
        if let Some(fix) = &self.gps {
            if !(-90.0..=90.0).contains(&fix.latitude) {
                return Err(DskyError::InvalidConfig(format!(
                    "gps.latitude {} is outside -90..=90",
                    fix.latitude
                )));
            }
            if !(-180.0..=180.0).contains(&fix.longitude) {
                return Err(DskyError::InvalidConfig(format!(
                    "gps.longitude {} is outside -180..=180",
                    fix.longitude
                )));
            }
        }
        Ok(())
    }

    /// Hardware model at power-up. `fallback_start` sets the clock when the
    /// config has no start time.
    pub fn hardware(&self, fallback_start: NaiveDateTime) -> Hardware {
        Hardware {
            rtc: Rtc::new(self.start_time.unwrap_or(fallback_start), 0),
            gps: Gps::new(self.gps),
            imu: self.imu,
            ..Hardware::default()
        }
    }
}
