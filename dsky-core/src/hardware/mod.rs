//! In-memory hardware model.
//!
//! Programs act on these instead of real drivers:
//! - `Scheduler`: periodic invocation slots
//! - `IndicatorPanel`: annunciator lamps
//! - `Rtc`: real-time clock and alarm
//! - `Gps`, `Imu`, `Audio`: sensor readings and the track player

mod indicators;
mod rtc;
mod scheduler;

pub use indicators::{Colour, Indicator, IndicatorPanel, Lamp, LampState, NUM_INDICATORS};
pub use rtc::{
    AlarmProgram, Rtc, LARGEST_HOUR_IN_A_DAY, LARGEST_MINUTE_IN_AN_HOUR,
    LARGEST_SECOND_IN_A_MINUTE,
};
pub use scheduler::{Scheduler, SlotHandle};

use serde::{Deserialize, Serialize};

/// A position and time fix from the satellite receiver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Gps {
    fix: Option<GpsFix>,
}

impl Gps {
    pub fn new(fix: Option<GpsFix>) -> Self {
        Self { fix }
    }

    pub fn fix(&self) -> Option<GpsFix> {
        self.fix
    }

    pub fn set_fix(&mut self, fix: Option<GpsFix>) {
        self.fix = fix;
    }
}

/// Raw three-axis reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Imu {
    #[serde(default)]
    pub gyro: Vector3,
    #[serde(default)]
    pub accel: Vector3,
}

/// Sound tracks on the player's card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Track {
    Houston = 0,
    Countdown = 1,
    Landing = 2,
}

impl TryFrom<u16> for Track {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Houston),
            1 => Ok(Self::Countdown),
            2 => Ok(Self::Landing),
            _ => Err(value),
        }
    }
}

/// Track player. Tracks played since the last drain are kept for the console.
#[derive(Debug, Clone, Default)]
pub struct Audio {
    queued: Vec<Track>,
}

impl Audio {
    /// Start a track. Returns false for a track number not on the card.
    pub fn play(&mut self, track: u16) -> bool {
        match Track::try_from(track) {
            Ok(t) => {
                self.queued.push(t);
                true
            }
            Err(n) => {
                log::warn!("no such track: {}", n);
                false
            }
        }
    }

    pub fn drain(&mut self) -> Vec<Track> {
        std::mem::take(&mut self.queued)
    }
}

/// Every peripheral a program can touch.
#[derive(Debug, Clone, Default)]
pub struct Hardware {
    pub indicators: IndicatorPanel,
    pub rtc: Rtc,
    pub gps: Gps,
    pub imu: Imu,
    pub audio: Audio,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_rejects_unknown_track() {
        let mut a = Audio::default();
        assert!(a.play(1));
        assert!(!a.play(7));
        assert_eq!(a.drain(), vec![Track::Countdown]);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn test_gps_fix_from_json() {
        let fix: GpsFix = serde_json::from_str(
            r#"{"latitude": 28.5, "longitude": -80.6, "altitude": 3.0,
                "hour": 13, "minute": 32, "second": 0}"#,
        )
        .unwrap();
        assert_eq!(fix.hour, 13);
        assert_eq!(Gps::new(Some(fix)).fix(), Some(fix));
    }
}
