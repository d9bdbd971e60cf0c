//! GPS and IMU readouts.
//!
//! Unlike the clock programs these keep their slot when pushed to the
//! background and pick up where they were when brought back; they only stop
//! refreshing the display while out of the foreground.

use super::PeriodicSlot;
use crate::hardware::{Colour, Indicator, LampState, Vector3};
use crate::program::{CallState, DisplayData, Program, ProgramContext, RunState, ALL_DIGITS};

const GPS_INTERVAL_MS: u64 = 500;
const IMU_INTERVAL_MS: u64 = 100;

/// Lifecycle shared by the readouts. `refresh` runs when the program takes
/// the foreground.
fn readout_call(
    slot: &mut PeriodicSlot,
    foreground: &mut bool,
    call: CallState,
    interval_ms: u64,
    ctx: &mut ProgramContext<'_>,
) -> RunState {
    match call {
        CallState::Start | CallState::BringToForeground | CallState::Reset => {
            slot.acquire(ctx, interval_ms);
            *foreground = true;
            RunState::Foreground
        }
        CallState::PushToBackground => {
            *foreground = false;
            if slot.is_held() {
                RunState::Background
            } else {
                RunState::NotRunning
            }
        }
        CallState::Pause => {
            slot.suspend(ctx);
            *foreground = false;
            RunState::NotRunning
        }
        CallState::Unpause => {
            *foreground = slot.resume(ctx);
            if *foreground {
                RunState::Foreground
            } else {
                RunState::NotRunning
            }
        }
        CallState::Stop => {
            slot.release(ctx);
            *foreground = false;
            RunState::NotRunning
        }
    }
}

/// Fixed-point rendering of a coordinate. There is no decimal point on the
/// display, so a blanked digit stands in for one: the more integer digits,
/// the fewer fraction digits.
pub(crate) fn coordinate_digits(degrees: f64) -> (i32, u8) {
    let degrees = degrees.clamp(-180.0, 180.0);
    let whole = degrees as i32;
    if whole.abs() > 99 {
        (whole * 100 + (degrees * 10.0) as i32 % 10, 0x3D)
    } else if whole.abs() > 9 {
        (whole * 1000 + (degrees * 100.0) as i32 % 100, 0x3B)
    } else {
        (whole * 10000 + (degrees * 1000.0) as i32 % 1000, 0x37)
    }
}

/// V16N43: latitude, longitude and altitude from the current fix.
#[derive(Debug, Default)]
pub struct GpsPosition {
    slot: PeriodicSlot,
    foreground: bool,
    display: Option<DisplayData>,
}

impl GpsPosition {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh(&mut self, ctx: &mut ProgramContext<'_>) {
        let mut display = DisplayData::labelled(16, 43);
        let lamps = &mut ctx.hardware.indicators;
        lamps.set(Indicator::Verb, Colour::Green, LampState::On);
        lamps.set(Indicator::Noun, Colour::Green, LampState::On);
        lamps.set(Indicator::CompActy, Colour::WarmWhite, LampState::SlowFlash);

        match ctx.hardware.gps.fix() {
            Some(fix) => {
                (display.r1, display.r1_mask) = coordinate_digits(fix.latitude);
                (display.r2, display.r2_mask) = coordinate_digits(fix.longitude);
                display.r3 = fix.altitude as i32 % 10_000;
                display.r3_mask = ALL_DIGITS;
                ctx.hardware
                    .indicators
                    .set(Indicator::Tracker, Colour::WarmWhite, LampState::On);
            }
            None => {
                ctx.hardware
                    .indicators
                    .set(Indicator::Tracker, Colour::WarmWhite, LampState::Off);
            }
        }
        self.display = Some(display);
    }
}

impl Program for GpsPosition {
    fn name(&self) -> &str {
        "gps position"
    }

    fn call(&mut self, call: CallState, ctx: &mut ProgramContext<'_>) -> RunState {
        let state = readout_call(&mut self.slot, &mut self.foreground, call, GPS_INTERVAL_MS, ctx);
        match call {
            CallState::Stop => {
                let lamps = &mut ctx.hardware.indicators;
                for which in [
                    Indicator::Verb,
                    Indicator::Noun,
                    Indicator::Tracker,
                    Indicator::CompActy,
                ] {
                    lamps.set(which, Colour::WarmWhite, LampState::Off);
                }
            }
            _ if self.foreground => self.refresh(ctx),
            _ => {}
        }
        state
    }

    fn display(&self) -> Option<&DisplayData> {
        self.display.as_ref()
    }

    fn run_periodic(&mut self, ctx: &mut ProgramContext<'_>) {
        if self.foreground {
            self.refresh(ctx);
        }
    }
}

/// Which IMU vector a readout shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImuSensor {
    Gyro,
    Accel,
}

/// V16N29 / V16N30: raw gyro or accelerometer axes.
#[derive(Debug)]
pub struct ImuView {
    sensor: ImuSensor,
    slot: PeriodicSlot,
    foreground: bool,
    display: Option<DisplayData>,
}

impl ImuView {
    pub fn new(sensor: ImuSensor) -> Self {
        Self {
            sensor,
            slot: PeriodicSlot::default(),
            foreground: false,
            display: None,
        }
    }

    fn reading(&self, ctx: &ProgramContext<'_>) -> Vector3 {
        match self.sensor {
            ImuSensor::Gyro => ctx.hardware.imu.gyro,
            ImuSensor::Accel => ctx.hardware.imu.accel,
        }
    }

    fn refresh(&mut self, ctx: &mut ProgramContext<'_>) {
        let noun = match self.sensor {
            ImuSensor::Gyro => 29,
            ImuSensor::Accel => 30,
        };
        let v = self.reading(ctx);
        let mut display = DisplayData::labelled(16, noun);
        display.r1 = v.x.into();
        display.r2 = v.y.into();
        display.r3 = v.z.into();
        display.set_masks(ALL_DIGITS);
        self.display = Some(display);

        let lamps = &mut ctx.hardware.indicators;
        lamps.set(Indicator::Verb, Colour::Green, LampState::On);
        lamps.set(Indicator::Noun, Colour::Green, LampState::On);
    }
}

impl Program for ImuView {
    fn name(&self) -> &str {
        match self.sensor {
            ImuSensor::Gyro => "imu gyro",
            ImuSensor::Accel => "imu accel",
        }
    }

    fn call(&mut self, call: CallState, ctx: &mut ProgramContext<'_>) -> RunState {
        let state = readout_call(&mut self.slot, &mut self.foreground, call, IMU_INTERVAL_MS, ctx);
        match call {
            CallState::Stop => {
                let lamps = &mut ctx.hardware.indicators;
                lamps.set(Indicator::Verb, Colour::Green, LampState::Off);
                lamps.set(Indicator::Noun, Colour::Green, LampState::Off);
            }
            _ if self.foreground => self.refresh(ctx),
            _ => {}
        }
        state
    }

    fn display(&self) -> Option<&DisplayData> {
        self.display.as_ref()
    }

    fn run_periodic(&mut self, ctx: &mut ProgramContext<'_>) {
        if self.foreground {
            self.refresh(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{GpsFix, Hardware, Imu};
    use crate::keyboard::Dispatcher;
    use crate::programs::standard_registry;

    #[test]
    fn test_coordinate_precision_follows_magnitude() {
        assert_eq!(coordinate_digits(28.5), (28_050, 0x3B));
        assert_eq!(coordinate_digits(-80.75), (-80_075, 0x3B));
        assert_eq!(coordinate_digits(151.25), (15_102, 0x3D));
        assert_eq!(coordinate_digits(5.125), (50_125, 0x37));
    }

    fn fix() -> GpsFix {
        GpsFix {
            latitude: 28.5,
            longitude: 151.25,
            altitude: 12_345.0,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    #[test]
    fn test_gps_position_display_and_lamps() {
        let mut hw = Hardware::default();
        hw.gps.set_fix(Some(fix()));
        let mut r = standard_registry(hw);
        r.dispatch_verb(16);
        r.dispatch_noun(43);

        let d = *r.foreground_display().unwrap();
        assert_eq!((d.r1, d.r1_mask), (28_050, 0x3B));
        assert_eq!((d.r2, d.r2_mask), (15_102, 0x3D));
        assert_eq!(d.r3, 2_345);
        let panel = &r.hardware().indicators;
        assert_eq!(panel.lamp(Indicator::Tracker).state, LampState::On);
        assert_eq!(panel.lamp(Indicator::CompActy).state, LampState::SlowFlash);
        assert_eq!(panel.lamp(Indicator::Verb).colour, Colour::Green);
    }

    #[test]
    fn test_gps_position_pins_wild_coordinates() {
        let mut hw = Hardware::default();
        hw.gps.set_fix(Some(GpsFix {
            latitude: 3.0e7,
            longitude: -3.0e7,
            altitude: 1.0e12,
            ..fix()
        }));
        let mut r = standard_registry(hw);
        r.dispatch_verb(16);
        r.dispatch_noun(43);

        let d = *r.foreground_display().unwrap();
        assert_eq!((d.r1, d.r1_mask), (18_000, 0x3D));
        assert_eq!((d.r2, d.r2_mask), (-18_000, 0x3D));
        assert!(d.r3.abs() < 10_000);
    }

    #[test]
    fn test_gps_position_survives_background() {
        let mut r = standard_registry(Hardware::default());
        r.dispatch_verb(16);
        r.dispatch_noun(43);
        r.dispatch_verb(21);
        r.dispatch_noun(98);
        assert_eq!(r.run_state_of(16, Some(43)), Some(RunState::Background));
        assert_eq!(r.scheduler().len(), 1);

        r.dispatch_verb(34);
        // the sound test was foreground, so the readout is untouched
        assert_eq!(r.run_state_of(16, Some(43)), Some(RunState::Background));

        r.set_program(16, Some(43), CallState::BringToForeground);
        assert_eq!(r.run_state_of(16, Some(43)), Some(RunState::Foreground));
        assert_eq!(r.scheduler().len(), 1);
    }

    #[test]
    fn test_gps_position_stop_clears_lamps() {
        let mut hw = Hardware::default();
        hw.gps.set_fix(Some(fix()));
        let mut r = standard_registry(hw);
        r.set_program(16, Some(43), CallState::Start);
        r.dispatch_verb(34);
        assert!(!r.hardware().indicators.any_lit());
        assert!(r.scheduler().is_empty());
    }

    #[test]
    fn test_imu_views_show_their_vector() {
        let hw = Hardware {
            imu: Imu {
                gyro: Vector3 { x: 1, y: -2, z: 3 },
                accel: Vector3 { x: 10, y: 20, z: -30 },
            },
            ..Hardware::default()
        };
        let mut r = standard_registry(hw);
        r.set_program(16, Some(29), CallState::Start);
        let d = *r.foreground_display().unwrap();
        assert_eq!((d.noun, d.r1, d.r2, d.r3), (29, 1, -2, 3));

        r.set_program(16, Some(30), CallState::Start);
        let d = *r.foreground_display().unwrap();
        assert_eq!((d.noun, d.r1, d.r2, d.r3), (30, 10, 20, -30));
        assert_eq!(d.r3_mask, ALL_DIGITS);
        assert_eq!(r.run_state_of(16, Some(29)), Some(RunState::Background));
    }

    #[test]
    fn test_background_readout_stops_refreshing() {
        let mut r = standard_registry(Hardware::default());
        r.set_program(16, Some(29), CallState::Start);
        r.set_program(21, Some(98), CallState::Start);
        r.hardware_mut().imu.gyro = Vector3 { x: 7, y: 7, z: 7 };
        r.run_due(1_000);
        let gyro = &r.entries()[9];
        assert_eq!(gyro.noun(), Some(29));
        assert_eq!(gyro.display().map(|d| d.r1), Some(0));

        r.set_program(16, Some(29), CallState::BringToForeground);
        assert_eq!(r.foreground_display().unwrap().r1, 7);
    }
}
