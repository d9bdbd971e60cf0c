//! Clock programs: show the time, set it by hand or from GPS, set the alarm.

use chrono::{Datelike, Timelike};
use log::debug;

use super::PeriodicSlot;
use crate::hardware::{
    AlarmProgram, LARGEST_HOUR_IN_A_DAY, LARGEST_MINUTE_IN_AN_HOUR, LARGEST_SECOND_IN_A_MINUTE,
};
use crate::program::{CallState, DisplayData, Program, ProgramContext, RunState};

const SHOW_TIME_INTERVAL_MS: u64 = 333;

/// Two digits per register for hours, minutes and seconds.
const TIME_MASK: u8 = 0x03;

const HOURS_IDX: u8 = 0;
const MINUTES_IDX: u8 = 1;
const SECONDS_IDX: u8 = 2;

/// Buffer showing the RTC's current time under a verb/noun label.
fn time_display(verb: u8, noun: u8, ctx: &ProgramContext<'_>) -> DisplayData {
    let (hour, minute, second) = ctx.hardware.rtc.time(ctx.now_ms());
    let mut display = DisplayData::labelled(verb, noun);
    display.r1 = hour as i32;
    display.r2 = minute as i32;
    display.r3 = second as i32;
    display.set_masks(TIME_MASK);
    display
}

/// V16N36: shows the RTC time, refreshed three times a second.
/// Foreground only.
#[derive(Debug, Default)]
pub struct ShowTime {
    slot: PeriodicSlot,
    display: Option<DisplayData>,
}

impl ShowTime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Program for ShowTime {
    fn name(&self) -> &str {
        "show time"
    }

    fn call(&mut self, call: CallState, ctx: &mut ProgramContext<'_>) -> RunState {
        match call {
            CallState::Start | CallState::BringToForeground | CallState::Reset => {
                self.slot.acquire(ctx, SHOW_TIME_INTERVAL_MS);
                self.run_periodic(ctx);
                RunState::Foreground
            }
            _ => {
                self.slot.release(ctx);
                RunState::NotRunning
            }
        }
    }

    fn display(&self) -> Option<&DisplayData> {
        self.display.as_ref()
    }

    fn run_periodic(&mut self, ctx: &mut ProgramContext<'_>) {
        self.display = Some(time_display(16, 36, ctx));
    }
}

/// V25N36: hours, minutes, seconds entered one by one. Chains to V16N36
/// once the seconds are in.
#[derive(Debug, Default)]
pub struct LoadManualTime {
    display: Option<DisplayData>,
}

impl LoadManualTime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Program for LoadManualTime {
    fn name(&self) -> &str {
        "load time"
    }

    fn call(&mut self, call: CallState, ctx: &mut ProgramContext<'_>) -> RunState {
        match call {
            CallState::Start | CallState::BringToForeground | CallState::Reset => {
                self.display = Some(time_display(25, 36, ctx));
                RunState::Foreground
            }
            _ => RunState::NotRunning,
        }
    }

    fn accepts_data(&self) -> bool {
        true
    }

    fn submit_data(&mut self, index: u8, value: i32, ctx: &mut ProgramContext<'_>) -> RunState {
        let now = ctx.now_ms();
        let rtc = &mut ctx.hardware.rtc;
        let accepted = u32::try_from(value).is_ok_and(|v| match index {
            HOURS_IDX => rtc.set_hour(v, now),
            MINUTES_IDX => rtc.set_minute(v, now),
            SECONDS_IDX => rtc.set_second(v, now),
            _ => false,
        });
        if !accepted {
            debug!("load time: ignoring {} at {}", value, index);
            return RunState::Foreground;
        }

        if let Some(display) = self.display.as_mut() {
            match index {
                HOURS_IDX => display.r1 = value,
                MINUTES_IDX => display.r2 = value,
                _ => display.r3 = value,
            }
        }

        if index == SECONDS_IDX {
            ctx.set_program(16, Some(36), CallState::Start);
            RunState::NotRunning
        } else {
            RunState::Foreground
        }
    }

    fn display(&self) -> Option<&DisplayData> {
        self.display.as_ref()
    }
}

/// V26N36: takes an hour offset from GPS time (the local time zone) and sets
/// the RTC from the current fix. Chains to V16N36.
#[derive(Debug, Default)]
pub struct LoadGpsTime {
    display: Option<DisplayData>,
}

impl LoadGpsTime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Program for LoadGpsTime {
    fn name(&self) -> &str {
        "load gps time"
    }

    fn call(&mut self, call: CallState, ctx: &mut ProgramContext<'_>) -> RunState {
        match call {
            CallState::Start | CallState::BringToForeground | CallState::Reset => {
                self.display = Some(time_display(26, 36, ctx));
                RunState::Foreground
            }
            _ => RunState::NotRunning,
        }
    }

    fn accepts_data(&self) -> bool {
        true
    }

    fn submit_data(&mut self, _index: u8, value: i32, ctx: &mut ProgramContext<'_>) -> RunState {
        let limit = LARGEST_HOUR_IN_A_DAY as i32;
        if !(-limit..=limit).contains(&value) {
            debug!("load gps time: offset {} out of range", value);
            return RunState::Foreground;
        }
        let Some(fix) = ctx.hardware.gps.fix() else {
            debug!("load gps time: no fix");
            return RunState::Foreground;
        };

        let hour = (fix.hour as i32 + value).rem_euclid(24) as u32;
        let now = ctx.now_ms();
        let rtc = &mut ctx.hardware.rtc;
        if !(rtc.set_hour(hour, now) && rtc.set_minute(fix.minute, now) && rtc.set_second(fix.second, now))
        {
            debug!("load gps time: fix time {:?} rejected", fix);
            return RunState::Foreground;
        }

        ctx.set_program(16, Some(36), CallState::Start);
        RunState::NotRunning
    }

    fn display(&self) -> Option<&DisplayData> {
        self.display.as_ref()
    }
}

/// V37N36: arms the RTC alarm. Operands, in order: day, hour, minute,
/// second, verb, noun (negative for none), program data, repeat (0 or 1).
/// Out-of-range day and time operands keep the clock's current value.
#[derive(Debug, Default)]
pub struct SetAlarm {
    draft: Option<AlarmProgram>,
    display: Option<DisplayData>,
}

impl SetAlarm {
    pub fn new() -> Self {
        Self::default()
    }

    fn show(&mut self) {
        if let (Some(draft), Some(display)) = (self.draft.as_ref(), self.display.as_mut()) {
            display.r1 = draft.hour as i32;
            display.r2 = draft.minute as i32;
            display.r3 = draft.second as i32;
        }
    }
}

impl Program for SetAlarm {
    fn name(&self) -> &str {
        "set alarm"
    }

    fn call(&mut self, call: CallState, ctx: &mut ProgramContext<'_>) -> RunState {
        match call {
            CallState::Start | CallState::BringToForeground | CallState::Reset => {
                self.display = Some(time_display(37, 36, ctx));
                self.draft = None;
                RunState::Foreground
            }
            _ => {
                self.draft = None;
                RunState::NotRunning
            }
        }
    }

    fn accepts_data(&self) -> bool {
        true
    }

    fn submit_data(&mut self, index: u8, value: i32, ctx: &mut ProgramContext<'_>) -> RunState {
        let now = ctx.hardware.rtc.now(ctx.now_ms());
        let draft = self.draft.get_or_insert(AlarmProgram {
            day: now.day(),
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
            verb: 0,
            noun: None,
            data: 0,
            repeat: false,
        });

        let in_range = |max: u32| u32::try_from(value).ok().filter(|v| *v <= max);
        match index {
            0 => {
                if let Some(day) = u32::try_from(value).ok().filter(|d| (1..=31).contains(d)) {
                    draft.day = day;
                }
            }
            1 => {
                if let Some(hour) = in_range(LARGEST_HOUR_IN_A_DAY) {
                    draft.hour = hour;
                }
            }
            2 => {
                if let Some(minute) = in_range(LARGEST_MINUTE_IN_AN_HOUR) {
                    draft.minute = minute;
                }
            }
            3 => {
                if let Some(second) = in_range(LARGEST_SECOND_IN_A_MINUTE) {
                    draft.second = second;
                }
            }
            4 => draft.verb = i16::try_from(value).unwrap_or_default(),
            5 => draft.noun = i16::try_from(value).ok().filter(|n| *n >= 0),
            6 => draft.data = value,
            _ => {
                draft.repeat = value == 1;
                let alarm = *draft;
                self.draft = None;
                ctx.hardware.rtc.arm_alarm(alarm);
                return RunState::NotRunning;
            }
        }

        self.show();
        RunState::Foreground
    }

    fn display(&self) -> Option<&DisplayData> {
        self.display.as_ref()
    }
}
