//! Real-time clock with a single alarm slot.
//!
//! The clock runs off the machine's millisecond tick: it stores a date-time
//! anchored at some tick and extrapolates from there. Setting a field
//! re-anchors it.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use log::debug;

pub const LARGEST_HOUR_IN_A_DAY: u32 = 23;
pub const LARGEST_MINUTE_IN_AN_HOUR: u32 = 59;
pub const LARGEST_SECOND_IN_A_MINUTE: u32 = 59;

/// A program to start when the clock reaches a given day and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmProgram {
    /// Day of month, 1-31.
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub verb: i16,
    pub noun: Option<i16>,
    /// Operand handed to the program when it is started.
    pub data: i32,
    /// Stay armed after firing.
    pub repeat: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Rtc {
    anchor: NaiveDateTime,
    anchor_ms: u64,
    alarm: Option<AlarmProgram>,
    last_fired: Option<NaiveDateTime>,
}

impl Rtc {
    /// Clock reading `start` at tick `now_ms`.
    pub fn new(start: NaiveDateTime, now_ms: u64) -> Self {
        Self {
            anchor: start,
            anchor_ms: now_ms,
            alarm: None,
            last_fired: None,
        }
    }

    /// Current date-time.
    pub fn now(&self, now_ms: u64) -> NaiveDateTime {
        let elapsed = now_ms.saturating_sub(self.anchor_ms);
        self.anchor + Duration::milliseconds(i64::try_from(elapsed).unwrap_or(i64::MAX / 2))
    }

    /// (hour, minute, second) now.
    pub fn time(&self, now_ms: u64) -> (u32, u32, u32) {
        let now = self.now(now_ms);
        (now.hour(), now.minute(), now.second())
    }

    pub fn set_date_time(&mut self, dt: NaiveDateTime, now_ms: u64) {
        self.anchor = dt;
        self.anchor_ms = now_ms;
    }

    /// Set the hour. Returns false (and changes nothing) if out of range.
    pub fn set_hour(&mut self, hour: u32, now_ms: u64) -> bool {
        if hour > LARGEST_HOUR_IN_A_DAY {
            return false;
        }
        self.reanchor(now_ms, |dt| dt.with_hour(hour))
    }

    pub fn set_minute(&mut self, minute: u32, now_ms: u64) -> bool {
        if minute > LARGEST_MINUTE_IN_AN_HOUR {
            return false;
        }
        self.reanchor(now_ms, |dt| dt.with_minute(minute))
    }

    pub fn set_second(&mut self, second: u32, now_ms: u64) -> bool {
        if second > LARGEST_SECOND_IN_A_MINUTE {
            return false;
        }
        self.reanchor(now_ms, |dt| dt.with_second(second))
    }

    fn reanchor<F>(&mut self, now_ms: u64, f: F) -> bool
    where
        F: FnOnce(NaiveDateTime) -> Option<NaiveDateTime>,
    {
        match f(self.now(now_ms)) {
            Some(dt) => {
                self.set_date_time(dt, now_ms);
                true
            }
            None => false,
        }
    }

    /// Arm the alarm, replacing any previous one.
    pub fn arm_alarm(&mut self, alarm: AlarmProgram) {
        debug!(
            "alarm V{}N{:?} armed for day {} {:02}:{:02}:{:02}{}",
            alarm.verb,
            alarm.noun,
            alarm.day,
            alarm.hour,
            alarm.minute,
            alarm.second,
            if alarm.repeat { " on repeat" } else { " once" }
        );
        self.alarm = Some(alarm);
        self.last_fired = None;
    }

    pub fn alarm(&self) -> Option<&AlarmProgram> {
        self.alarm.as_ref()
    }

    /// Returns the alarm once when day, hour, minute and second all match.
    /// A one-shot alarm disarms itself when it fires.
    pub fn poll_alarm(&mut self, now_ms: u64) -> Option<AlarmProgram> {
        let alarm = self.alarm?;
        let now = self.now(now_ms);
        let stamp = now.with_nanosecond(0)?;

        let matches = now.day() == alarm.day
            && now.hour() == alarm.hour
            && now.minute() == alarm.minute
            && now.second() == alarm.second;
        if !matches || self.last_fired == Some(stamp) {
            return None;
        }

        self.last_fired = Some(stamp);
        if !alarm.repeat {
            self.alarm = None;
        }
        Some(alarm)
    }
}
