//! The standard program table.
//!
//! - `diagnostic`: bulb test (V35) and sound test (V21N98)
//! - `time`: clock display and the ways of setting the clock and alarm
//! - `position`: GPS and IMU readouts that keep running in the background

mod diagnostic;
mod position;
mod time;

pub use diagnostic::{BulbTest, SoundTest};
pub use position::{GpsPosition, ImuSensor, ImuView};
pub use time::{LoadGpsTime, LoadManualTime, SetAlarm, ShowTime};

use crate::hardware::{Hardware, SlotHandle};
use crate::program::ProgramContext;
use crate::registry::{MetaProgram, ProgramEntry, ProgramRegistry, NOT_USED};

/// Registry holding every standard program, in scan order.
pub fn standard_registry(hardware: Hardware) -> ProgramRegistry {
    ProgramRegistry::new(standard_entries(), hardware)
}

pub fn standard_entries() -> Vec<ProgramEntry> {
    vec![
        ProgramEntry::new(35, NOT_USED, BulbTest::new()),
        ProgramEntry::meta(30, MetaProgram::BringToForeground { verb: None }),
        ProgramEntry::meta(34, MetaProgram::TerminateCurrent),
        ProgramEntry::meta(32, MetaProgram::ResetCurrent),
        ProgramEntry::new(37, Some(36), SetAlarm::new()),
        ProgramEntry::new(16, Some(36), ShowTime::new()),
        ProgramEntry::new(25, Some(36), LoadManualTime::new()),
        ProgramEntry::new(26, Some(36), LoadGpsTime::new()),
        ProgramEntry::new(16, Some(43), GpsPosition::new()),
        ProgramEntry::new(16, Some(29), ImuView::new(ImuSensor::Gyro)),
        ProgramEntry::new(16, Some(30), ImuView::new(ImuSensor::Accel)),
        ProgramEntry::new(21, Some(98), SoundTest),
    ]
}

/// A program's one periodic slot.
///
/// Acquiring twice keeps the existing registration, so START, RESET and
/// BRING_TO_FOREGROUND can all go through `acquire`.
#[derive(Debug, Default)]
pub(crate) struct PeriodicSlot {
    handle: Option<SlotHandle>,
}

impl PeriodicSlot {
    pub(crate) fn acquire(&mut self, ctx: &mut ProgramContext<'_>, interval_ms: u64) {
        match &self.handle {
            Some(handle) => ctx.resume_periodic(handle),
            None => self.handle = Some(ctx.register_periodic(interval_ms)),
        }
    }

    /// Returns false if no slot is held.
    pub(crate) fn suspend(&self, ctx: &mut ProgramContext<'_>) -> bool {
        match &self.handle {
            Some(handle) => {
                ctx.suspend_periodic(handle);
                true
            }
            None => false,
        }
    }

    /// Returns false if no slot is held.
    pub(crate) fn resume(&self, ctx: &mut ProgramContext<'_>) -> bool {
        match &self.handle {
            Some(handle) => {
                ctx.resume_periodic(handle);
                true
            }
            None => false,
        }
    }

    pub(crate) fn release(&mut self, ctx: &mut ProgramContext<'_>) {
        if let Some(handle) = self.handle.take() {
            ctx.release_periodic(handle);
        }
    }

    pub(crate) fn is_held(&self) -> bool {
        self.handle.is_some()
    }
}
