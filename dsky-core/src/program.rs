//! Program lifecycle vocabulary and the `Program` capability trait.

use crate::hardware::{Hardware, Scheduler, SlotHandle};

/// Where a program stands after handling a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    Foreground,
    Background,
    #[default]
    NotRunning,
}

/// Lifecycle instruction sent to a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Start,
    Pause,
    Unpause,
    Stop,
    PushToBackground,
    BringToForeground,
    Reset,
}

impl CallState {
    /// Calls that ask a program to take over the display.
    pub fn is_foregrounding(self) -> bool {
        matches!(self, Self::Start | Self::BringToForeground)
    }
}

/// Register contents and labels for the seven-segment display.
///
/// Each mask selects which decimal digits of its register are lit: bit `i`
/// controls the `10^i` digit, so six bits cover a full register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayData {
    pub r1: i32,
    pub r2: i32,
    pub r3: i32,
    pub verb: u8,
    pub noun: u8,
    pub prog: u8,
    pub r1_mask: u8,
    pub r2_mask: u8,
    pub r3_mask: u8,
}

/// All six digits shown.
pub const ALL_DIGITS: u8 = 0x3F;

impl DisplayData {
    /// Fresh buffer labelled with a verb/noun pair.
    pub fn labelled(verb: u8, noun: u8) -> Self {
        Self {
            verb,
            noun,
            ..Self::default()
        }
    }

    /// Set all three register masks at once.
    pub fn set_masks(&mut self, mask: u8) {
        self.r1_mask = mask & ALL_DIGITS;
        self.r2_mask = mask & ALL_DIGITS;
        self.r3_mask = mask & ALL_DIGITS;
    }
}

/// A request a program makes of the registry while handling a call.
///
/// Requests are applied after the call returns, through the same
/// foregrounding path the keyboard uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramRequest {
    SetProgram {
        verb: i16,
        noun: Option<i16>,
        call: CallState,
    },
}

/// What a program can reach while it runs: the hardware model, its own
/// periodic slots, and the clock.
pub struct ProgramContext<'a> {
    pub hardware: &'a mut Hardware,
    scheduler: &'a mut Scheduler,
    requests: &'a mut Vec<ProgramRequest>,
    owner: usize,
    now_ms: u64,
}

impl<'a> ProgramContext<'a> {
    pub(crate) fn new(
        hardware: &'a mut Hardware,
        scheduler: &'a mut Scheduler,
        requests: &'a mut Vec<ProgramRequest>,
        owner: usize,
        now_ms: u64,
    ) -> Self {
        Self {
            hardware,
            scheduler,
            requests,
            owner,
            now_ms,
        }
    }

    /// Milliseconds since power-up.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Register a periodic slot owned by the calling program.
    pub fn register_periodic(&mut self, interval_ms: u64) -> SlotHandle {
        self.scheduler.register(self.owner, interval_ms, self.now_ms)
    }

    /// Release a slot. Consumes the handle, so a slot is released once.
    pub fn release_periodic(&mut self, handle: SlotHandle) {
        self.scheduler.release(handle);
    }

    pub fn suspend_periodic(&mut self, handle: &SlotHandle) {
        self.scheduler.suspend(handle);
    }

    pub fn resume_periodic(&mut self, handle: &SlotHandle) {
        self.scheduler.resume(handle, self.now_ms);
    }

    /// Ask the registry to send `call` to another program.
    pub fn set_program(&mut self, verb: i16, noun: Option<i16>, call: CallState) {
        self.requests
            .push(ProgramRequest::SetProgram { verb, noun, call });
    }
}

/// A registered program.
///
/// Only `call` is required; data submission, display output and periodic
/// work are optional capabilities.
pub trait Program {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Handle a lifecycle call and report the resulting run state.
    fn call(&mut self, call: CallState, ctx: &mut ProgramContext<'_>) -> RunState;

    /// Whether this program takes operands.
    fn accepts_data(&self) -> bool {
        false
    }

    /// Take the operand at `index`. Returning `NotRunning` means no more data
    /// is wanted.
    fn submit_data(&mut self, _index: u8, _value: i32, _ctx: &mut ProgramContext<'_>) -> RunState {
        RunState::NotRunning
    }

    /// Display buffer, if the program has produced one.
    fn display(&self) -> Option<&DisplayData> {
        None
    }

    /// Called when one of this program's periodic slots is due.
    fn run_periodic(&mut self, _ctx: &mut ProgramContext<'_>) {}
}
