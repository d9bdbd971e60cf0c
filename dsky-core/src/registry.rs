//! Program table and lifecycle dispatch.
//!
//! The registry owns every program entry, the hardware model the programs act
//! on, and the periodic-slot scheduler. All run-state changes go through
//! `invoke`, and all foregrounding goes through `foreground`, which is the one
//! place other foreground entries get pushed to the background.

use log::{debug, trace, warn};

use crate::hardware::{AlarmProgram, Hardware, Scheduler};
use crate::keyboard::Dispatcher;
use crate::program::{CallState, DisplayData, Program, ProgramContext, ProgramRequest, RunState};

/// Noun value for entries selected by verb alone.
pub const NOT_USED: Option<i16> = None;

/// Built-in programs that act on whichever entry is in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaProgram {
    /// Send RESET to the foreground entry.
    ResetCurrent,
    /// Send STOP to the foreground entry.
    TerminateCurrent,
    /// Bring the entry named by the next operands (verb, then noun if the
    /// verb needs one) to the foreground.
    BringToForeground { verb: Option<i16> },
}

impl MetaProgram {
    fn name(&self) -> &'static str {
        match self {
            Self::ResetCurrent => "reset current",
            Self::TerminateCurrent => "terminate current",
            Self::BringToForeground { .. } => "bring to foreground",
        }
    }
}

/// What sits behind a table entry.
pub enum Handler {
    Program(Box<dyn Program>),
    Meta(MetaProgram),
}

/// One row of the program table.
pub struct ProgramEntry {
    verb: i16,
    noun: Option<i16>,
    handler: Handler,
    run_state: RunState,
}

impl ProgramEntry {
    pub fn new(verb: i16, noun: Option<i16>, program: impl Program + 'static) -> Self {
        Self {
            verb,
            noun,
            handler: Handler::Program(Box::new(program)),
            run_state: RunState::NotRunning,
        }
    }

    /// A meta-program entry (selected by verb alone).
    pub fn meta(verb: i16, meta: MetaProgram) -> Self {
        Self {
            verb,
            noun: NOT_USED,
            handler: Handler::Meta(meta),
            run_state: RunState::NotRunning,
        }
    }

    pub fn verb(&self) -> i16 {
        self.verb
    }

    pub fn noun(&self) -> Option<i16> {
        self.noun
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn name(&self) -> &str {
        match &self.handler {
            Handler::Program(p) => p.name(),
            Handler::Meta(m) => m.name(),
        }
    }

    pub fn accepts_data(&self) -> bool {
        match &self.handler {
            Handler::Program(p) => p.accepts_data(),
            Handler::Meta(m) => matches!(m, MetaProgram::BringToForeground { .. }),
        }
    }

    pub fn display(&self) -> Option<&DisplayData> {
        match &self.handler {
            Handler::Program(p) => p.display(),
            Handler::Meta(_) => None,
        }
    }

    fn matches(&self, verb: i16, noun: Option<i16>) -> bool {
        self.verb == verb && self.noun == noun
    }
}

/// The program table plus everything its programs share.
pub struct ProgramRegistry {
    entries: Vec<ProgramEntry>,
    /// Verb waiting for a noun.
    pending_verb: Option<i16>,
    scheduler: Scheduler,
    hardware: Hardware,
    requests: Vec<ProgramRequest>,
    now_ms: u64,
}

impl ProgramRegistry {
    /// Build a registry. Entry order is scan order: on duplicate verb/noun
    /// pairs the first entry wins.
    pub fn new(entries: Vec<ProgramEntry>, hardware: Hardware) -> Self {
        Self {
            entries,
            pending_verb: None,
            scheduler: Scheduler::new(),
            hardware,
            requests: Vec::new(),
            now_ms: 0,
        }
    }

    pub fn entries(&self) -> &[ProgramEntry] {
        &self.entries
    }

    pub fn hardware(&self) -> &Hardware {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut Hardware {
        &mut self.hardware
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn pending_verb(&self) -> Option<i16> {
        self.pending_verb
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Advance the clock programs see.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    /// Index of the foreground entry, if any.
    pub fn foreground_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.run_state == RunState::Foreground)
    }

    /// Run state of the first entry registered under (verb, noun).
    pub fn run_state_of(&self, verb: i16, noun: Option<i16>) -> Option<RunState> {
        self.entries
            .iter()
            .find(|e| e.matches(verb, noun))
            .map(|e| e.run_state)
    }

    /// Display buffer of the foreground program, or None to blank the panel.
    pub fn foreground_display(&self) -> Option<&DisplayData> {
        self.entries
            .iter()
            .filter(|e| e.run_state == RunState::Foreground)
            .find_map(ProgramEntry::display)
    }

    /// Send `call` to the first entry registered under (verb, noun).
    ///
    /// Used by timed triggers and by programs chaining to one another.
    /// Returns false if nothing is registered there.
    pub fn set_program(&mut self, verb: i16, noun: Option<i16>, call: CallState) -> bool {
        match self.entries.iter().position(|e| e.matches(verb, noun)) {
            Some(idx) => {
                self.foreground(idx, call);
                true
            }
            None => {
                debug!("set_program: nothing at V{}N{:?}", verb, noun);
                false
            }
        }
    }

    /// Start an alarm's program and hand it the alarm's operand, the same way
    /// the keyboard would.
    pub fn trigger_alarm(&mut self, alarm: &AlarmProgram) -> Option<RunState> {
        debug!("alarm fired: V{}N{:?} data {}", alarm.verb, alarm.noun, alarm.data);
        if !self.set_program(alarm.verb, alarm.noun, CallState::BringToForeground) {
            return None;
        }
        self.submit(0, alarm.data)
    }

    /// Run every periodic slot due at `now_ms`.
    pub fn run_due(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        for owner in self.scheduler.due(now_ms) {
            let Some(entry) = self.entries.get_mut(owner) else {
                warn!("slot owner {} is not in the table", owner);
                continue;
            };
            if let Handler::Program(program) = &mut entry.handler {
                let mut ctx = ProgramContext::new(
                    &mut self.hardware,
                    &mut self.scheduler,
                    &mut self.requests,
                    owner,
                    now_ms,
                );
                program.run_periodic(&mut ctx);
            }
            self.apply_requests();
        }
    }

    /// Invoke `call` on entry `idx`; if that put it in the foreground, push
    /// every other foreground entry to the background.
    fn foreground(&mut self, idx: usize, call: CallState) -> RunState {
        self.invoke(idx, call);
        let state = self.entries[idx].run_state;
        if call.is_foregrounding() && state == RunState::Foreground {
            self.demote_others(idx);
        }
        state
    }

    fn demote_others(&mut self, keep: usize) {
        for idx in 0..self.entries.len() {
            if idx != keep && self.entries[idx].run_state == RunState::Foreground {
                self.invoke(idx, CallState::PushToBackground);
            }
        }
    }

    /// Send a lifecycle call and record the run state it returns.
    fn invoke(&mut self, idx: usize, call: CallState) -> RunState {
        let meta = match &self.entries[idx].handler {
            Handler::Meta(m) => Some(*m),
            Handler::Program(_) => None,
        };

        let state = match meta {
            Some(meta) => {
                let (state, meta) = self.call_meta(idx, meta, call);
                self.entries[idx].handler = Handler::Meta(meta);
                state
            }
            None => {
                let entry = &mut self.entries[idx];
                match &mut entry.handler {
                    Handler::Program(program) => {
                        let mut ctx = ProgramContext::new(
                            &mut self.hardware,
                            &mut self.scheduler,
                            &mut self.requests,
                            idx,
                            self.now_ms,
                        );
                        program.call(call, &mut ctx)
                    }
                    Handler::Meta(_) => RunState::NotRunning,
                }
            }
        };

        let entry = &mut self.entries[idx];
        trace!(
            "V{}N{:?} {} <- {:?}: {:?} -> {:?}",
            entry.verb,
            entry.noun,
            entry.name(),
            call,
            entry.run_state,
            state
        );
        entry.run_state = state;
        self.apply_requests();
        state
    }

    /// Hand an operand to the first foreground entry that takes data.
    fn submit(&mut self, index: u8, value: i32) -> Option<RunState> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.run_state == RunState::Foreground && e.accepts_data())?;

        let meta = match &self.entries[idx].handler {
            Handler::Meta(m) => Some(*m),
            Handler::Program(_) => None,
        };

        let state = match meta {
            Some(meta) => {
                let (state, meta) = self.submit_meta(idx, meta, index, value);
                self.entries[idx].handler = Handler::Meta(meta);
                state
            }
            None => {
                let entry = &mut self.entries[idx];
                match &mut entry.handler {
                    Handler::Program(program) => {
                        let mut ctx = ProgramContext::new(
                            &mut self.hardware,
                            &mut self.scheduler,
                            &mut self.requests,
                            idx,
                            self.now_ms,
                        );
                        program.submit_data(index, value, &mut ctx)
                    }
                    Handler::Meta(_) => RunState::NotRunning,
                }
            }
        };

        let entry = &mut self.entries[idx];
        debug!(
            "send data to V{}N{:?} I {} D {} -> {:?}",
            entry.verb, entry.noun, index, value, state
        );
        // a meta-program may already have been pushed aside by the entry it
        // brought forward; only a still-foreground entry takes the result
        if meta.is_none() || entry.run_state == RunState::Foreground {
            entry.run_state = state;
        }
        self.apply_requests();
        Some(state)
    }

    fn call_meta(
        &mut self,
        idx: usize,
        meta: MetaProgram,
        call: CallState,
    ) -> (RunState, MetaProgram) {
        if matches!(
            call,
            CallState::Stop | CallState::Pause | CallState::PushToBackground
        ) {
            let meta = match meta {
                MetaProgram::BringToForeground { .. } => MetaProgram::BringToForeground { verb: None },
                other => other,
            };
            return (RunState::NotRunning, meta);
        }

        match meta {
            MetaProgram::ResetCurrent => {
                if let Some(fg) = self.foreground_except(idx) {
                    self.invoke(fg, CallState::Reset);
                }
                (RunState::NotRunning, meta)
            }
            MetaProgram::TerminateCurrent => {
                if let Some(fg) = self.foreground_except(idx) {
                    self.invoke(fg, CallState::Stop);
                }
                (RunState::NotRunning, meta)
            }
            // waits in the foreground for its operands
            MetaProgram::BringToForeground { .. } => (
                RunState::Foreground,
                MetaProgram::BringToForeground { verb: None },
            ),
        }
    }

    fn submit_meta(
        &mut self,
        idx: usize,
        meta: MetaProgram,
        index: u8,
        value: i32,
    ) -> (RunState, MetaProgram) {
        let MetaProgram::BringToForeground { verb } = meta else {
            return (RunState::NotRunning, meta);
        };
        let idle = MetaProgram::BringToForeground { verb: None };
        let Ok(value) = i16::try_from(value) else {
            return (RunState::NotRunning, idle);
        };

        let target = if index == 0 {
            self.entries.iter().enumerate().position(|(i, e)| {
                i != idx && e.verb == value && e.run_state != RunState::Foreground
            })
        } else {
            let Some(verb) = verb else {
                return (RunState::NotRunning, idle);
            };
            self.entries.iter().enumerate().position(|(i, e)| {
                i != idx && e.matches(verb, Some(value)) && e.run_state != RunState::Foreground
            })
        };

        match target {
            Some(t) if index == 0 && self.entries[t].noun.is_some() => (
                RunState::Foreground,
                MetaProgram::BringToForeground { verb: Some(value) },
            ),
            Some(t) => {
                self.foreground(t, CallState::BringToForeground);
                (RunState::NotRunning, idle)
            }
            None => (RunState::NotRunning, idle),
        }
    }

    fn foreground_except(&self, skip: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .position(|(i, e)| i != skip && e.run_state == RunState::Foreground)
    }

    fn apply_requests(&mut self) {
        if self.requests.is_empty() {
            return;
        }
        for request in std::mem::take(&mut self.requests) {
            match request {
                ProgramRequest::SetProgram { verb, noun, call } => {
                    if !self.set_program(verb, noun, call) {
                        warn!("program requested unknown V{}N{:?}", verb, noun);
                    }
                }
            }
        }
    }
}

impl Dispatcher for ProgramRegistry {
    fn dispatch_verb(&mut self, verb: i16) -> bool {
        debug!("verb number is {}", verb);
        let Some(idx) = self.entries.iter().position(|e| e.verb == verb) else {
            return false;
        };
        self.pending_verb = Some(verb);
        if self.entries[idx].noun.is_none() {
            self.foreground(idx, CallState::BringToForeground);
        }
        true
    }

    fn dispatch_noun(&mut self, noun: i16) -> bool {
        debug!("noun number is {}", noun);
        let Some(verb) = self.pending_verb else {
            return false;
        };
        match self.entries.iter().position(|e| e.matches(verb, Some(noun))) {
            Some(idx) => {
                self.foreground(idx, CallState::BringToForeground);
                true
            }
            None => false,
        }
    }

    fn submit_number(&mut self, index: u8, value: i32) -> Option<RunState> {
        self.submit(index, value)
    }
}
