//! Keyboard entry modes.
//!
//! This module turns key edges into verb, noun and operand submissions:
//! - `NumberAccumulator`: digit/sign accumulation and the submission index
//! - `KeyboardModeMachine`: the VERB/NOUN/ENTER state machine
//! - `Dispatcher`: where completed entries are sent (the program registry)

mod accumulator;

pub use accumulator::NumberAccumulator;

use log::debug;

use crate::keys::LogicalKey;
use crate::program::RunState;

/// Keyboard entry mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyboardMode {
    VerbEntry,
    NounEntry,
    NumberEntry,
    /// Reserved; no transition leads here.
    FinishEntry,
    #[default]
    NoEntry,
}

/// Receiver of completed keyboard entries.
pub trait Dispatcher {
    /// Offer a verb. Returns true if any program is registered under it.
    fn dispatch_verb(&mut self, verb: i16) -> bool;

    /// Offer a noun for the pending verb. Returns true if a program matched.
    fn dispatch_noun(&mut self, noun: i16) -> bool;

    /// Hand an operand to the foreground program. Returns the program's new
    /// run state, or None if no foreground program takes data.
    fn submit_number(&mut self, index: u8, value: i32) -> Option<RunState>;
}

/// What a key press completed, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardEvent {
    Verb { verb: i32, found: bool },
    Noun { noun: i32, found: bool },
    Number { index: u8, value: i32, result: Option<RunState> },
}

/// VERB/NOUN/ENTER state machine.
#[derive(Debug, Default)]
pub struct KeyboardModeMachine {
    mode: KeyboardMode,
    accumulator: NumberAccumulator,
}

impl KeyboardModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> KeyboardMode {
        self.mode
    }

    pub fn accumulator(&self) -> &NumberAccumulator {
        &self.accumulator
    }

    /// Apply one key edge.
    pub fn handle_key<D: Dispatcher>(
        &mut self,
        key: LogicalKey,
        dispatcher: &mut D,
    ) -> Option<KeyboardEvent> {
        match key {
            LogicalKey::Clear => {
                self.accumulator.reset_index();
                None
            }

            LogicalKey::Verb => {
                self.mode = KeyboardMode::VerbEntry;
                self.accumulator.clear_value();
                self.accumulator.reset_index();
                None
            }

            LogicalKey::Noun => {
                if self.mode != KeyboardMode::VerbEntry {
                    return None;
                }
                let verb = self.take_value();
                let found = code(verb).is_some_and(|v| dispatcher.dispatch_verb(v));
                self.mode = if found {
                    KeyboardMode::NounEntry
                } else {
                    KeyboardMode::NoEntry
                };
                Some(KeyboardEvent::Verb { verb, found })
            }

            LogicalKey::Enter => self.enter(dispatcher),

            LogicalKey::Digit(d) if d <= 9 => {
                self.accumulator.push_digit(d);
                None
            }

            LogicalKey::Minus => {
                self.accumulator.minus();
                None
            }

            LogicalKey::Plus => {
                self.accumulator.plus();
                None
            }

            _ => None,
        }
    }

    fn enter<D: Dispatcher>(&mut self, dispatcher: &mut D) -> Option<KeyboardEvent> {
        match self.mode {
            KeyboardMode::VerbEntry => {
                let verb = self.take_value();
                let found = code(verb).is_some_and(|v| dispatcher.dispatch_verb(v));
                self.mode = if found {
                    KeyboardMode::NumberEntry
                } else {
                    KeyboardMode::NoEntry
                };
                Some(KeyboardEvent::Verb { verb, found })
            }

            KeyboardMode::NounEntry => {
                let noun = self.take_value();
                let found = code(noun).is_some_and(|n| dispatcher.dispatch_noun(n));
                self.mode = if found {
                    KeyboardMode::NumberEntry
                } else {
                    KeyboardMode::NoEntry
                };
                Some(KeyboardEvent::Noun { noun, found })
            }

            KeyboardMode::NumberEntry => {
                let index = self.accumulator.index();
                let value = self.accumulator.value();
                self.accumulator.clear_value();

                let result = dispatcher.submit_number(index, value);
                debug!("operand {} = {} -> {:?}", index, value, result);
                match result {
                    None | Some(RunState::NotRunning) => {
                        self.mode = KeyboardMode::NoEntry;
                        self.accumulator.reset_index();
                    }
                    Some(_) => self.accumulator.advance_index(),
                }
                Some(KeyboardEvent::Number {
                    index,
                    value,
                    result,
                })
            }

            KeyboardMode::NoEntry | KeyboardMode::FinishEntry => {
                self.accumulator.clear_value();
                self.mode = KeyboardMode::NumberEntry;
                None
            }
        }
    }

    /// Commit the accumulator as a code and start a fresh entry.
    fn take_value(&mut self) -> i32 {
        let value = self.accumulator.value();
        self.accumulator.clear_value();
        self.accumulator.reset_index();
        value
    }
}

/// Verb and noun codes are two digits; anything outside i16 cannot match.
fn code(value: i32) -> Option<i16> {
    i16::try_from(value).ok()
}
