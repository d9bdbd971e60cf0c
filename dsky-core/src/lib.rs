//! DSKY Keypad Interpreter Core
//!
//! This crate turns keypad presses into program dispatch for a DSKY-style
//! console:
//! - Key edge detection and VERB/NOUN/ENTER keyboard modes
//! - A program table addressed by verb/noun pairs
//! - Program lifecycle (start, pause, background, stop) with a single
//!   foreground program
//! - An in-memory hardware model (lamps, clock, GPS, IMU, speaker)
//!
//! # Architecture
//!
//! The interpreter uses a layered design:
//! - `KeyboardModeMachine`: keypad entry modes, dispatching through the
//!   `Dispatcher` trait
//! - `ProgramRegistry`: the program table; the only place run states change
//! - `Program` trait: lifecycle calls plus optional data, display and
//!   periodic capabilities
//! - `DskyConsole` trait: keypad, display and lamp I/O
//! - `Dsky`: ties an `Interpreter` to a console and runs it

pub mod config;
pub mod console;
pub mod error;
pub mod hardware;
pub mod keyboard;
pub mod keys;
pub mod machine;
pub mod program;
pub mod programs;
pub mod registry;

pub use config::ConsoleConfig;
pub use console::{DskyConsole, Frame, HeadlessConsole};
pub use error::{DskyError, DskyResult};
pub use hardware::{Hardware, IndicatorPanel, Track};
pub use keyboard::{Dispatcher, KeyboardEvent, KeyboardMode, KeyboardModeMachine};
pub use keys::{KeyEdgeDetector, LogicalKey};
pub use machine::{Dsky, Interpreter};
pub use program::{CallState, DisplayData, Program, ProgramContext, RunState};
pub use programs::standard_registry;
pub use registry::{MetaProgram, ProgramEntry, ProgramRegistry, NOT_USED};

/// Reason the machine stopped running.
#[derive(Debug, Clone, PartialEq)]
pub enum ExitReason {
    /// The console was closed by the operator
    ConsoleClosed,
    /// The requested number of ticks ran
    TickLimit,
}

/// Information about a finished run.
#[derive(Debug, Clone)]
pub struct DskyExitInfo {
    pub reason: ExitReason,
    pub ticks: u64,
    pub now_ms: u64,
}
