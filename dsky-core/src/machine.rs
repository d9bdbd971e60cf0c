//! The interpreter tick and the machine that drives it from a console.

use std::time::Duration;

use chrono::NaiveDateTime;
use log::{debug, trace};

use crate::config::ConsoleConfig;
use crate::console::DskyConsole;
use crate::hardware::Hardware;
use crate::keyboard::{KeyboardEvent, KeyboardModeMachine};
use crate::keys::{KeyEdgeDetector, LogicalKey};
use crate::program::DisplayData;
use crate::programs::standard_registry;
use crate::registry::ProgramRegistry;
use crate::{DskyExitInfo, ExitReason};

/// Key edges in, program dispatch out.
pub struct Interpreter {
    edges: KeyEdgeDetector,
    keyboard: KeyboardModeMachine,
    registry: ProgramRegistry,
}

impl Interpreter {
    pub fn new(registry: ProgramRegistry) -> Self {
        Self {
            edges: KeyEdgeDetector::new(),
            keyboard: KeyboardModeMachine::new(),
            registry,
        }
    }

    /// Interpreter over the standard program table.
    pub fn standard(hardware: Hardware) -> Self {
        Self::new(standard_registry(hardware))
    }

    /// One poll tick: edge-detect the held key, apply it to the keyboard
    /// modes (at most one dispatch), then run due periodic slots.
    pub fn tick(&mut self, key: LogicalKey, now_ms: u64) -> Option<KeyboardEvent> {
        self.registry.set_now(now_ms);
        let event = self
            .edges
            .detect(key)
            .filter(|k| *k != LogicalKey::None)
            .and_then(|k| {
                trace!("key {:?} in {:?}", k, self.keyboard.mode());
                self.keyboard.handle_key(k, &mut self.registry)
            });
        self.registry.run_due(now_ms);
        event
    }

    /// What the display should show now.
    pub fn display(&self) -> Option<&DisplayData> {
        self.registry.foreground_display()
    }

    pub fn keyboard(&self) -> &KeyboardModeMachine {
        &self.keyboard
    }

    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ProgramRegistry {
        &mut self.registry
    }
}

/// A DSKY: an interpreter wired to a console, with the alarm and the
/// speaker serviced every step.
pub struct Dsky<C: DskyConsole> {
    interpreter: Interpreter,
    console: C,
    tick_ms: u64,
    alarm_poll_ms: u64,
    next_alarm_poll_ms: u64,
    now_ms: u64,
    ticks: u64,
    /// Sleep one tick between steps in `run`.
    pub realtime: bool,
}

impl<C: DskyConsole> Dsky<C> {
    pub fn new(console: C, interpreter: Interpreter, config: &ConsoleConfig) -> Self {
        Self {
            interpreter,
            console,
            tick_ms: config.tick_ms.max(1),
            alarm_poll_ms: config.alarm_poll_ms.clamp(1, 1000),
            next_alarm_poll_ms: 0,
            now_ms: 0,
            ticks: 0,
            realtime: false,
        }
    }

    /// Standard program table on the hardware the config describes.
    pub fn from_config(console: C, config: &ConsoleConfig, fallback_start: NaiveDateTime) -> Self {
        let interpreter = Interpreter::standard(config.hardware(fallback_start));
        Self::new(console, interpreter, config)
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Poll a key, tick the interpreter, service the alarm and the speaker,
    /// then render.
    pub fn step(&mut self, now_ms: u64) -> Option<KeyboardEvent> {
        let key = self.console.poll_key();
        let event = self.interpreter.tick(key, now_ms);
        if let Some(event) = &event {
            debug!("{:?}", event);
        }

        if now_ms >= self.next_alarm_poll_ms {
            self.next_alarm_poll_ms = now_ms + self.alarm_poll_ms;
            let registry = self.interpreter.registry_mut();
            let fired = registry.hardware_mut().rtc.poll_alarm(now_ms);
            if let Some(alarm) = fired {
                registry.trigger_alarm(&alarm);
            }
        }

        for track in self.interpreter.registry_mut().hardware_mut().audio.drain() {
            self.console.sound(track);
        }

        self.console.render(
            self.interpreter.display(),
            &self.interpreter.registry().hardware().indicators,
        );
        event
    }

    /// Step at the current time and advance the clock one tick.
    pub fn tick(&mut self) -> Option<KeyboardEvent> {
        let event = self.step(self.now_ms);
        self.now_ms += self.tick_ms;
        self.ticks += 1;
        event
    }

    /// Tick until the console closes or `max_ticks` have run.
    pub fn run(&mut self, max_ticks: Option<u64>) -> DskyExitInfo {
        let start = self.ticks;
        let reason = loop {
            if self.console.is_closed() {
                break ExitReason::ConsoleClosed;
            }
            if max_ticks.is_some_and(|max| self.ticks - start >= max) {
                break ExitReason::TickLimit;
            }
            self.tick();
            if self.realtime {
                std::thread::sleep(Duration::from_millis(self.tick_ms));
            }
        };
        DskyExitInfo {
            reason,
            ticks: self.ticks - start,
            now_ms: self.now_ms,
        }
    }
}
