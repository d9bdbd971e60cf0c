//! Bulb test and sound test.

use log::debug;

use super::PeriodicSlot;
use crate::hardware::{Colour, Indicator, LampState};
use crate::program::{CallState, Program, ProgramContext, RunState};

const BULB_TEST_INTERVAL_MS: u64 = 20;
const BULB_TEST_PERIOD_MS: u64 = 12_000;

/// One second per step: colour, and whether even-numbered lamps are the lit
/// half. After the last step every lamp cycles through the rainbow.
const BULB_TEST_STEPS: [(Colour, bool); 8] = [
    (Colour::PureWhite, true),
    (Colour::PureWhite, false),
    (Colour::Blue, true),
    (Colour::Blue, false),
    (Colour::Red, false),
    (Colour::Red, true),
    (Colour::Green, false),
    (Colour::Green, true),
];

/// V35: cycles every lamp through a test pattern. Foreground only.
#[derive(Debug, Default)]
pub struct BulbTest {
    slot: PeriodicSlot,
}

impl BulbTest {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Program for BulbTest {
    fn name(&self) -> &str {
        "bulb test"
    }

    fn call(&mut self, call: CallState, ctx: &mut ProgramContext<'_>) -> RunState {
        match call {
            CallState::Start | CallState::BringToForeground | CallState::Reset => {
                self.slot.acquire(ctx, BULB_TEST_INTERVAL_MS);
                self.run_periodic(ctx);
                RunState::Foreground
            }
            CallState::Pause => {
                self.slot.suspend(ctx);
                RunState::NotRunning
            }
            CallState::Unpause => {
                if self.slot.resume(ctx) {
                    RunState::Foreground
                } else {
                    RunState::NotRunning
                }
            }
            CallState::PushToBackground | CallState::Stop => {
                ctx.hardware.indicators.all_off();
                self.slot.release(ctx);
                RunState::NotRunning
            }
        }
    }

    fn run_periodic(&mut self, ctx: &mut ProgramContext<'_>) {
        let phase = ctx.now_ms() % BULB_TEST_PERIOD_MS;
        let step = usize::try_from(phase / 1000).ok();

        for (i, which) in Indicator::ALL.into_iter().enumerate() {
            let (colour, state) = match step.and_then(|s| BULB_TEST_STEPS.get(s)) {
                Some(&(colour, even_lit)) => {
                    let lit = (i % 2 == 0) == even_lit;
                    (colour, if lit { LampState::On } else { LampState::Off })
                }
                None => (Colour::Rainbow, LampState::On),
            };
            ctx.hardware.indicators.set(which, colour, state);
        }
    }
}

/// V21N98: plays the track number entered. Foreground only.
#[derive(Debug, Default)]
pub struct SoundTest;

impl Program for SoundTest {
    fn name(&self) -> &str {
        "sound test"
    }

    fn call(&mut self, call: CallState, _ctx: &mut ProgramContext<'_>) -> RunState {
        match call {
            CallState::Start | CallState::BringToForeground | CallState::Reset => {
                RunState::Foreground
            }
            _ => RunState::NotRunning,
        }
    }

    fn accepts_data(&self) -> bool {
        true
    }

    fn submit_data(&mut self, _index: u8, value: i32, ctx: &mut ProgramContext<'_>) -> RunState {
        match u16::try_from(value) {
            Ok(track) => {
                ctx.hardware.audio.play(track);
            }
            Err(_) => debug!("sound test: ignoring track {}", value),
        }
        RunState::NotRunning
    }
}
