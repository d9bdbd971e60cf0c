//! Console abstraction for the DSKY front panel.
//!
//! The `DskyConsole` trait is the keypad, the display, the lamps and the
//! speaker. It works identically for tests (HeadlessConsole) and real
//! terminals.

use std::collections::VecDeque;

use crate::hardware::{IndicatorPanel, Track};
use crate::keys::LogicalKey;
use crate::program::DisplayData;

/// Front-panel interface.
pub trait DskyConsole: Send {
    /// Key currently held down (NONE if no key). Polled once per tick.
    fn poll_key(&mut self) -> LogicalKey;

    /// Show the foreground display (None blanks every field) and the lamps.
    fn render(&mut self, display: Option<&DisplayData>, indicators: &IndicatorPanel);

    /// Play a sound track (optional, can be no-op).
    fn sound(&mut self, _track: Track) {}

    /// Whether the operator has walked away. The machine stops running
    /// once this returns true.
    fn is_closed(&self) -> bool {
        false
    }
}

/// One rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub display: Option<DisplayData>,
    pub indicators: IndicatorPanel,
}

/// Headless console for testing - replays queued keys, captures frames.
#[derive(Default)]
pub struct HeadlessConsole {
    input: VecDeque<LogicalKey>,
    frames: Vec<Frame>,
    sounds: Vec<Track>,
}

impl HeadlessConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a pre-queued key script (see `queue_string`).
    pub fn with_keys(keys: &str) -> Self {
        let mut console = Self::new();
        console.queue_string(keys);
        console
    }

    /// Queue one press: the key for one tick, then a release tick.
    pub fn queue_key(&mut self, key: LogicalKey) {
        self.input.push_back(key);
        self.input.push_back(LogicalKey::None);
    }

    /// Queue a script using the serial keyboard mapping.
    pub fn queue_string(&mut self, keys: &str) {
        for ch in keys.chars() {
            self.queue_key(LogicalKey::from_char(ch));
        }
    }

    /// Ticks of input left.
    pub fn pending(&self) -> usize {
        self.input.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn sounds(&self) -> &[Track] {
        &self.sounds
    }
}

impl DskyConsole for HeadlessConsole {
    fn poll_key(&mut self) -> LogicalKey {
        self.input.pop_front().unwrap_or_default()
    }

    fn render(&mut self, display: Option<&DisplayData>, indicators: &IndicatorPanel) {
        self.frames.push(Frame {
            display: display.copied(),
            indicators: indicators.clone(),
        });
    }

    fn sound(&mut self, track: Track) {
        self.sounds.push(track);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_console_input() {
        let mut console = HeadlessConsole::with_keys("v3");
        assert_eq!(console.pending(), 4);
        assert_eq!(console.poll_key(), LogicalKey::Verb);
        assert_eq!(console.poll_key(), LogicalKey::None);
        assert_eq!(console.poll_key(), LogicalKey::Digit(3));
        assert_eq!(console.poll_key(), LogicalKey::None);
        assert_eq!(console.poll_key(), LogicalKey::None);
    }

    #[test]
    fn test_headless_console_captures_frames() {
        let mut console = HeadlessConsole::new();
        let panel = IndicatorPanel::new();
        console.render(None, &panel);
        console.render(Some(&DisplayData::labelled(16, 36)), &panel);
        console.sound(Track::Houston);
        assert_eq!(console.frames().len(), 2);
        assert_eq!(console.last_frame().and_then(|f| f.display).map(|d| d.verb), Some(16));
        assert_eq!(console.sounds(), &[Track::Houston]);
    }
}
