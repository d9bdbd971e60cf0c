//! Logical keypad keys and edge detection.

/// A key on the DSKY keypad, after decoding from the key matrix or a text stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogicalKey {
    Digit(u8),
    Plus,
    Minus,
    Verb,
    Noun,
    Clear,
    Proceed,
    Enter,
    Release,
    Reset,
    #[default]
    None,
}

impl LogicalKey {
    /// Map a character from a serial/text key stream.
    ///
    /// Unmapped characters decode to `None`, the same as "no key held".
    ///
    /// # Examples
    /// ```
    /// use dsky_core::LogicalKey;
    /// assert_eq!(LogicalKey::from_char('v'), LogicalKey::Verb);
    /// assert_eq!(LogicalKey::from_char('7'), LogicalKey::Digit(7));
    /// assert_eq!(LogicalKey::from_char(' '), LogicalKey::Enter);
    /// assert_eq!(LogicalKey::from_char('x'), LogicalKey::None);
    /// ```
    pub fn from_char(ch: char) -> Self {
        match ch {
            'v' | 'V' => Self::Verb,
            'n' | 'N' => Self::Noun,
            '+' => Self::Plus,
            '-' => Self::Minus,
            '0'..='9' => Self::Digit(ch as u8 - b'0'),
            '\r' | '\n' | ' ' => Self::Enter,
            'd' => Self::Clear,
            'p' => Self::Proceed,
            'r' => Self::Release,
            't' => Self::Reset,
            _ => Self::None,
        }
    }
}

/// Turns a polled key level into press events.
///
/// Holding a key produces one event; releasing (or pressing a different key)
/// arms the detector again.
#[derive(Debug, Default)]
pub struct KeyEdgeDetector {
    previous: LogicalKey,
}

impl KeyEdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the key seen on this tick. Returns it only if it differs from the
    /// key seen on the previous tick.
    pub fn detect(&mut self, key: LogicalKey) -> Option<LogicalKey> {
        let edge = if key != self.previous { Some(key) } else { None };
        self.previous = key;
        edge
    }
}
