//! Operand accumulation from digit and sign keys.

/// Builds a signed operand one key at a time and counts how many operands
/// have been handed to the foreground program.
#[derive(Debug, Default, Clone)]
pub struct NumberAccumulator {
    value: i32,
    /// MINUS was pressed before any non-zero digit.
    pending_negate: bool,
    /// Submission index (`numberIdx`).
    index: u8,
}

impl NumberAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current operand value.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Index of the next operand to submit.
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn is_negate_pending(&self) -> bool {
        self.pending_negate
    }

    /// `value * 10 + digit`, whatever the current sign.
    ///
    /// A pending MINUS is applied as soon as the value becomes positive, so
    /// digits typed after that negation add to a negative value: MINUS,1,2
    /// gives -8. Overflow wraps rather than panicking.
    pub fn push_digit(&mut self, digit: u8) {
        self.value = self.value.wrapping_mul(10).wrapping_add(i32::from(digit));
        if self.pending_negate && self.value > 0 {
            self.value = self.value.wrapping_neg();
            self.pending_negate = false;
        }
    }

    /// MINUS negates a positive value in place, otherwise defers the sign.
    pub fn minus(&mut self) {
        if self.value > 0 {
            self.value = -self.value;
        } else {
            self.pending_negate = true;
        }
    }

    /// PLUS: digits from here on are positive.
    pub fn plus(&mut self) {
        self.pending_negate = false;
    }

    /// Zero the operand and drop any pending sign.
    pub fn clear_value(&mut self) {
        self.value = 0;
        self.pending_negate = false;
    }

    pub fn reset_index(&mut self) {
        self.index = 0;
    }

    pub fn advance_index(&mut self) {
        self.index = self.index.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(acc: &mut NumberAccumulator, digits: &[u8]) {
        for &d in digits {
            acc.push_digit(d);
        }
    }

    #[test]
    fn test_digits_accumulate() {
        let mut acc = NumberAccumulator::new();
        feed(&mut acc, &[1, 2, 3]);
        assert_eq!(acc.value(), 123);
    }

    #[test]
    fn test_minus_before_single_digit() {
        let mut acc = NumberAccumulator::new();
        acc.minus();
        assert!(acc.is_negate_pending());
        feed(&mut acc, &[5]);
        assert_eq!(acc.value(), -5);
        assert!(!acc.is_negate_pending());
    }

    #[test]
    fn test_leading_minus_adds_later_digits_to_negated_value() {
        // -1 * 10 + 2
        let mut acc = NumberAccumulator::new();
        acc.minus();
        feed(&mut acc, &[1, 2]);
        assert_eq!(acc.value(), -8);

        let mut acc = NumberAccumulator::new();
        feed(&mut acc, &[1]);
        acc.minus();
        feed(&mut acc, &[2]);
        assert_eq!(acc.value(), -8);
    }

    #[test]
    fn test_minus_after_digits() {
        let mut acc = NumberAccumulator::new();
        feed(&mut acc, &[4, 2]);
        acc.minus();
        assert_eq!(acc.value(), -42);
    }

    #[test]
    fn test_minus_waits_for_nonzero_digit() {
        let mut acc = NumberAccumulator::new();
        acc.minus();
        feed(&mut acc, &[0, 0, 7]);
        assert_eq!(acc.value(), -7);
    }

    #[test]
    fn test_plus_cancels_pending_minus() {
        let mut acc = NumberAccumulator::new();
        acc.minus();
        acc.plus();
        feed(&mut acc, &[9]);
        assert_eq!(acc.value(), 9);
    }

    #[test]
    fn test_plus_does_not_flip_committed_sign() {
        let mut acc = NumberAccumulator::new();
        feed(&mut acc, &[5]);
        acc.minus();
        acc.plus();
        assert_eq!(acc.value(), -5);
    }

    #[test]
    fn test_overflow_wraps() {
        let mut acc = NumberAccumulator::new();
        feed(&mut acc, &[9; 12]);
        // no panic is the point; the exact wrapped value is unspecified
        let _ = acc.value();
    }

    #[test]
    fn test_index_advances_and_resets() {
        let mut acc = NumberAccumulator::new();
        acc.advance_index();
        acc.advance_index();
        assert_eq!(acc.index(), 2);
        acc.reset_index();
        assert_eq!(acc.index(), 0);
    }
}
