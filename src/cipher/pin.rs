//! Four-digit PINs and incremental PIN entry.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of digits in a PIN.
pub const PIN_LENGTH: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    #[error("PIN must be exactly 4 digits, got {0} characters")]
    WrongLength(usize),

    #[error("PIN must contain only digits 0-9")]
    NonDigit,
}

/// A four-digit PIN, held as its ASCII character bytes.
///
/// Both ciphers use the character bytes (`b'0'..=b'9'`) as key material,
/// never the digit values. Wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Pin([u8; PIN_LENGTH]);

impl Pin {
    /// Parses exactly four ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PinError> {
        let chars = s.chars().count();
        if chars != PIN_LENGTH {
            return Err(PinError::WrongLength(chars));
        }

        let mut digits = [0u8; PIN_LENGTH];
        for (slot, c) in digits.iter_mut().zip(s.chars()) {
            if !c.is_ascii_digit() {
                return Err(PinError::NonDigit);
            }
            *slot = c as u8;
        }
        Ok(Self(digits))
    }

    /// Character bytes of the PIN.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

impl FromStr for Pin {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Slot-by-slot PIN entry.
///
/// Digits fill slots left to right. Pasted text has non-digits stripped and
/// is distributed from the current slot onward; anything past the last slot
/// is dropped.
#[derive(Debug, Default, Clone, Zeroize, ZeroizeOnDrop)]
pub struct PinEntry {
    slots: [Option<u8>; PIN_LENGTH],
    cursor: usize,
}

impl PinEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds typed or pasted text. Returns how many digits were accepted.
    pub fn input(&mut self, text: &str) -> usize {
        let mut accepted = 0;
        for c in text.chars().filter(char::is_ascii_digit) {
            if self.cursor >= PIN_LENGTH {
                break;
            }
            self.slots[self.cursor] = Some(c as u8);
            self.cursor += 1;
            accepted += 1;
        }
        accepted
    }

    /// Clears the most recently filled slot.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.slots[self.cursor] = None;
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None; PIN_LENGTH];
        self.cursor = 0;
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == PIN_LENGTH
    }

    /// The entered PIN, once all four slots are filled.
    pub fn pin(&self) -> Option<Pin> {
        if !self.is_complete() {
            return None;
        }

        let mut digits = [0u8; PIN_LENGTH];
        for (slot, digit) in digits.iter_mut().zip(self.slots.iter()) {
            *slot = (*digit)?;
        }
        Some(Pin(digits))
    }
}
