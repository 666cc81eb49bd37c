//! Chord parsing
//!
//! A chord spec like `"LEFTCTRL+LEFTSHIFT+T"` names keys left to right. The
//! last key is the target, which gets tapped; every key before it is held
//! for the duration of the tap.

use std::fmt;

use crate::keycode::{parse_codes, KeyCode};

/// An ordered, non-empty sequence of key codes parsed from one chord spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    held: Vec<KeyCode>,
    target: KeyCode,
}

impl Chord {
    /// Parse a `+`-joined chord spec.
    ///
    /// Parsing never fails. An empty spec yields a single empty-name chord;
    /// callers are expected not to pass one.
    pub fn parse(spec: &str) -> Self {
        let mut codes = parse_codes(spec);
        // split always yields at least one element
        let target = codes.pop().unwrap_or_else(|| KeyCode::from_name(""));
        Self {
            held: codes,
            target,
        }
    }

    /// Keys held while the target is tapped, in press order.
    pub fn held(&self) -> &[KeyCode] {
        &self.held
    }

    /// The key that is tapped.
    pub fn target(&self) -> &KeyCode {
        &self.target
    }

    /// Every code in the chord, held keys first.
    pub fn codes(&self) -> impl Iterator<Item = &KeyCode> {
        self.held.iter().chain(std::iter::once(&self.target))
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in &self.held {
            write!(f, "{}+", code.name())?;
        }
        f.write_str(self.target.name())
    }
}
