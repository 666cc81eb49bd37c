//! Key name to key code mapping
//!
//! Key codes follow the kernel naming convention: the uppercased key name
//! prefixed with `KEY_` (e.g. `"leftshift"` -> `KEY_LEFTSHIFT`). The namespace
//! is open, so any name produces a code and the transport decides whether the
//! device can actually emit it.

use std::fmt;

/// Prefix shared by every key code.
pub const KEY_PREFIX: &str = "KEY_";

/// Symbolic identifier for one physical key (e.g. `KEY_A`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(String);

impl KeyCode {
    /// Map a key name to its code.
    ///
    /// Names are trimmed and matched case-insensitively. Unrecognized names
    /// still produce a code.
    pub fn from_name(name: &str) -> Self {
        Self(format!("{}{}", KEY_PREFIX, name.trim().to_uppercase()))
    }

    /// The full code string, including the `KEY_` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key name without the `KEY_` prefix.
    pub fn name(&self) -> &str {
        &self.0[KEY_PREFIX.len()..]
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a `+`-joined key spec into codes, left to right.
pub(crate) fn parse_codes(spec: &str) -> Vec<KeyCode> {
    spec.split('+').map(KeyCode::from_name).collect()
}

/// A set of key codes, e.g. the modifiers a user is physically holding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    codes: Vec<KeyCode>,
}

impl KeySet {
    /// Parse a `+`-joined key spec. An empty (or blank) spec is the empty set.
    pub fn parse(spec: &str) -> Self {
        if spec.trim().is_empty() {
            return Self::default();
        }

        let mut codes: Vec<KeyCode> = Vec::new();
        for code in parse_codes(spec) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        Self { codes }
    }

    pub fn contains(&self, code: &KeyCode) -> bool {
        self.codes.contains(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyCode> {
        self.codes.iter()
    }
}

/// Ordered collection of key codes treated as modifiers.
///
/// The order is the canonical release order used when flushing stray
/// modifier state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierSet {
    codes: Vec<KeyCode>,
}

impl ModifierSet {
    /// Key names of the standard modifiers, in flush order.
    pub const STANDARD_NAMES: [&'static str; 8] = [
        "LEFTALT",
        "LEFTCTRL",
        "LEFTMETA",
        "LEFTSHIFT",
        "RIGHTALT",
        "RIGHTCTRL",
        "RIGHTMETA",
        "RIGHTSHIFT",
    ];

    /// Left/right Ctrl, Shift, Alt and Meta.
    pub fn standard() -> Self {
        Self::from_names(Self::STANDARD_NAMES)
    }

    /// Build a modifier set from key names, keeping the first occurrence of
    /// each code.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut codes: Vec<KeyCode> = Vec::new();
        for name in names {
            let code = KeyCode::from_name(name.as_ref());
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        Self { codes }
    }

    pub fn contains(&self, code: &KeyCode) -> bool {
        self.codes.contains(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyCode> {
        self.codes.iter()
    }

    /// Every modifier not in `keep`, in canonical order.
    pub fn without<'a>(&'a self, keep: &'a KeySet) -> impl Iterator<Item = &'a KeyCode> + 'a {
        self.codes.iter().filter(move |code| !keep.contains(code))
    }
}

impl Default for ModifierSet {
    fn default() -> Self {
        Self::standard()
    }
}
