//! Synthetic keyboard input for sendkey
//!
//! This crate resolves a target input device and types key chords through it,
//! nesting held modifiers around a tapped key while leaving keys the user is
//! already holding alone.

mod chord;
mod error;
mod keycode;
mod resolver;
mod typist;

pub mod device;
pub mod transport;

pub use chord::Chord;
pub use error::{OpenError, TypistError};
pub use keycode::{KeyCode, KeySet, ModifierSet, KEY_PREFIX};
pub use resolver::{effective_pattern, select, DeviceNotFound, DeviceResolver, DEFAULT_NAME_PATTERN};
pub use typist::{ChordTypist, Keyboard};
