//! Chord typing
//!
//! [`ChordTypist`] turns chord specs into ordered press/release events:
//!
//! ```text
//! flush releases -> held presses -> target press -> target release -> held releases (reversed)
//! ```
//!
//! Keys in the keep set are held by the user and never get synthesized
//! presses or releases from modifier handling. The flush step releases every
//! modifier outside the keep set, in canonical order, regardless of what the
//! typist believes the physical state to be.

use anyhow::Result;

use crate::chord::Chord;
use crate::device::{DeviceDescriptor, DeviceSource, EvdevDevices};
use crate::keycode::{KeyCode, KeySet, ModifierSet};
use crate::resolver::DeviceResolver;
use crate::transport::{EvdevTransport, KeyTransport};
use crate::{OpenError, TypistError};

/// A typist writing to a real evdev device.
pub type Keyboard = ChordTypist<EvdevTransport>;

impl Keyboard {
    /// Resolve the target device for `name_pattern` and open it for writing.
    ///
    /// [`OpenError::NotFound`] must be treated as fatal.
    pub fn open(name_pattern: Option<&str>, modifiers: ModifierSet) -> Result<Self, OpenError> {
        Self::open_with(
            &DeviceResolver::new(EvdevDevices),
            name_pattern,
            modifiers,
            EvdevTransport::open,
        )
    }
}

/// Drives chord specs through a [`KeyTransport`].
///
/// Each call is self-contained; no key state is tracked between calls.
pub struct ChordTypist<T> {
    transport: T,
    modifiers: ModifierSet,
}

impl<T: KeyTransport> ChordTypist<T> {
    /// Create a typist using the standard modifier set.
    pub fn new(transport: T) -> Self {
        Self::with_modifiers(transport, ModifierSet::standard())
    }

    pub fn with_modifiers(transport: T, modifiers: ModifierSet) -> Self {
        Self {
            transport,
            modifiers,
        }
    }

    /// Resolve a device through `resolver` and open a transport to it with `open`.
    pub fn open_with<S, F>(
        resolver: &DeviceResolver<S>,
        name_pattern: Option<&str>,
        modifiers: ModifierSet,
        open: F,
    ) -> Result<Self, OpenError>
    where
        S: DeviceSource,
        F: FnOnce(&DeviceDescriptor) -> Result<T>,
    {
        let descriptor = resolver.resolve(name_pattern)?;
        let transport = open(&descriptor).map_err(|source| OpenError::Open {
            name: descriptor.name.clone(),
            source,
        })?;
        Ok(Self::with_modifiers(transport, modifiers))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Type one chord spec such as `"LEFTCTRL+LEFTSHIFT+T"`.
    ///
    /// `keep` names keys the user is physically holding (same `+` grammar,
    /// may be empty). With `clear`, every modifier outside `keep` is released
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`TypistError::Transport`] on the first failed write. Events
    /// before it have already been emitted and are not rolled back.
    pub fn type_chord(&mut self, spec: &str, keep: &str, clear: bool) -> Result<(), TypistError> {
        let chord = Chord::parse(spec);
        let keep = KeySet::parse(keep);

        tracing::debug!(
            "Typing {} (keep: {:?}, clear: {})",
            chord,
            keep.iter().map(KeyCode::name).collect::<Vec<_>>(),
            clear
        );

        let flush: Vec<KeyCode> = if clear {
            self.modifiers.without(&keep).cloned().collect()
        } else {
            Vec::new()
        };
        self.clear_modifiers(&flush)?;

        let held: Vec<&KeyCode> = chord
            .held()
            .iter()
            .filter(|code| !keep.contains(code))
            .collect();

        for code in &held {
            self.key_down(code)?;
        }

        self.key_down(chord.target())?;
        self.key_up(chord.target())?;

        for code in held.iter().rev() {
            self.key_up(code)?;
        }

        Ok(())
    }

    /// Type each spec in order, with no keep set and no flush.
    pub fn type_all<S: AsRef<str>>(&mut self, specs: &[S]) -> Result<(), TypistError> {
        for spec in specs {
            self.type_chord(spec.as_ref(), "", false)?;
        }
        Ok(())
    }

    /// Release each code, in the order given.
    pub fn clear_modifiers(&mut self, codes: &[KeyCode]) -> Result<(), TypistError> {
        if !codes.is_empty() {
            tracing::debug!("Flushing {} modifier(s)", codes.len());
        }
        for code in codes {
            self.key_up(code)?;
        }
        Ok(())
    }

    pub fn key_down(&mut self, code: &KeyCode) -> Result<(), TypistError> {
        self.send_event(code, true)
    }

    pub fn key_up(&mut self, code: &KeyCode) -> Result<(), TypistError> {
        self.send_event(code, false)
    }

    fn send_event(&mut self, code: &KeyCode, pressed: bool) -> Result<(), TypistError> {
        tracing::trace!("{} {}", if pressed { "press" } else { "release" }, code);
        self.transport
            .emit(code, pressed)
            .map_err(|source| TypistError::Transport {
                code: code.clone(),
                pressed,
                source,
            })
    }

    /// Check that the transport can emit every key in `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`TypistError::Unsupported`] listing each unsupported code.
    pub fn validate(&self, spec: &str) -> Result<(), TypistError> {
        let chord = Chord::parse(spec);
        let codes: Vec<KeyCode> = chord
            .codes()
            .filter(|code| !self.transport.supports(code))
            .cloned()
            .collect();

        if codes.is_empty() {
            Ok(())
        } else {
            Err(TypistError::Unsupported { codes })
        }
    }
}
