//! Key event transport
//!
//! This module provides the [`KeyTransport`] seam the typist writes through,
//! and [`EvdevTransport`], which writes key events straight into the resolved
//! `/dev/input/eventN` node.

use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use evdev::{Device, EventType, InputEvent, Key};
use nix::unistd::{access, AccessFlags};

use crate::device::DeviceDescriptor;
use crate::keycode::KeyCode;

/// A writable handle that emits one key transition at a time.
pub trait KeyTransport {
    /// Emit a single press (`pressed == true`) or release of `code`.
    fn emit(&mut self, code: &KeyCode, pressed: bool) -> Result<()>;

    /// Whether the underlying device can emit `code`.
    fn supports(&self, _code: &KeyCode) -> bool {
        true
    }
}

/// Writes key events into an evdev device node.
pub struct EvdevTransport {
    device: Device,
    name: String,
}

impl EvdevTransport {
    /// Open the device behind `descriptor` for writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not writable by this process or cannot
    /// be opened.
    pub fn open(descriptor: &DeviceDescriptor) -> Result<Self> {
        let path = &descriptor.path;

        access(path.as_path(), AccessFlags::R_OK | AccessFlags::W_OK).with_context(|| {
            format!(
                "No read/write access to {} ('{}'). \
                 Is the user in the 'input' group?",
                path.display(),
                descriptor.name
            )
        })?;

        let device = Device::open(path)
            .with_context(|| format!("Failed to open device at {}", path.display()))?;

        tracing::info!("Typing through '{}' at {}", descriptor.name, path.display());

        Ok(Self {
            device,
            name: descriptor.name.clone(),
        })
    }

}

/// Resolve a key code to its evdev key.
pub fn evdev_key(code: &KeyCode) -> Result<Key> {
    Key::from_str(code.as_str()).map_err(|_| anyhow!("Unknown evdev key: {}", code))
}

impl KeyTransport for EvdevTransport {
    fn emit(&mut self, code: &KeyCode, pressed: bool) -> Result<()> {
        let key = evdev_key(code)?;
        let event = InputEvent::new(EventType::KEY, key.code(), i32::from(pressed));
        let syn = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        self.device
            .send_events(&[event, syn])
            .with_context(|| format!("Failed to write {} to '{}'", code, self.name))?;
        Ok(())
    }

    fn supports(&self, code: &KeyCode) -> bool {
        match evdev_key(code) {
            Ok(key) => self
                .device
                .supported_keys()
                .map(|keys| keys.contains(key))
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}
