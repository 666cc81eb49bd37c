//! Input device enumeration

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use evdev::{AbsoluteAxisType, Device, EventType, Key, RelativeAxisType};
use serde::Serialize;

/// Capability name for devices that can type letters.
pub const CAP_KEYBOARD: &str = "keyboard";
pub const CAP_POINTER: &str = "pointer";
pub const CAP_TOUCHPAD: &str = "touchpad";
pub const CAP_SWITCH: &str = "switch";
pub const CAP_MULTIMEDIA: &str = "multimedia";

/// Information about an input device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub path: PathBuf,
    pub name: String,
    pub capabilities: BTreeSet<String>,
}

impl DeviceDescriptor {
    pub fn new<I, S>(path: impl Into<PathBuf>, name: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            name: name.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Source of the devices a resolver picks from.
pub trait DeviceSource {
    /// List all available devices, in enumeration order.
    fn list_devices(&self) -> Result<Vec<DeviceDescriptor>>;
}

/// A fixed device list.
impl DeviceSource for Vec<DeviceDescriptor> {
    fn list_devices(&self) -> Result<Vec<DeviceDescriptor>> {
        Ok(self.clone())
    }
}

/// The system's evdev devices under `/dev/input`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvdevDevices;

impl DeviceSource for EvdevDevices {
    fn list_devices(&self) -> Result<Vec<DeviceDescriptor>> {
        enumerate_devices()
    }
}

/// Enumerate all input devices, ordered by event node number
pub fn enumerate_devices() -> Result<Vec<DeviceDescriptor>> {
    let mut paths = Vec::new();

    for entry in std::fs::read_dir("/dev/input")? {
        let entry = entry?;
        let path = entry.path();

        // Only look at event* devices
        if event_number(&path).is_some() {
            paths.push(path);
        }
    }

    paths.sort_by_key(|path| event_number(path));

    let mut devices = Vec::with_capacity(paths.len());
    for path in paths {
        match Device::open(&path) {
            Ok(device) => {
                let name = device.name().unwrap_or("Unknown").to_string();
                let capabilities = capabilities(&device);
                devices.push(DeviceDescriptor {
                    path,
                    name,
                    capabilities,
                });
            }
            Err(e) => {
                tracing::debug!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    Ok(devices)
}

/// Parse `N` out of `/dev/input/eventN`.
fn event_number(path: &Path) -> Option<u32> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix("event"))
        .and_then(|n| n.parse().ok())
}

/// Derive capability names from the event types and codes a device reports.
pub fn capabilities(device: &Device) -> BTreeSet<String> {
    let mut caps = BTreeSet::new();
    let keys = device.supported_keys();
    let has_key = |key: Key| keys.map(|keys| keys.contains(key)).unwrap_or(false);

    if is_keyboard(device) {
        caps.insert(CAP_KEYBOARD.to_string());
    } else if has_key(Key::KEY_VOLUMEUP) || has_key(Key::KEY_PLAYPAUSE) {
        caps.insert(CAP_MULTIMEDIA.to_string());
    }

    let has_rel_x = device
        .supported_relative_axes()
        .map(|axes| axes.contains(RelativeAxisType::REL_X))
        .unwrap_or(false);
    if has_rel_x && has_key(Key::BTN_LEFT) {
        caps.insert(CAP_POINTER.to_string());
    }

    let has_abs_x = device
        .supported_absolute_axes()
        .map(|axes| axes.contains(AbsoluteAxisType::ABS_X))
        .unwrap_or(false);
    if has_abs_x && has_key(Key::BTN_TOUCH) {
        caps.insert(CAP_TOUCHPAD.to_string());
    }

    if device.supported_events().contains(EventType::SWITCH) {
        caps.insert(CAP_SWITCH.to_string());
    }

    caps
}

/// Check if a device is a keyboard
pub fn is_keyboard(device: &Device) -> bool {
    device.supported_events().contains(EventType::KEY)
        && device
            .supported_keys()
            .map(|keys| keys.contains(Key::KEY_A))
            .unwrap_or(false)
}
