//! Target device selection
//!
//! A device is chosen by name first and by capability second:
//!
//! 1. The first device whose name contains the pattern (case-insensitive).
//!    The pattern defaults to `"keyboard"`.
//! 2. Otherwise, the first device that declares the `keyboard` capability.
//!
//! If neither yields a device, resolution fails with [`DeviceNotFound`], which
//! callers must treat as fatal.

use miette::Diagnostic;
use thiserror::Error;

use crate::device::{DeviceDescriptor, DeviceSource, CAP_KEYBOARD};

/// Pattern used when none (or an empty one) is configured.
pub const DEFAULT_NAME_PATTERN: &str = "keyboard";

/// No input device matched by name or by capability.
///
/// This is not a recoverable condition: without a target device nothing can
/// be typed, so the process should exit.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("No keyboard device found (pattern '{pattern}', {inspected} device(s) inspected)")]
#[diagnostic(
    code(sendkey::device::not_found),
    help("run `sendkey devices` to list input devices, and check read/write access to /dev/input")
)]
pub struct DeviceNotFound {
    pub pattern: String,
    pub inspected: usize,
}

/// Selects exactly one target device from a [`DeviceSource`].
pub struct DeviceResolver<S> {
    source: S,
}

impl<S: DeviceSource> DeviceResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Choose the target device for `pattern`.
    pub fn resolve(&self, pattern: Option<&str>) -> Result<DeviceDescriptor, DeviceNotFound> {
        let pattern = effective_pattern(pattern);

        let devices = match self.source.list_devices() {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!("Failed to enumerate input devices: {:#}", e);
                Vec::new()
            }
        };

        tracing::debug!(
            "Resolving device with pattern '{}' among {} device(s)",
            pattern,
            devices.len()
        );

        let inspected = devices.len();
        select(devices, pattern).ok_or_else(|| DeviceNotFound {
            pattern: pattern.to_string(),
            inspected,
        })
    }
}

/// The caller's pattern, or [`DEFAULT_NAME_PATTERN`] when absent or empty.
pub fn effective_pattern(pattern: Option<&str>) -> &str {
    match pattern {
        Some(p) if !p.is_empty() => p,
        _ => DEFAULT_NAME_PATTERN,
    }
}

/// Pick a device by name match, falling back to keyboard capability.
pub fn select(devices: Vec<DeviceDescriptor>, pattern: &str) -> Option<DeviceDescriptor> {
    let needle = pattern.to_lowercase();

    if let Some(index) = devices
        .iter()
        .position(|device| device.name.to_lowercase().contains(&needle))
    {
        tracing::debug!("Device '{}' matched by name", devices[index].name);
        return devices.into_iter().nth(index);
    }

    let device = devices
        .into_iter()
        .find(|device| device.has_capability(CAP_KEYBOARD))?;
    tracing::debug!(
        "No device name contains '{}', using keyboard-capable '{}'",
        pattern,
        device.name
    );
    Some(device)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, caps: &[&str]) -> DeviceDescriptor {
        DeviceDescriptor::new("/dev/input/event0", name, caps.iter().copied())
    }

    fn resolve(devices: Vec<DeviceDescriptor>, pattern: Option<&str>) -> Result<String, DeviceNotFound> {
        DeviceResolver::new(devices)
            .resolve(pattern)
            .map(|device| device.name)
    }

    #[test]
    fn test_effective_pattern() {
        assert_eq!(effective_pattern(None), "keyboard");
        assert_eq!(effective_pattern(Some("")), "keyboard");
        assert_eq!(effective_pattern(Some("Awesome")), "Awesome");
    }

    #[test]
    fn test_default_pattern_case_insensitive() {
        for name in ["keyboard", "Keyboard", "KEYBOARD", "dummy keyboard", "KEYBOARD(UPPER CASE)"] {
            let devices = vec![device(name, &[])];
            assert_eq!(resolve(devices, None).unwrap(), name);
        }
    }

    #[test]
    fn test_custom_pattern() {
        let devices = vec![
            device("AT Translated Set 2 keyboard", &["keyboard"]),
            device("Awesome KEY/BOARD input device", &["keyboard"]),
        ];
        assert_eq!(
            resolve(devices, Some("awesome key/board")).unwrap(),
            "Awesome KEY/BOARD input device"
        );
    }

    #[test]
    fn test_first_name_match_wins() {
        let devices = vec![
            device("Mouse", &["pointer"]),
            device("Keyboard one", &[]),
            device("Keyboard two", &["keyboard"]),
        ];
        assert_eq!(resolve(devices, None).unwrap(), "Keyboard one");
    }

    #[test]
    fn test_name_match_beats_capability() {
        let devices = vec![
            device("Consumer Control", &["keyboard"]),
            device("Logitech keyboard", &[]),
        ];
        assert_eq!(resolve(devices, None).unwrap(), "Logitech keyboard");
    }

    #[test]
    fn test_capability_fallback() {
        let devices = vec![device("Mouse", &["pointer"]), device("KEY-BOARD", &["keyboard"])];
        assert_eq!(resolve(devices, None).unwrap(), "KEY-BOARD");
    }

    #[test]
    fn test_capability_fallback_takes_first() {
        let devices = vec![device("HHKB", &["keyboard"]), device("Planck", &["keyboard"])];
        assert_eq!(resolve(devices, Some("corne")).unwrap(), "HHKB");
    }

    #[test]
    fn test_no_device_is_not_found() {
        let devices = vec![device("Mouse", &["pointer"]), device("Lid Switch", &["switch"])];
        let err = resolve(devices, None).unwrap_err();
        assert_eq!(
            err,
            DeviceNotFound {
                pattern: "keyboard".to_string(),
                inspected: 2,
            }
        );
    }

    #[test]
    fn test_empty_device_list_is_not_found() {
        let err = resolve(Vec::new(), Some("planck")).unwrap_err();
        assert_eq!(err.pattern, "planck");
        assert_eq!(err.inspected, 0);
    }

    struct BrokenSource;

    impl DeviceSource for BrokenSource {
        fn list_devices(&self) -> anyhow::Result<Vec<DeviceDescriptor>> {
            anyhow::bail!("permission denied")
        }
    }

    #[test]
    fn test_enumeration_failure_is_not_found() {
        let err = DeviceResolver::new(BrokenSource).resolve(None).unwrap_err();
        assert_eq!(err.inspected, 0);
    }
}
