//! Configuration data model

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub keyboard: KeyboardConfig,
}

/// Target device and typing defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardConfig {
    /// Case-insensitive substring of the device name to type through
    pub name_pattern: Option<String>,
    /// Release stray modifiers before every chord unless overridden
    pub clear_modifiers: bool,
    /// Key names treated as modifiers, replacing the standard set
    pub modifiers: Option<Vec<String>>,
}
