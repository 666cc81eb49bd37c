//! Configuration parsing for sendkey
//!
//! This crate reads the KDL configuration file that sets the target device
//! pattern and typing defaults.

mod error;
mod model;
mod parser;

pub use error::ConfigError;
pub use model::*;
pub use parser::{expand_path, load_config, parse_config, parse_config_str};
