use miette::Diagnostic;
use thiserror::Error;

use crate::keycode::KeyCode;
use crate::resolver::DeviceNotFound;

#[derive(Error, Diagnostic, Debug)]
pub enum OpenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    NotFound(#[from] DeviceNotFound),

    #[error("Failed to open '{name}' for writing")]
    #[diagnostic(code(sendkey::device::open))]
    Open {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Error, Diagnostic, Debug)]
pub enum TypistError {
    #[error("Failed to {} {code}", transition(.pressed))]
    #[diagnostic(
        code(sendkey::typist::transport),
        help("keys pressed before the failure may still be held; typing with --clear releases stray modifiers")
    )]
    Transport {
        code: KeyCode,
        pressed: bool,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unsupported key(s): {}", names(.codes))]
    #[diagnostic(code(sendkey::typist::unsupported))]
    Unsupported { codes: Vec<KeyCode> },
}

fn transition(pressed: &bool) -> &'static str {
    if *pressed {
        "press"
    } else {
        "release"
    }
}

fn names(codes: &[KeyCode]) -> String {
    codes.iter().map(KeyCode::name).collect::<Vec<_>>().join(", ")
}
