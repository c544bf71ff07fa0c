//! ## Crate layout
//! - `core`: runtime metadata model, deep-link codec, card graphs, and
//!   the resolver/predictor engine.
//! - `error`: public error taxonomy for embedding applications.
//! - `navigator`: facade handle that converts core errors into [`Error`].
//!
//! The `prelude` module mirrors the surface an embedding shell uses.

pub use cardnav_core as core;

pub mod error;
pub mod navigator;

pub use error::{Error, ErrorKind, ErrorOrigin};
pub use navigator::{Navigator, parse_url, render_url};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Shell Prelude
/// The working vocabulary of an embedding shell: model and state types,
/// stimuli, the navigator, and the public error taxonomy.
///

pub mod prelude {
    pub use crate::{
        Error, ErrorKind, ErrorOrigin, Navigator,
        core::{
            graph::{ShortcutEntry, ShortcutTarget},
            prelude::*,
            store::{MemoryStore, MetadataSet, MetadataStore},
        },
        navigator::{parse_url, render_url},
    };
}
