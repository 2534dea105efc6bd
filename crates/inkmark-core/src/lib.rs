//! Core engine for the Inkmark PDF markup editor.
//!
//! Responsibilities:
//! - the sidecar codec that stores annotation state as a hex string in the
//!   document catalog (and tolerates the formats older releases wrote),
//! - the [`EditorSession`] holding working state and the two save paths,
//! - flattening, which burns annotations into page content streams.
//!
//! Rendering and input handling live with the embedder; this crate only
//! sees parsed coordinates and raw PDF bytes.

pub mod codec;
pub mod document;
pub mod error;
pub mod flatten;
pub mod session;

pub use codec::{CatalogValue, CustomData, CUSTOM_DATA_KEY};
pub use error::EditorError;
pub use session::{suggested_file_name, EditorSession, SaveKind};
