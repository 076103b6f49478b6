//! Core of the mdzview markdown viewer: bundle extraction, asset discovery,
//! page assembly and the session driving them. The window and webview live
//! in the binary.

pub mod archive;
pub mod assemble;
pub mod assets;
pub mod config;
pub mod error;
pub mod links;
pub mod loader;
pub mod markdown;
pub mod menu;
pub mod protocol;
pub mod resources;
pub mod session;
pub mod uri;

pub use error::{Error, Result};
pub use loader::{LoadedDocument, LoaderSettings};
pub use session::{Actions, Session};
