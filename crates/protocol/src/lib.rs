//! Wire types for the Chrome DevTools Protocol.
//!
//! This crate contains the serde-serializable types exchanged with a browser
//! over a CDP WebSocket. Only the domains the download pipeline touches are
//! modelled: `Browser` (download behavior and events), `Target` (page
//! creation and flat-session attach), `Page` (navigation), `Runtime`
//! (expression evaluation) and `Input` (mouse dispatch).
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * 1:1 with protocol: Field names follow the CDP schema (camelCase)
//! * Stable: Changes only when the wire protocol changes
//!
//! Session-level behavior is built on top of these types in `docgrab`.

pub mod browser;
pub mod input;
pub mod message;
pub mod page;
pub mod runtime;
pub mod target;
pub mod version;

pub use browser::*;
pub use input::*;
pub use message::*;
pub use page::*;
pub use runtime::*;
pub use target::*;
pub use version::*;
