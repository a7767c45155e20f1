//! Core identifiers shared by every layer of the registry.
//!
//! - [`Vid`]: generation-checked entity identifier
//! - [`Component`]: the client-facing wrapper behind a VID
//! - [`ComponentKind`]: the closed set of wrapper variants

pub mod component;
pub mod vid;

pub use component::{Component, ComponentKind};
pub use vid::{INVALID_VID, Vid};
