//! Data models for the offline cache controller.
//!
//! This module contains the request/response types moved through the
//! fetch-interception path and the precache manifest:
//!
//! - `Request`, `Method`, `FetchMode`: request identity and mode
//! - `Response`, `ResponseKind`: response snapshots, opaque or basic
//! - `PrecacheManifest`: the fixed asset lists cached at install time

pub(crate) mod encoding;
pub mod manifest;
pub mod request;
pub mod response;

pub use manifest::PrecacheManifest;
pub use request::{FetchMode, Method, Request};
pub use response::{Response, ResponseKind};
