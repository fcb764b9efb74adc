//! Offline cache controller for the BiHunters lobby shell.
//!
//! This crate implements the background worker that keeps the lobby app
//! usable offline:
//!
//! - `cache`: versioned bucket store of request → response snapshots
//! - `strategy`: request classification and the cache-first/network-first
//!   strategies with synthesized offline fallbacks
//! - `worker`: the controller lifecycle (install, activate, fetch
//!   interception, push, sync)
//! - `host`: the event loop hosting the controller
//! - `clients`: open pages controlled by the worker
//! - `sync`: persisted background-sync retry queue
//!
//! The page-level glue (registration, install prompt, API configuration)
//! lives in the `lobbycache-shell` crate.

pub mod cache;
pub mod clients;
pub mod fetch;
pub mod host;
pub mod models;
pub mod push;
pub mod strategy;
pub mod sync;
pub mod worker;

pub use worker::{CacheController, WorkerState, CACHE_NAME};
