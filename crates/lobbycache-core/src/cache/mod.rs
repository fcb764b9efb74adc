//! Versioned cache buckets for response snapshots.
//!
//! This module provides the `BucketStore`, a directory of named buckets,
//! each one a JSON file mapping request URLs to stored response snapshots.
//! At most one bucket name is current at a time; activation purges every
//! other name (see `worker`).

pub mod store;

pub use store::{Bucket, BucketStore, StoredResponse};
