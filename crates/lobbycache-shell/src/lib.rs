//! Page controller shell for the BiHunters lobby application.
//!
//! This crate is the page-level glue around `lobbycache-core`:
//!
//! - `registration`: registers the offline cache controller and drives its
//!   lifecycle
//! - `install`: the install-prompt affordance state machine
//! - `config`: the process-wide static API configuration

pub mod config;
pub mod install;
pub mod registration;
