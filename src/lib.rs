//! # kbridge
//!
//! Read and write privileged memory from an unprivileged context through a single, bounded
//! privileged copy primitive. On top of that primitive this crate provides word access that picks
//! a safe read path per address, large copies, a byte comparator and a background service that
//! executes write commands posted to a shared mailbox.

// Used to make it nicer to return errors, for example, .ok_or(Error::new(EINVAL))
#![allow(clippy::or_fun_call)]
// Indexing a slice can cause panics and that is something we always want to avoid
// in privileged code. Use .get and return an error instead
#![warn(clippy::indexing_slicing)]
// This is usually a serious issue - a missing import of a define where it is interpreted
// as a catch-all variable in a match, for example
#![deny(unreachable_patterns)]
// Ensure that all must_use results are used
#![deny(unused_must_use)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate bitflags;

/// Word access with per-address read path selection
pub mod access;

/// Entry point tying the copy, access and compare layers together
pub mod bridge;

/// Byte comparison over privileged memory
pub mod compare;

/// Runtime configuration
pub mod config;

/// Fixed addresses and sizes
pub mod consts;

/// Staged privileged copies
pub mod copy;

/// Errors
pub mod error;

/// Logging
pub mod log;

/// Shared command mailbox
pub mod mailbox;

/// Address types
pub mod memory;

/// Primitives the embedder supplies
pub mod platform;

/// Background mailbox service
pub mod service;

/// Transfer counters
pub mod stats;

/// Tests
#[cfg(test)]
pub mod tests;

pub use crate::bridge::KernelBridge;
pub use crate::config::{BridgeConfig, ServiceConfig};
pub use crate::error::{Error, Result};
pub use crate::memory::{PhysicalAddress, VirtualAddress};
pub use crate::platform::{Platform, ThreadAttributes, WorkerSpawner, WorkerSpec, WorkerStack};
pub use crate::service::{start_service, start_with_mailbox, PollOutcome, Poller, ServiceHandle};
