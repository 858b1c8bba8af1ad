//! # Reckon Core
//!
//! Bounded history and multi-observer reckoning.
//!
//! This crate provides:
//! - `RingBuffer`, a fixed-capacity overwrite-oldest store
//! - `History`, a revisioned window over a ring buffer
//! - `Reckoning`, the per-vessel reconciliation unit: head value,
//!   position ledger, and per-observer watermarks
//! - `VesselId` and the small identifier newtypes
//!
//! ## Key invariants
//!
//! - Revisions start at 1 and increase by exactly 1 per `add`, even
//!   when capacity is 0 and the value itself is dropped
//! - A ledger position still referenced by an observer's watermark is
//!   never pruned
//! - An unsatisfiable watermark falls back to a full snapshot, never an
//!   error

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod history;
mod id;
mod reckoning;
mod ring;
mod types;

pub use error::{CoreError, CoreResult};
pub use history::History;
pub use id::VesselId;
pub use reckoning::Reckoning;
pub use ring::RingBuffer;
pub use types::{Revision, SessionId};
