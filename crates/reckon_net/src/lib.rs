//! # Reckon Net
//!
//! UDP transport, session registry, and vessel routing.
//!
//! This crate provides:
//! - `Endpoint`, a UDP socket with a background reader thread that
//!   delivers decoded frames over a channel
//! - `Connection`, the client-side channel to one server
//! - `Registry` and `Session`, the server-side peer bookkeeping
//! - `Server`, the routing loop owning one `Reckoning` per vessel
//! - `VesselTracker`, the client-side snapshot differ and update applier
//!
//! ## Concurrency model
//!
//! Each endpoint runs exactly one reader thread, blocked on the socket.
//! Everything else happens on whichever thread drives `Server::step` or
//! the tracker, so reckonings, sessions, and watermarks have a single
//! writer and need no locking. Closing an endpoint is idempotent and
//! terminates the reader without touching the rest of the process.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod endpoint;
mod error;
mod registry;
mod server;
mod tracker;

pub use client::Connection;
pub use config::{ClientConfig, ServerConfig};
pub use endpoint::{Endpoint, Incoming, MAX_DATAGRAM_LEN};
pub use error::{NetError, NetResult};
pub use registry::{Registry, Session};
pub use server::{Server, ServerEvent};
pub use tracker::VesselTracker;
