//! Command Channel: a WebSocket listener that turns inbound text payloads into
//! discrete movement commands.
//!
//! # Invariants
//! - One payload is one command. Nothing is ever sent back to the client.
//! - Malformed payloads decode to `NoOp`; they never close a connection.
//! - Runs on its own runtime thread and only reaches the viewpoint through a
//!   [`vantage_kernel::ViewpointMutator`] handle.

pub mod client;
mod connection;
pub mod error;
pub mod protocol;
pub mod server;

pub use client::send_payloads;
pub use connection::ConnectionId;
pub use error::ChannelError;
pub use protocol::{DecodeError, decode, decode_bytes, try_decode};
pub use server::{CommandChannel, serve};
