//! transport
//!
//! Abstraction for delivering GraphQL requests.
//!
//! # Architecture
//!
//! The `Transport` trait is the client's only dependency on the network.
//! The client builds a [`RequestEnvelope`], hands it to the transport with
//! the endpoint URL, and gets the raw response body back.
//!
//! # Modules
//!
//! - `traits`: Core `Transport` trait and [`RequestEnvelope`]
//! - [`http`]: reqwest implementation used by default
//! - [`mock`]: Mock implementation for deterministic testing

pub mod http;
pub mod mock;
mod traits;

pub use http::{HttpTransport, HttpTransportBuilder};
pub use traits::*;
