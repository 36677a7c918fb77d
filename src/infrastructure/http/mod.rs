//! HTTP transport for the optimization session protocol
//!
//! [`HttpSessionClient`] implements the session port against the
//! service's REST surface; wire shapes live in [`types`].

pub mod client;
pub mod types;

pub use client::{HttpSessionClient, HttpSessionClientConfig};
