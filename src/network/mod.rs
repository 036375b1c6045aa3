//! Remote node access.

pub mod client;

pub use client::NodeClient;
