//! Client for a hosted natural language classifier's collection endpoint.

mod client;
mod wire;

pub use client::NlcClient;
