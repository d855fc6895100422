//! HTTP transport shared by outbound integrations

mod client;

pub use client::{HttpClient, HttpClientBuilder};
