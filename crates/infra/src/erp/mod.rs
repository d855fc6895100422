//! ERP order gateway integration

mod client;

pub use client::ErpClient;
