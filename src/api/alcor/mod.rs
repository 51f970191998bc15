pub mod client;
pub mod models;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::AlcorClient;
pub use models::{ApiError, Endpoint};
