pub mod config;
pub mod connection;
pub mod error;
pub mod fleet_sync;
pub mod handler_registry;
pub mod message;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_utils;
