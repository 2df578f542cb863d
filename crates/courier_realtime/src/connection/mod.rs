pub mod connection_manager;
pub mod connection_state;
mod worker;

pub use worker::ConnectionNotice;
