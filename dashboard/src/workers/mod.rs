//! Background workers

pub mod log_stream;
pub mod poller;
