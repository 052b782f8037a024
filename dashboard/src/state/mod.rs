//! Client-side state mirrors

pub mod catalog;
pub mod draft;
pub mod log_buffer;
pub mod queue;
pub mod results;
