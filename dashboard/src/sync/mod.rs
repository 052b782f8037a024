//! Synchronisation of the queue mirror with the backend

pub mod dashboard;
pub mod phase;
