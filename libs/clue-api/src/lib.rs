//! CLUE deployer API models
//!
//! Request and response shapes exchanged with the CLUE deployer service.
//! The backend is not always consistent about field shapes across versions,
//! so several types here accept more than one encoding.

pub mod models;
