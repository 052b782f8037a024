//! Results browsing

pub mod browser;
