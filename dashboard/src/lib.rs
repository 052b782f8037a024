//! CLUE Dashboard Library
//!
//! Client state, synchronisation and command line front end for the CLUE
//! benchmark deployer.

pub mod app;
pub mod cli;
pub mod errors;
pub mod filesys;
pub mod form;
pub mod http;
pub mod logs;
pub mod results;
pub mod server;
pub mod state;
pub mod storage;
pub mod sync;
pub mod utils;
pub mod workers;
