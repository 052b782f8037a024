//! Local storage: directory layout and the settings file

pub mod layout;
pub mod settings;
