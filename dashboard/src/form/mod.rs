//! Experiment configuration form

pub mod estimate;
pub mod selection;
pub mod submit;
