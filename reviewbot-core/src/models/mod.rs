//! Data models for reviewbot

pub mod configuration;
pub mod homework;

pub use configuration::*;
pub use homework::*;
