//! Core data model types

pub mod instrument;
pub mod position;
