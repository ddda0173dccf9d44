//! Structured generation of four algorithmic solution variants, with strict
//! validation, an interactive viewer and narration.

pub mod config;
pub mod narration;
pub mod server;
pub mod solve;
pub mod viewer;
