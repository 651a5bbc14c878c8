//! Library surface of the nofly HTTP server, shared by the binary and tests.

pub mod api;
pub mod config;
pub mod runner;
pub mod state;
