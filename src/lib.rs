//! Links an HTTP client container to an HTTP server container over a user-defined Docker network
//! and prints what the client received.

pub mod controllers;
pub mod handlers;
pub mod models;
pub mod utils;
