//! submission-service: stores word lists and contact requests, then emails a fixed recipient set.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
