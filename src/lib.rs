// src/lib.rs
pub mod api;
pub mod banner;
pub mod client;
pub mod config;
pub mod errors;
pub mod harness;
pub mod hooks;
pub mod judge;
pub mod models;
pub mod progress;
pub mod runner;
pub mod session;
pub mod tracker;
