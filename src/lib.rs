pub mod cache;
pub mod cli;
pub mod client;
pub mod collector;
pub mod config;
pub mod domain;
pub mod errors;
pub mod services;
pub mod sources;
pub mod util;
