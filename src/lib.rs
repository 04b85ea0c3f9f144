pub mod app_config;
pub mod capture;
pub mod capture_config;
pub mod cli;
pub mod common;
pub mod config_loader;
pub mod core;
pub mod errors;
pub mod operations;
pub mod vision;
pub mod web;
