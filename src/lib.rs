pub mod analytics;
pub mod cli;
pub mod config;
pub mod loader;
pub mod logging;
pub mod render;
pub mod report;
pub mod view;
pub mod web;
