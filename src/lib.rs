pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod menu;
pub mod models;
pub mod queries;
pub mod sources;
