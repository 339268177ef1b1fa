pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod days;
pub mod error;
pub mod state;
pub mod validation;
