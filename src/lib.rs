pub mod api;
pub mod config;
pub mod conflict;
pub mod dashboard;
pub mod db;
pub mod directory;
pub mod error;
pub mod generator;
pub mod models;
pub mod services;
pub mod state;
pub mod views;
