pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod images;
pub mod manager;
pub mod models;
pub mod session;
pub mod traits;
pub mod utils;
pub mod view;
