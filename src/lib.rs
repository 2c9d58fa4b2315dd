//src/lib.rs

// Declaração dos nossos módulos
pub mod api;
pub mod common;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;

pub use common::error::AppError;
pub use config::{AppConfig, AppState, DashboardMode};
