//! Steward Equipment Inventory Tracking System
//!
//! A multi-tenant REST JSON API for managing equipment inventories:
//! asset registration, checkout/check-in assignments, incident tracking,
//! an append-only activity log, and dashboard rollups.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
