//! Billfold: invoicing and billing back office service

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod gateways;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod services;
pub mod state;
pub mod storage;
