//! Sales console — client core for the AI sales-agent dashboard.

pub mod api;
pub mod config;
pub mod connectors;
pub mod error;
pub mod knowledge;
pub mod leads;
pub mod models;
pub mod notify;
pub mod session;
pub mod wizard;
