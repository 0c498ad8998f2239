//! Foodgram Backend Library
//!
//! This library exposes the backend modules for the server binary, the
//! seed importer and the integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
