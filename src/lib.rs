//! User translation records and their sync with the community translation
//! contribution service.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod html;
pub mod record;
pub mod remote;
pub mod server;
pub mod store;
pub mod translation;
