//! Foundernet - a startup-networking backend with realtime direct messaging.

pub mod api;
pub mod auth;
pub mod build_info;
pub mod config;
pub mod handlers;
pub mod realtime;
pub mod server;
pub mod store;
