//! Pelis library
//!
//! A TTL-cached client for browsing the movie library of a Jellyfin-compatible
//! media server. The CLI binary is a thin layer over these modules.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod service;
