// src/infra/mod.rs

pub mod config;
pub mod errors;
pub mod identity;
pub mod logger;
pub mod paths;
pub mod prefs;
