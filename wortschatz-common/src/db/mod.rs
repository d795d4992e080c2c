//! Shared database layer: schema initialization, models, seed data

#[cfg(feature = "sqlx")]
pub mod init;
pub mod models;
#[cfg(feature = "sqlx")]
pub mod seed;
