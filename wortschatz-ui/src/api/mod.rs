//! HTTP API handlers for wortschatz-ui

pub mod auth;
pub mod flashcards;
pub mod health;
pub mod import;
pub mod progress;
pub mod vocabulary;

pub use auth::{forgot_password, get_current_user, login, reset_password, signup};
pub use auth::{AdminUser, AuthUser};
pub use flashcards::{get_flashcards, submit_review};
pub use health::health_routes;
pub use import::bulk_import;
pub use progress::get_progress;
pub use vocabulary::{create_vocabulary, delete_vocabulary, list_vocabulary, update_vocabulary};
