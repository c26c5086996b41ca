// src/lib.rs

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod session;
pub mod state;

// Re-export specific items for convenience if needed
pub use session::SessionState;
pub use session::controller::SessionController;
