pub mod common;
pub mod data;
pub mod forecasts;
pub mod health;
pub mod jobs;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
