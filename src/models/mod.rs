//! Request and Response models for the demo API
//!
//! DTOs (Data Transfer Objects) for the query strings and JSON bodies of
//! the directory endpoints.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::UsersQuery;
pub use responses::{ErrorResponse, HealthResponse, StatsResponse, UserResult, UsersResponse};
