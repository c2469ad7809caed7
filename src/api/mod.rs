//! API Module
//!
//! HTTP surface of the demo server. Every request to `/users` runs inside its
//! own loader scope.
//!
//! # Endpoints
//! - `GET /users?ids=1,2,1` - Resolve users through one scope
//! - `GET /stats` - Engine and shared cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
