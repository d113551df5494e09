//! HTTP facade for newsdesk
//!
//! Exposes two operations to chat clients:
//!
//! - `GET|POST /thread`: open a conversation session
//! - `POST /message`: send a message and wait for the assistant's reply
//!
//! plus `GET /health` for load balancers.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
