//! JSON-over-HTTP surface bridging clients to the engine core.

pub mod handlers;
pub mod router;
pub mod types;

pub use router::{create_router, AppState};
