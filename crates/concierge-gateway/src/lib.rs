//! Concierge Gateway — HTTP service boundary and runtime wiring

pub mod ingest;
pub mod server;
pub mod service;

pub use server::{router, start_server, AppState};
pub use service::ConciergeFactory;
