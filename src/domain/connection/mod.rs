pub mod service;
pub mod state;

pub use service::{ConnectionManager, ConnectionSettings};
pub use state::{ConnectionPhase, ConnectionState};
