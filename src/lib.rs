pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod resolve;
pub mod schema;
pub mod search;
pub mod server;
pub mod store;
pub mod tools;
pub mod tracing;
pub mod uri;
pub mod version;

pub use engine::{Collaborators, Engine};
pub use error::{EngineError, Result};
