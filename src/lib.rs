pub mod analyze;
pub mod config;
pub mod envelope;
pub mod error;
pub mod message;
pub mod session;
pub mod store;

pub use analyze::registry::{ProblemRegistry, RegistryBuilder};
pub use analyze::{Analysis, Analyzer, Fired, Outcome};
pub use config::{Config, ProblemAction};
pub use session::Session;
pub use store::{MemoryStore, MessageRecord, Response, Store};
