pub mod config;
pub mod error;
pub mod ids;
pub mod registry;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod user;
pub mod validation;

pub use config::{Mode, RegistrationConfig, StorageBackend};
pub use error::{RegistrationError, Result, ValidationError};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use registry::Registry;
pub use server::{build_router, AppState, RegistrationServer};
pub use storage::{DiskStorage, MemoryStorage, UserStore};
pub use user::{Club, RegistrationRequest, User};
