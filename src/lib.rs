pub mod config;
pub mod error;
pub mod server;
pub mod storage;
pub mod student;

pub use config::{RegistryConfig, Seed, DEFAULT_PORT};
pub use error::{RegistryError, Result};
pub use server::{router, RegistryServer};
pub use storage::{MemoryStore, StudentStore};
pub use student::{AgeFilter, Student, StudentKey, StudentPatch};
