pub mod commands;
pub mod executor;
pub mod scripts;

pub use commands::{IndexMember, KeyWrite, VersionGuard, WriteBatch};
pub use executor::{BatchExecutor, BatchResult, RedisExecutor, execute_batch};
