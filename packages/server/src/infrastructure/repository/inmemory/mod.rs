//! インメモリ実装

pub mod directory;
pub mod message;

pub use directory::{DirectoryLoadError, DirectorySeed, InMemoryIdentityDirectory};
pub use message::InMemoryMessageRepository;
