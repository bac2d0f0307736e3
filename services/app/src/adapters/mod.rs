pub mod http;
pub mod storage;
pub mod wire;

pub use http::HttpClient;
pub use storage::{MemoryStorage, SqliteStorage};
