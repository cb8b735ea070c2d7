pub mod executor;
pub mod logging;
pub mod query;
pub mod server;
pub mod storage;
