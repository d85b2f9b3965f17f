pub mod config;
pub mod logging;

pub mod checksum;
pub mod content;
pub mod descriptor;
pub mod error;
pub mod http;
pub mod metadata;
pub mod pool;
pub mod store;
pub mod task;
