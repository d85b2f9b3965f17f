//! CLI command handlers, one per file.

mod checksum;
mod probe;
mod run;
mod status;

pub use checksum::run_checksum;
pub use probe::run_probe;
pub use run::run_fetch;
pub use status::run_status;
