//! CLI command handlers, one file per subcommand.

mod path;
mod populate;
mod status;
mod versions;

pub use path::run_path;
pub use populate::run_populate;
pub use status::run_status;
pub use versions::run_versions;
