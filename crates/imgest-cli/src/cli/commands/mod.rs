//! CLI command handlers, one file per subcommand.

mod assets;
pub(crate) mod check;
mod ingest;
mod preview;

pub use assets::run_assets;
pub use check::run_check;
pub use ingest::{run_ingest, IngestOptions};
pub use preview::run_preview;
