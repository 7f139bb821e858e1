pub mod error;
pub mod types;

pub use error::{CmdError, Result};
pub use types::{CommandId, UNKNOWN_CMD_NAME};
