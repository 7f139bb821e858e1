pub mod dispatcher;

pub use dispatcher::Dispatcher;

use crate::core::{CommandId, Result};
use crate::message::{Decoder, TypedMessage};

/// [`Dispatcher::parser_for`] on the global dispatcher.
pub fn parser_for(cmd_id: impl Into<CommandId>) -> Result<Decoder> {
    Dispatcher::global().parser_for(cmd_id)
}

/// [`Dispatcher::decode`] on the global dispatcher.
pub fn decode(cmd_id: impl Into<CommandId>, payload: &[u8]) -> Result<TypedMessage> {
    Dispatcher::global().decode(cmd_id, payload)
}
