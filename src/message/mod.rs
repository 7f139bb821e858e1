pub mod descriptor;
pub mod typed;

pub use descriptor::{AnyMessage, DecodeFn, Decoder, EncodeFn, MessageDescriptor};
pub use typed::TypedMessage;

use crate::core::CommandId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// A message type bound to a fixed command id.
///
/// Usually implemented through [`command!`](crate::command).
pub trait Command: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static {
    const CMD_ID: CommandId;
    const CMD_NAME: &'static str;
}

/// Implements [`Command`] for a message type.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct TestReq {
///     uid: String,
/// }
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct TestRsp {
///     ok: bool,
/// }
///
/// cmdwire::command!(TestReq, 1001, "TestReq");
/// cmdwire::command!(TestRsp => 1002);
///
/// use cmdwire::Command;
/// assert_eq!(TestReq::CMD_ID.get(), 1001);
/// assert_eq!(TestRsp::CMD_NAME, "TestRsp");
/// ```
#[macro_export]
macro_rules! command {
    ($ty:ident => $id:expr) => {
        $crate::command!($ty, $id, stringify!($ty));
    };
    ($ty:ty, $id:expr, $name:expr) => {
        impl $crate::message::Command for $ty {
            const CMD_ID: $crate::core::CommandId = $crate::core::CommandId::new($id);
            const CMD_NAME: &'static str = $name;
        }
    };
}

/// Registers several [`Command`] types, stopping at the first error.
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
/// register_commands!(registry; TestReq, TestRsp)?;
/// ```
#[macro_export]
macro_rules! register_commands {
    ($registry:expr; $($ty:ty),+ $(,)?) => {{
        let registry = &mut $registry;
        let mut result: $crate::core::Result<()> = Ok(());
        $(
            if result.is_ok() {
                result = registry.register_command::<$ty>();
            }
        )+
        result
    }};
}
