mod command_registry;
mod intent_parser;

pub use command_registry::{CommandSpec, CHAT_COMMANDS};
pub use intent_parser::{parse_command, ChatCommand};
