#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Noop,
    Photo { path: String, hint: Option<String> },
    Describe { text: String },
    Similar,
    /// Zero-based section index.
    Open { index: usize },
    Expand,
    Collapse,
    Share,
    Reset,
    Retry,
    Status,
    Models,
    Help,
    Quit,
    Invalid { command: String, reason: String },
    Unknown { command: String, arg: String },
}

fn parse_path_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn invalid(command: &str, reason: &str) -> ChatCommand {
    ChatCommand::Invalid {
        command: command.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_photo(arg: &str) -> ChatCommand {
    let mut parts = parse_path_args(arg).into_iter();
    let Some(path) = parts.next() else {
        return invalid("photo", "потрібен шлях до зображення");
    };
    let hint = parts.collect::<Vec<_>>().join(" ");
    ChatCommand::Photo {
        path,
        hint: Some(hint).filter(|value| !value.trim().is_empty()),
    }
}

fn parse_open(arg: &str) -> ChatCommand {
    match arg.trim().parse::<usize>() {
        Ok(number) if number >= 1 => ChatCommand::Open { index: number - 1 },
        _ => invalid("open", "потрібен номер розділу, починаючи з 1"),
    }
}

fn no_arg_command(command: &str) -> Option<ChatCommand> {
    let parsed = match command {
        "similar" => ChatCommand::Similar,
        "expand" => ChatCommand::Expand,
        "collapse" => ChatCommand::Collapse,
        "share" => ChatCommand::Share,
        "reset" => ChatCommand::Reset,
        "retry" => ChatCommand::Retry,
        "status" => ChatCommand::Status,
        "models" => ChatCommand::Models,
        "help" => ChatCommand::Help,
        "quit" | "exit" => ChatCommand::Quit,
        _ => return None,
    };
    Some(parsed)
}

/// Parses one line of terminal input. Lines without a leading slash are text searches.
pub fn parse_command(text: &str) -> ChatCommand {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return ChatCommand::Noop;
    }

    if let Some(slash_tail) = raw_trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let arg = slash_tail[command_len..].trim();

            match command.as_str() {
                "photo" | "image" => return parse_photo(arg),
                "describe" | "text" => {
                    if arg.is_empty() {
                        return invalid("describe", "потрібен опис");
                    }
                    return ChatCommand::Describe {
                        text: arg.to_string(),
                    };
                }
                "open" => return parse_open(arg),
                _ => {}
            }

            if let Some(parsed) = no_arg_command(&command) {
                return parsed;
            }

            return ChatCommand::Unknown {
                command,
                arg: arg.to_string(),
            };
        }
    }

    ChatCommand::Describe {
        text: raw_trimmed.to_string(),
    }
}
