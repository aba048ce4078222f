use std::path::PathBuf;

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Upload,
    Draft(String),
    Send,
    /// Set the draft to this text and submit it.
    Ask(String),
    Status,
    Help,
    Quit,
    Invalid(String),
    Empty,
}

pub const HELP_TEXT: &str = "\
Commands:
  /open <path>    select a PDF to upload
  /upload         upload the selected PDF
  /draft <text>   set the question without sending it
  /send           send the current draft
  /status         show the current session
  /help           show this help
  /quit           leave
Any other line is sent as a question. Start a line with // to ask something beginning with /.";

pub fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Command::Empty;
    }
    if let Some(escaped) = line.strip_prefix("//") {
        return Command::Ask(format!("/{escaped}"));
    }
    let Some(command) = line.strip_prefix('/') else {
        return Command::Ask(line.to_string());
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    match name {
        "open" if rest.is_empty() => Command::Invalid("usage: /open <path>".to_string()),
        "open" => Command::Open(PathBuf::from(rest)),
        "upload" => Command::Upload,
        "draft" => Command::Draft(rest.to_string()),
        "send" => Command::Send,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command /{other}; try /help")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_questions_kept_verbatim() {
        assert_eq!(
            parse_line("  What is this about?  \n"),
            Command::Ask("  What is this about?  ".to_string())
        );
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(parse_line(""), Command::Empty);
        assert_eq!(parse_line("   \r\n"), Command::Empty);
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(
            parse_line("/open ./papers/My Paper.pdf"),
            Command::Open(PathBuf::from("./papers/My Paper.pdf"))
        );
        assert_eq!(
            parse_line("/draft Summarize section 1"),
            Command::Draft("Summarize section 1".to_string())
        );
        assert_eq!(parse_line("/draft"), Command::Draft(String::new()));
    }

    #[test]
    fn bare_commands() {
        assert_eq!(parse_line("/upload"), Command::Upload);
        assert_eq!(parse_line("/send"), Command::Send);
        assert_eq!(parse_line("/status"), Command::Status);
        assert_eq!(parse_line("/?"), Command::Help);
        assert_eq!(parse_line("/exit"), Command::Quit);
    }

    #[test]
    fn open_needs_a_path() {
        assert!(matches!(parse_line("/open   "), Command::Invalid(_)));
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(
            parse_line("/frobnicate now"),
            Command::Invalid("unknown command /frobnicate; try /help".to_string())
        );
    }

    #[test]
    fn double_slash_escapes_a_question() {
        assert_eq!(
            parse_line("//etc/hosts explained?"),
            Command::Ask("/etc/hosts explained?".to_string())
        );
    }
}
