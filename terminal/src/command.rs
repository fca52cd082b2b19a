//! Commands typed at the feed prompt

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scroll past the last post
    More,
    Retry,
    Refresh,
    Post(String),
    Delete(String),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word.to_lowercase().as_str(), rest) {
            ("" | "more" | "m", _) => Command::More,
            ("retry" | "r", _) => Command::Retry,
            ("refresh", _) => Command::Refresh,
            ("post" | "p", body) if !body.is_empty() => Command::Post(body.to_string()),
            ("delete" | "d", id) if !id.is_empty() => Command::Delete(id.to_string()),
            ("help" | "h" | "?", _) => Command::Help,
            ("quit" | "q" | "exit", _) => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
Commands:
  <enter> | more      load the next page
  retry               retry a failed load
  refresh             reload from the newest post
  post <text>         publish a post
  delete <id>         delete one of your posts
  help                show this help
  quit                leave";
