//! Interactive session state and the line-command vocabulary.
//!
//! Parsing is pure and the session is immutable: handling `lang` yields a new
//! [`Session`] instead of mutating shared state.

use replidocs_shared::{Query, normalize_language};

/// Per-session settings threaded into each query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    language: String,
}

impl Session {
    pub fn new(language: &str) -> Self {
        Self {
            language: normalize_language(language),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Session after `command`. Only `lang <name>` changes anything.
    pub fn apply(&self, command: &Command) -> Session {
        match command {
            Command::Lang(Some(name)) => Session::new(name),
            _ => self.clone(),
        }
    }

    /// Build the query for a question asked in this session.
    pub fn query(&self, question: &str) -> Query {
        Query::new(&self.language, question)
    }
}

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line.
    Empty,
    Exit,
    /// `lang <name>`; `None` when the name is missing.
    Lang(Option<String>),
    /// `buff <n>`; reserved, not implemented.
    Buff(Option<String>),
    Clear,
    Help,
    /// Anything else: a documentation question.
    Ask(String),
}

impl Command {
    /// Classify a line by its first word (case-insensitive).
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        match head.to_lowercase().as_str() {
            "exit" if arg.is_none() => Command::Exit,
            "clear" if arg.is_none() => Command::Clear,
            "help" if arg.is_none() => Command::Help,
            "lang" => Command::Lang(arg),
            "buff" => Command::Buff(arg),
            _ => Command::Ask(line.to_string()),
        }
    }
}
