use std::fmt;
use std::path::Path;

use tracing::debug;

/// Splits a command string into argument tokens.
///
/// When the whole string names an existing filesystem entry (relative to
/// `cwd` unless absolute), it is returned as one token so that paths with
/// spaces survive, e.g. `/Applications/Visual Studio Code.app`.
pub fn tokenize_command(raw: &str, cwd: &Path) -> Vec<String> {
    if !raw.trim().is_empty() && cwd.join(raw).exists() {
        debug!(command = raw, "command names an existing path; keeping it whole");
        return vec![raw.to_string()];
    }
    split_shell_words(raw)
}

/// Quote-aware whitespace splitting. Quote characters stay in the token;
/// an unterminated quote keeps whatever was accumulated.
pub fn split_shell_words(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut open_quote: Option<char> = None;

    for ch in raw.chars() {
        match ch {
            '"' | '\'' => {
                match open_quote {
                    None => open_quote = Some(ch),
                    Some(quote) if quote == ch => open_quote = None,
                    Some(_) => {}
                }
                current.push(ch);
            }
            ' ' | '\t' if open_quote.is_none() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }

    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '"' => Some(Self::Double),
            '\'' => Some(Self::Single),
            _ => None,
        }
    }
}

/// One argument with a single layer of surrounding quotes lifted off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub quote: Option<Quote>,
}

impl Token {
    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quote: None,
        }
    }

    pub fn parse(raw: &str) -> Self {
        let mut chars = raw.chars();
        if let (Some(first), Some(last)) = (chars.next(), chars.next_back()) {
            if first == last {
                if let Some(quote) = Quote::from_char(first) {
                    return Self {
                        value: raw[1..raw.len() - 1].to_string(),
                        quote: Some(quote),
                    };
                }
            }
        }
        Self::bare(raw)
    }

    pub fn is_quoted(&self) -> bool {
        self.quote.is_some()
    }

    /// Replaces the value, keeping the original quoting. Unquoted values that
    /// now contain whitespace get double quotes.
    pub fn rewritten(&self, value: impl Into<String>) -> Self {
        let value = value.into();
        let quote = match self.quote {
            Some(quote) => Some(quote),
            None if value.chars().any(char::is_whitespace) => Some(Quote::Double),
            None => None,
        };
        Self { value, quote }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quote {
            Some(quote) => {
                let ch = quote.as_char();
                write!(f, "{ch}{}{ch}", self.value)
            }
            None => f.write_str(&self.value),
        }
    }
}

/// A tokenized command; flattened to text only when a launcher is written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandLine {
    tokens: Vec<Token>,
}

impl CommandLine {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn program(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, token) in self.tokens.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}
