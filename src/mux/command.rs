//! Structured argument lists.

use std::fmt;
use std::path::Path;

/// One argument of a muxer command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Emitted verbatim.
    Arg(String),
    /// A path or free text, double-quoted in the literal form.
    Quoted(String),
    /// A fixed prefix followed by a value that is double-quoted in the
    /// literal form, e.g. `title="Episode 1"` or `0:"Japanese"`.
    Labeled { prefix: String, value: String },
}

impl Token {
    /// The argument as the process receives it.
    pub fn raw(&self) -> String {
        match self {
            Self::Arg(s) | Self::Quoted(s) => s.clone(),
            Self::Labeled { prefix, value } => format!("{prefix}{value}"),
        }
    }

    /// The argument as written on a shell-like command line.
    pub fn literal(&self) -> String {
        match self {
            Self::Arg(s) => s.clone(),
            Self::Quoted(s) => quote(s),
            Self::Labeled { prefix, value } => format!("{prefix}{}", quote(value)),
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

/// Ordered token sequence for one muxer invocation.
///
/// # Example
///
/// ```
/// use muxsync::mux::CommandLine;
///
/// let mut cmd = CommandLine::new();
/// cmd.arg("-i").path("/media/ep 01.mkv").arg("-c:v").arg("copy");
///
/// assert_eq!(cmd.render(), r#"-i "/media/ep 01.mkv" -c:v copy"#);
/// assert_eq!(cmd.to_args()[1], "/media/ep 01.mkv");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<Token>,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a verbatim argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.tokens.push(Token::Arg(s.into()));
        self
    }

    /// Append several verbatim arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.tokens
            .extend(iter.into_iter().map(|s| Token::Arg(s.into())));
        self
    }

    /// Append a quoted argument.
    pub fn quoted(&mut self, s: impl Into<String>) -> &mut Self {
        self.tokens.push(Token::Quoted(s.into()));
        self
    }

    /// Append a file path.
    pub fn path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.quoted(path.as_ref().to_string_lossy())
    }

    /// Append `prefix` followed by a quoted `value`.
    pub fn labeled(&mut self, prefix: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tokens.push(Token::Labeled {
            prefix: prefix.into(),
            value: value.into(),
        });
        self
    }

    /// Move every token of `other` to the end of this command.
    pub fn append(&mut self, other: CommandLine) -> &mut Self {
        self.tokens.extend(other.tokens);
        self
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Argument vector handed to the process.
    pub fn to_args(&self) -> Vec<String> {
        self.tokens.iter().map(Token::raw).collect()
    }

    /// Space-joined literal form.
    pub fn render(&self) -> String {
        self.tokens
            .iter()
            .map(Token::literal)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `true` if `flag` is directly followed by `value`.
    pub fn has_pair(&self, flag: &str, value: &str) -> bool {
        self.tokens
            .windows(2)
            .any(|pair| pair[0].raw() == flag && pair[1].raw() == value)
    }

    /// `true` if any token's raw form equals `arg`.
    pub fn contains(&self, arg: &str) -> bool {
        self.tokens.iter().any(|t| t.raw() == arg)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
