//! # Report — One Diagnostic Record
//!
//! A report is a severity, a format template with `{}` placeholders, the
//! already-rendered argument snippets, and optionally the document position
//! the message concerns. The [`Report::keys`] and [`Report::values`]
//! helpers standardize how key lists and value lists are rendered into
//! arguments.

use jsonvet_core::Node;
use serde::{Deserialize, Serialize};

/// How serious a diagnostic is.
///
/// Fatals mean the document cannot conform; warnings mean it conforms
/// loosely but is suspicious; info marks successful optional paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Non-breaking information.
    Info,
    /// Suspicious but not necessarily wrong.
    Warning,
    /// The document cannot conform.
    Fatal,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// One diagnostic message with structured arguments.
#[derive(Debug, Clone)]
pub struct Report<'doc> {
    severity: Severity,
    format: String,
    args: Vec<String>,
    context: Option<Node<'doc>>,
}

impl<'doc> Report<'doc> {
    /// Create a report with the given severity.
    pub fn new(severity: Severity, format: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            severity,
            format: format.into(),
            args,
            context: None,
        }
    }

    /// Create an info report.
    pub fn info(format: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(Severity::Info, format, args)
    }

    /// Create a warning report.
    pub fn warning(format: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(Severity::Warning, format, args)
    }

    /// Create a fatal report.
    pub fn fatal(format: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(Severity::Fatal, format, args)
    }

    /// Attach the document position this report concerns.
    pub fn with_context(mut self, node: Node<'doc>) -> Self {
        self.context = Some(node);
        self
    }

    /// The severity of this report.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The format template, with one `{}` per argument.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The already-rendered argument snippets.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The document position this report concerns, if any.
    pub fn context(&self) -> Option<&Node<'doc>> {
        self.context.as_ref()
    }

    /// The completed message after substituting arguments into the
    /// template. Surplus placeholders are left in place.
    pub fn message(&self) -> String {
        let mut parts = self.format.split("{}");
        let mut message = String::new();
        if let Some(first) = parts.next() {
            message.push_str(first);
        }
        let mut args = self.args.iter();
        for part in parts {
            match args.next() {
                Some(arg) => message.push_str(arg),
                None => message.push_str("{}"),
            }
            message.push_str(part);
        }
        message
    }

    /// Render a list of keys as one argument snippet: quoted and
    /// comma-separated.
    pub fn keys<I, S>(keys: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| format!("\"{}\"", key.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render a list of already-stringified values as one argument
    /// snippet: comma-separated.
    pub fn values<I, S>(values: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message())
    }
}
