//! User-facing diagnostic messages.
//!
//! Every fatal build error is rendered with its root cause, the context that
//! led to it, and the fixes most likely to help.

use std::fmt;

/// Common suggestion messages.
pub mod suggestions {
    /// MeCab's development files are missing.
    pub const INSTALL_MECAB: &str =
        "Install the MeCab development package (e.g. `libmecab-dev` or `mecab` from Homebrew)";

    /// The query tool lives outside PATH.
    pub const CONFIG_TOOL_PATH: &str =
        "Point `build.config-tool` in .mecab-build/config.toml at the mecab-config executable";

    /// The compiler is too old.
    pub const UPGRADE_COMPILER: &str =
        "Install a C++11 capable compiler and select it with the CXX environment variable";

    /// The binding headers are missing or outdated.
    pub const INSTALL_PYBIND11: &str = "Run `python3 -m pip install 'pybind11>=2.2'`";

    /// Verbose output shows every command.
    pub const RERUN_VERBOSE: &str = "Run `mecab-build build --verbose` to see every command";
}

/// An error message with optional context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let label = if color {
            "\x1b[1;31merror\x1b[0m"
        } else {
            "error"
        };
        output.push_str(&format!("{}: {}\n", label, self.message));

        for ctx in &self.context {
            for line in ctx.lines() {
                output.push_str(&format!("  | {}\n", line));
            }
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("`mecab-config` not found")
            .with_context("searched PATH for mecab-config")
            .with_suggestion(suggestions::INSTALL_MECAB)
            .with_suggestion(suggestions::CONFIG_TOOL_PATH);

        let output = diag.format(false);
        assert!(output.starts_with("error: `mecab-config` not found"));
        assert!(output.contains("  | searched PATH"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Install the MeCab development package"));
        assert!(output.contains("2. Point `build.config-tool`"));
    }

    #[test]
    fn multiline_context_is_indented() {
        let diag = Diagnostic::error("compiler output").with_context("line one\nline two");
        let output = diag.to_string();
        assert!(output.starts_with("error: compiler output"));
        assert!(output.contains("  | line one\n  | line two\n"));
    }
}
