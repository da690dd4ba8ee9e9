//! Build diagnostics
//!
//! Recoverable problems found while assembling or translating a document are
//! reported as [`Diagnostic`]s instead of errors. Every diagnostic is also
//! emitted through `tracing` when it is recorded, so a CLI run shows it even
//! if the caller never inspects the collection.

use serde::{Deserialize, Serialize};

/// Inclusion skipped because the document was already inlined
pub const CODE_ALREADY_INCLUDED: &str = "W0001";
/// Inclusion skipped because the document could not be loaded
pub const CODE_MISSING_INCLUSION: &str = "W0002";
/// Output document could not be written
pub const CODE_WRITE_FAILED: &str = "W0003";

/// A diagnostic message
///
/// # Example
///
/// ```
/// use treedocx_core::diagnostics::{Diagnostic, Severity};
///
/// let diag = Diagnostic::warning("toctree references a missing document: api")
///     .with_code("W0002")
///     .with_file("index")
///     .with_help("Check the toctree entries of index");
///
/// assert_eq!(diag.severity, Severity::Warning);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level of the diagnostic
    pub severity: Severity,

    /// The diagnostic message
    pub message: String,

    /// Optional warning code (e.g., "W0001")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Document the issue was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Additional help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress information
    Info,

    /// Recoverable problem; output is still produced
    Warning,

    /// The current output document is incomplete
    Error,

    /// Processing stopped
    Fatal,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            file: None,
            help: None,
            notes: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Check if this is an error-level diagnostic
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Fatal)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }

    /// Forward this diagnostic to the `tracing` subscriber
    pub fn emit(&self) {
        let code = self.code.as_deref().unwrap_or("-");
        let file = self.file.as_deref().unwrap_or("-");
        match self.severity {
            Severity::Info => tracing::info!(code, file, "{}", self.message),
            Severity::Warning => tracing::warn!(code, file, "{}", self.message),
            Severity::Error | Severity::Fatal => tracing::error!(code, file, "{}", self.message),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: severity[code]: message
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;

        if let Some(ref file) = self.file {
            write!(f, "\n  --> {}", file)?;
        }
        if let Some(ref help) = self.help {
            write!(f, "\n  = help: {}", help)?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {}", note)?;
        }

        Ok(())
    }
}

/// A collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it through `tracing`
    pub fn push(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    /// Number of diagnostics carrying the given code
    pub fn count_code(&self, code: &str) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.code.as_deref() == Some(code))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::warning("toctree references a missing document: api")
            .with_code(CODE_MISSING_INCLUSION)
            .with_file("index")
            .with_help("Check the toctree entries");

        assert!(diag.is_warning());
        assert!(!diag.is_error());
        assert_eq!(diag.code.as_deref(), Some("W0002"));
        assert_eq!(diag.file.as_deref(), Some("index"));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_display_format() {
        let diag = Diagnostic::warning("skipped")
            .with_code("W0001")
            .with_file("chapter")
            .with_note("already included from index");
        let text = diag.to_string();
        assert!(text.starts_with("warning[W0001]: skipped"));
        assert!(text.contains("--> chapter"));
        assert!(text.contains("= note: already included from index"));
    }

    #[test]
    fn test_collection_counts() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning("a").with_code(CODE_ALREADY_INCLUDED));
        diags.push(Diagnostic::warning("b").with_code(CODE_MISSING_INCLUSION));
        diags.push(Diagnostic::error("c"));

        assert!(diags.has_errors());
        assert_eq!(diags.warning_count(), 2);
        assert_eq!(diags.count_code(CODE_ALREADY_INCLUDED), 1);
        assert_eq!(diags.len(), 3);
    }

    #[test]
    fn test_json_serialization() {
        let diag = Diagnostic::warning("skipped").with_code("W0001");
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(!json.contains("help"));
    }
}
