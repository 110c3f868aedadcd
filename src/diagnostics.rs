use crate::span::Span;

/// An error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	/// An error message. Any diagnostic of this severity halts the pipeline at the next stage boundary.
	Error,

	/// A note attached to an error, pointing at a second location that explains it. Notes never appear on their own;
	/// They are pushed immediately after the error they belong to.
	Note,
}

impl std::fmt::Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Error => write!(f, "Error"),
			Self::Note => write!(f, "Note"),
		}
	}
}

/// A single diagnostic produced by some stage of the compiler. Diagnostics carry the span of the offending source region
/// so that they can be rendered with a snippet of the line and an underline marking the exact characters.
#[derive(Debug, Clone)]
pub struct Diagnostic {
	/// The severity of the diagnostic.
	pub severity: Severity,
	/// The human-readable message.
	pub message: String,
	/// The region of source code the diagnostic refers to.
	pub span: Span,
}

impl Diagnostic {
	/// Renders this diagnostic as plain text: a header line of the form `<line>:<col> - <message>`, followed by the
	/// source line it occurred on, followed by an underline of tildes covering the diagnostic's span.
	///
	/// # Parameters
	/// - `source` - The full source text the diagnostic's span points into.
	///
	/// # Returns
	/// The rendered diagnostic, without a trailing newline.
	#[must_use]
	pub fn render(&self, source: &str) -> String {
		let header = format!("{}:{} - {}", self.span.start.line, self.span.start.column, self.message);
		let line = source.lines().nth(self.span.start.line - 1).unwrap_or_default();
		let indent = " ".repeat(self.span.start.column - 1);
		let underline = "~".repeat(self.span.end.offset.saturating_sub(self.span.start.offset));
		format!("{header}\n{line}\n{indent}{underline}")
	}
}

/// The accumulated diagnostics of a single compiler run. Every stage pushes into the same list, and the pipeline driver
/// checks it between stages; A non-empty list halts compilation at the next stage boundary.
#[derive(Debug, Default)]
pub struct DiagnosticList {
	/// The diagnostics pushed so far, in the order they were produced.
	diagnostics: Vec<Diagnostic>,
}

impl DiagnosticList {
	/// Creates a new, empty diagnostic list.
	#[must_use]
	pub const fn new() -> Self {
		Self { diagnostics: Vec::new() }
	}

	/// Pushes an error diagnostic with the given message and span.
	pub fn error(&mut self, message: impl Into<String>, span: Span) {
		self.diagnostics.push(Diagnostic {
			severity: Severity::Error,
			message: message.into(),
			span,
		});
	}

	/// Pushes a note diagnostic with the given message and span. Notes accompany the error pushed just before them.
	pub fn note(&mut self, message: impl Into<String>, span: Span) {
		self.diagnostics.push(Diagnostic {
			severity: Severity::Note,
			message: message.into(),
			span,
		});
	}

	/// Returns whether any diagnostic of severity `Error` has been pushed.
	#[must_use]
	pub fn has_errors(&self) -> bool {
		self.diagnostics.iter().any(|diagnostic| diagnostic.severity == Severity::Error)
	}

	/// Returns whether the list contains no diagnostics at all.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.diagnostics.is_empty()
	}

	/// Returns the number of diagnostics in the list.
	#[must_use]
	pub fn len(&self) -> usize {
		self.diagnostics.len()
	}

	/// Returns an iterator over the diagnostics in the order they were produced.
	pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
		self.diagnostics.iter()
	}
}

impl<'list> IntoIterator for &'list DiagnosticList {
	type IntoIter = std::slice::Iter<'list, Diagnostic>;
	type Item = &'list Diagnostic;

	fn into_iter(self) -> Self::IntoIter {
		self.diagnostics.iter()
	}
}
