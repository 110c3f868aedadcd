/// A position in Hawk source code. Lines and columns are 1-based, matching what editors display; The offset is a 0-based byte
/// index into the source string, which is what the diagnostic renderer uses to measure underline widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePos {
	/// The 1-based line number.
	pub line: usize,
	/// The 1-based column number. Tabs advance this by 3 columns; see the tokenizer for the full accounting rules.
	pub column: usize,
	/// The 0-based byte offset into the source string.
	pub offset: usize,
}

impl SourcePos {
	/// Returns the position of the very first character of a source file: line 1, column 1, offset 0.
	#[must_use]
	pub const fn start() -> Self {
		Self { line: 1, column: 1, offset: 0 }
	}
}

impl std::fmt::Display for SourcePos {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line, self.column)
	}
}

/// A half-open region of source code. `start` points at the first character of the region and `end` points one past the
/// last character, so `end.offset - start.offset` is the region's width in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	/// The position of the first character of the region.
	pub start: SourcePos,
	/// The position one past the last character of the region.
	pub end: SourcePos,
}

impl Span {
	/// Creates a span covering the given two positions.
	#[must_use]
	pub const fn new(start: SourcePos, end: SourcePos) -> Self {
		Self { start, end }
	}

	/// Creates an empty span at the very start of a source file. This is used as the reported position for errors that
	/// have no better anchor, such as an unexpected end of input in an empty file.
	#[must_use]
	pub const fn at_start() -> Self {
		Self {
			start: SourcePos::start(),
			end: SourcePos::start(),
		}
	}

	/// Returns the span from the start of this span to the end of the other one. Parsers use this to build a parent
	/// node's span out of its first and last tokens.
	#[must_use]
	pub const fn to(self, other: Self) -> Self {
		Self {
			start: self.start,
			end: other.end,
		}
	}

	/// Returns whether the other span lies entirely within this one. Every node of a well-formed syntax tree contains
	/// the spans of all of its children.
	#[must_use]
	pub fn contains(&self, other: &Self) -> bool {
		self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
	}
}

impl std::fmt::Display for Span {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}..{}", self.start, self.end)
	}
}
