use crate::{config::Config, diagnostics::DiagnosticList, scopes::SymbolTable};

/// Data about the current state of the compiler. This is a single-instance context variable that is passed to all
/// parts of the compiler. This allows different, far apart parts of the program to communicate with one another, and
/// it is where the diagnostics of a run accumulate.
pub struct Context {
	/// The name of the file that the compiler is currently compiling. Diagnostics print this; Positions inside the
	/// file don't repeat it because a run only ever compiles one file.
	pub file_name: String,

	/// The full source text being compiled. The diagnostic renderer slices line snippets out of this.
	pub source: String,

	/// The diagnostics produced so far. The pipeline driver checks this after every stage and halts compilation as
	/// soon as it contains an error.
	pub diagnostics: DiagnosticList,

	/// The symbol table. The resolver builds it; Later passes re-enter its scopes in the same order instead of
	/// rebuilding them.
	pub scopes: SymbolTable,

	/// The compiler options for this run, read from an optional `hawk.toml`.
	pub config: Config,
}

impl Context {
	/// Creates a new `Context` for compiling the given source text.
	///
	/// # Parameters
	/// - `file_name` - The name of the file being compiled, used in terminal output.
	/// - `source` - The full source text of the file.
	///
	/// # Returns
	/// A new `Context` instance with no diagnostics, an empty symbol table, and default configuration.
	#[must_use]
	pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
		Self {
			file_name: file_name.into(),
			source: source.into(),
			diagnostics: DiagnosticList::new(),
			scopes: SymbolTable::new(),
			config: Config::default(),
		}
	}
}
