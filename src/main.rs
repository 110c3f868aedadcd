//! # Hawk
//!
//! A miniature language toolchain: a compiler that translates nested `let`-`do` expressions into a position-independent
//! stack bytecode, and the stack virtual machine that executes it.
//!
//! ## Installation
//!
//! Hawk can be installed cross-platform with Cargo:
//!
//! ```bash
//! cargo install hawk-language
//! ```

/// The codegen module, which walks a resolved syntax tree and emits the bytecode packet, keeping a compile-time model
/// of the runtime stack to turn variable names into offsets.
pub mod codegen;

/// The compiler module, which drives the pipeline end to end: tokenize, parse, resolve, infer, generate, run.
pub mod compiler;

/// The config module, which reads the optional `hawk.toml` compiler options file.
pub mod config;

/// The context module, which manages global state of the compiler.
pub mod context;

/// The cursor module, which wraps the token stream in a reader with restore points for the parser's speculation.
pub mod cursor;

/// The diagnostics module, which collects and renders the errors a compilation produces.
pub mod diagnostics;

/// The formatter module. This handles code formatting for Hawk code. The process is fairly straightforward; The code is
/// parsed and then the AST is recursively turned back into Hawk code. Essentially, it's a transpiler into itself.
pub mod formatter;

/// The inference module, which gives every binding a type by following the references in its initializer.
pub mod inference;

/// The lexer module, which tokenizes source code into a stream of tokens.
pub mod lexer;

/// The parser module, which parses a stream of tokens into an abstract syntax tree.
pub mod parser;

/// The resolver module, which checks every name against the lexical scope structure.
pub mod resolver;

/// The scopes module, which manages the scope of variables.
pub mod scopes;

/// The span module, which defines source positions and regions.
pub mod span;

/// The typemap module, which stores what the type inferencer learns about each binding.
pub mod typemap;

/// The vm module: the stack virtual machine that executes compiled bytecode.
pub mod vm;

/// Bring the `Parser` trait into scope from `clap`, which allows parsing argument structs from the command line. We assign it to underscore to indicate
/// clearly that it's not used outside of bringing its trait methods into scope.
use clap::Parser as _;

/// The command-line arguments for the compiler.
#[derive(clap::Parser)]
pub struct HawkCompilerArguments {
	/// The file to run: a `.hawk` source file, which is compiled and then executed, or a `.bc` bytecode file, which is
	/// executed directly. Compiling a source file also writes its bytecode next to it with the `.bc` extension.
	pub path: Option<std::path::PathBuf>,

	/// Stop after the given compiler stage and print its debug dump instead of running the program.
	#[arg(short, long, value_enum)]
	pub debug: Option<compiler::DebugStage>,
}

/// The main entry point for the Hawk toolchain. This parses the arguments passed at the command-line and runs the
/// given file. Invoking the binary with no file at all is not an error; It simply does nothing.
fn main() -> anyhow::Result<()> {
	let arguments = HawkCompilerArguments::parse();
	let Some(path) = arguments.path else {
		return Ok(());
	};
	compiler::run_file(&path, arguments.debug)
}
