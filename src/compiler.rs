use colored::Colorize as _;

use crate::{
	codegen::{disassemble, CodeGenerator},
	config::Config,
	context::Context,
	cursor::TokenCursor,
	formatter::ToHawk as _,
	inference, lexer, parser, resolver,
	vm::VirtualMachine,
};

use std::path::Path;

/// A compiler stage whose result can be dumped for inspection. Passing one of these on the command line stops the
/// pipeline after that stage and prints the dump instead of running the program.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugStage {
	/// Dump the abstract syntax tree after parsing.
	Ast,
	/// Dump the symbol table after symbol resolution.
	Symtab,
	/// Dump the typemap after type inference.
	Tymap,
}

/// Runs the file at the given path, dispatching on its extension: `.hawk` files are compiled and executed (and the
/// bytecode written next to them), `.bc` files are executed directly, and anything else is reported and skipped.
///
/// A compile that produced diagnostics prints them and returns successfully; Diagnostics are the compiler doing its
/// job, not failing at it. Errors are reserved for the environment (unreadable files) and the virtual machine.
pub fn run_file(path: &Path, debug: Option<DebugStage>) -> anyhow::Result<()> {
	let extension = path.extension().and_then(|extension| extension.to_str()).unwrap_or_default();
	match extension {
		"hawk" => run_source_file(path, debug),

		"bc" => {
			let bytecode = std::fs::read(path).map_err(|error| anyhow::anyhow!("Couldn't read \"{}\": {error}", path.display()))?;
			let value = VirtualMachine::new(bytecode).run()?;
			println!("{value}");
			Ok(())
		},

		other => {
			println!("Unrecognized extension: {other}");
			Ok(())
		},
	}
}

fn run_source_file(path: &Path, debug: Option<DebugStage>) -> anyhow::Result<()> {
	let source = std::fs::read_to_string(path).map_err(|error| anyhow::anyhow!("Couldn't read \"{}\": {error}", path.display()))?;
	let mut context = Context::new(path.display().to_string(), source);
	context.config = Config::load();

	if !context.config.quiet() {
		println!("{} {}...", "Compiling".bold().green(), context.file_name.bold());
	}

	let Some(bytecode) = compile(&mut context, debug)? else {
		print_diagnostics(&context);
		return Ok(());
	};

	if context.config.cache_bytecode() {
		let cache_path = path.with_extension("bc");
		std::fs::write(&cache_path, &bytecode).map_err(|error| anyhow::anyhow!("Couldn't write \"{}\": {error}", cache_path.display()))?;
	}

	if context.config.developer_mode() {
		println!("\n{}\n{}", "Bytecode:".bold().purple(), disassemble(&bytecode)?);
	}

	let value = VirtualMachine::new(bytecode).run()?;
	println!("{value}");
	Ok(())
}

/// Compiles the source held by the given context into a bytecode packet, running each stage in order and stopping at
/// the first stage boundary where the diagnostic list is no longer empty.
///
/// # Parameters
/// - `context` - The compilation context holding the source, configuration, and diagnostic list.
/// - `debug` - An optional stage to stop after and dump.
///
/// # Returns
/// The bytecode packet, or `None` when compilation stopped early, either because a stage produced diagnostics (the
/// context says which) or because a debug dump was requested.
pub fn compile(context: &mut Context, debug: Option<DebugStage>) -> anyhow::Result<Option<Vec<u8>>> {
	// The stages borrow the context mutably for their diagnostics, so they can't borrow the source from it at the
	// same time.
	let source = context.source.clone();

	let tokens = lexer::tokenize(&source, context);
	stage_line(context, "Tokenizing", "source code");
	if context.diagnostics.has_errors() {
		return Ok(None);
	}

	let mut tokens = TokenCursor::new(tokens);
	let ast = match parser::parse(&mut tokens, context) {
		Ok(Some(ast)) => ast,
		Ok(None) => {
			stage_line(context, "Parsing", "token stream");
			return Ok(None);
		},
		Err(error) => {
			stage_line(context, "Parsing", "token stream");
			if context.diagnostics.has_errors() {
				return Ok(None);
			}
			return Err(error);
		},
	};
	stage_line(context, "Parsing", "token stream");
	if context.diagnostics.has_errors() {
		return Ok(None);
	}
	if debug == Some(DebugStage::Ast) {
		println!("{}", ast.dump());
		println!("{}", ast.to_hawk());
		return Ok(None);
	}

	resolver::resolve(&ast, context)?;
	stage_line(context, "Resolving", "symbols");
	if context.diagnostics.has_errors() {
		return Ok(None);
	}
	if debug == Some(DebugStage::Symtab) {
		println!("{}", context.scopes.dump());
		return Ok(None);
	}

	let typemap = inference::infer(&ast, context)?;
	stage_line(context, "Inferring", "types");
	if context.diagnostics.has_errors() {
		return Ok(None);
	}
	if debug == Some(DebugStage::Tymap) {
		println!("{}", typemap.dump());
		return Ok(None);
	}

	let mut generator = CodeGenerator::new();
	match generator.generate(&ast, context) {
		Ok(bytecode) => {
			stage_line(context, "Generating", "bytecode");
			Ok(Some(bytecode))
		},
		Err(error) => {
			stage_line(context, "Generating", "bytecode");
			if context.diagnostics.has_errors() {
				return Ok(None);
			}
			Err(error)
		},
	}
}

/// Prints one progress line for a finished stage, unless the configuration asks for quiet.
fn stage_line(context: &Context, action: &str, object: &str) {
	if context.config.quiet() {
		return;
	}
	if context.diagnostics.has_errors() {
		println!("    {} {object}... {}", action.bold().green(), "Error!".bold().red());
	} else {
		println!("    {} {object}... {}", action.bold().green(), "Done!".bold().green());
	}
}

/// Prints every accumulated diagnostic to standard output, rendered with its source snippet.
fn print_diagnostics(context: &Context) {
	if context.diagnostics.is_empty() {
		return;
	}
	println!();
	for diagnostic in &context.diagnostics {
		println!("{}\n", diagnostic.render(&context.source));
	}
}
