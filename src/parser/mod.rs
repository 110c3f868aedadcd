use crate::{context::Context, cursor::TokenCursor, parser::ast::AstNode, parser::statements::LetParser};

/// The AST module, which defines the nodes of the abstract syntax tree.
pub mod ast;
/// The expressions module, which parses atoms, binary operations, and nested `let` expressions.
pub mod expressions;
/// The statements module, which parses the `let`, variable binding, and `do` forms.
pub mod statements;

/// A trait for parsing a token stream into an abstract syntax tree node using a specific rule.
///
/// Every rule takes a `can_fail` flag. When it is set, a rule that doesn't match produces no diagnostics, rewinds
/// nothing on its own (callers hold the restore point), and returns `Ok(None)`; This is how speculative descents stay
/// silent. When the flag is not set, the first deviation from the rule pushes a diagnostic and returns an error, which
/// halts the pipeline.
pub trait Parse {
	/// The type of abstract syntax tree node that this rule parses into.
	type Output;

	/// Parses a token stream into an abstract syntax tree node using this rule.
	///
	/// # Parameters
	/// - `tokens` - The token cursor to parse from.
	/// - `context` - Global data about the compiler's state, including the diagnostic list.
	/// - `can_fail` - Whether a non-match should be tolerated silently instead of diagnosed.
	///
	/// # Returns
	/// The parsed node, `Ok(None)` for a tolerated non-match, or an error after a diagnosed one.
	fn parse(tokens: &mut TokenCursor, context: &mut Context, can_fail: bool) -> anyhow::Result<Option<Self::Output>>;
}

/// Reports a parse failure the way the current rule's `can_fail` flag demands: a silent `Ok(None)` return when failure
/// is tolerated, or a pushed diagnostic followed by an error return when it isn't.
#[macro_export]
macro_rules! parse_error {
	(
		$context: expr, $can_fail: expr, $span: expr, $($message: tt)+
	) => {{
		if $can_fail {
			return Ok(None);
		}
		let message = format!($($message)+);
		$context.diagnostics.error(message.clone(), $span);
		anyhow::bail!(message);
	}};
}

/// Parses a token stream into an abstract syntax tree. A program is a single `let` block; Anything left over after it
/// is diagnosed as an unexpected token.
///
/// # Parameters
/// - `tokens` - The token cursor to parse from.
/// - `context` - Global data about the compiler's state, including the diagnostic list.
///
/// # Returns
/// The program's root node, or `Ok(None)`/an error when parsing failed (in which case the diagnostics list says why).
pub fn parse(tokens: &mut TokenCursor, context: &mut Context) -> anyhow::Result<Option<AstNode>> {
	let Some(program) = LetParser::parse(tokens, context, false)? else {
		return Ok(None);
	};

	if let Some(extra) = tokens.peek() {
		context
			.diagnostics
			.error(format!("Unexpected token after end of program: {}", extra.token_type), extra.span);
	}

	Ok(Some(program))
}
