use crate::{
	context::Context,
	cursor::TokenCursor,
	lexer::TokenType,
	parse_error,
	parser::{
		ast::{AstKind, AstNode, NodeData},
		expressions::ExpressionParser,
		Parse,
	},
};

/// Describes the next token for an "expected X but found Y" message.
pub(crate) fn found(tokens: &TokenCursor) -> String {
	tokens
		.peek()
		.map_or_else(|| "the end of the file".to_owned(), |token| format!("{}", token.token_type))
}

/// Parses a `let` block: the `let` keyword, zero or more variable bindings, and a closing `do` form. This is both the
/// whole-program rule and the rule for nested `let` expressions.
pub struct LetParser;

impl Parse for LetParser {
	type Output = AstNode;

	fn parse(tokens: &mut TokenCursor, context: &mut Context, can_fail: bool) -> anyhow::Result<Option<Self::Output>> {
		if !tokens.next_is_identifier("let") {
			parse_error!(context, can_fail, tokens.here(), "Expected `let` but found {}", found(tokens));
		}
		let keyword_span = tokens.here();
		tokens.advance();

		// Bindings continue until the `do` keyword. Running out of tokens first means the block was never closed.
		let mut children = Vec::new();
		while !tokens.next_is_identifier("do") {
			if tokens.peek().is_none() {
				parse_error!(context, can_fail, tokens.here(), "Expected `do` to close the `let` block but found the end of the file");
			}
			let Some(var) = VarParser::parse(tokens, context, can_fail)? else {
				return Ok(None);
			};
			children.push(var);
		}

		let Some(do_node) = DoParser::parse(tokens, context, can_fail)? else {
			return Ok(None);
		};
		let span = keyword_span.to(do_node.span);
		children.push(do_node);

		Ok(Some(AstNode {
			kind: AstKind::Let,
			children,
			data: None,
			span,
		}))
	}
}

/// Parses a single variable binding: an identifier, an equals sign, and an initializer expression.
pub struct VarParser;

impl Parse for VarParser {
	type Output = AstNode;

	fn parse(tokens: &mut TokenCursor, context: &mut Context, can_fail: bool) -> anyhow::Result<Option<Self::Output>> {
		if !tokens.next_is(TokenType::Identifier) {
			parse_error!(context, can_fail, tokens.here(), "Expected a variable name but found {}", found(tokens));
		}
		let name_span = tokens.here();
		let name = tokens.advance().map(|token| token.value.clone()).unwrap_or_default();

		if !tokens.next_is(TokenType::Equal) {
			parse_error!(context, can_fail, tokens.here(), "Expected {} but found {}", TokenType::Equal, found(tokens));
		}
		tokens.advance();

		let Some(initializer) = ExpressionParser::parse(tokens, context, can_fail)? else {
			return Ok(None);
		};

		let identifier = AstNode {
			kind: AstKind::Identifier,
			children: Vec::new(),
			data: Some(NodeData::Name(name)),
			span: name_span,
		};
		let span = name_span.to(initializer.span);

		Ok(Some(AstNode {
			kind: AstKind::Var,
			children: vec![identifier, initializer],
			data: None,
			span,
		}))
	}
}

/// Parses the body of a `let` block: the `do` keyword and the single expression whose value the block produces.
pub struct DoParser;

impl Parse for DoParser {
	type Output = AstNode;

	fn parse(tokens: &mut TokenCursor, context: &mut Context, can_fail: bool) -> anyhow::Result<Option<Self::Output>> {
		if !tokens.next_is_identifier("do") {
			parse_error!(context, can_fail, tokens.here(), "Expected `do` but found {}", found(tokens));
		}
		let keyword_span = tokens.here();
		tokens.advance();

		let Some(expression) = ExpressionParser::parse(tokens, context, can_fail)? else {
			return Ok(None);
		};
		let span = keyword_span.to(expression.span);

		Ok(Some(AstNode {
			kind: AstKind::Do,
			children: vec![expression],
			data: None,
			span,
		}))
	}
}
