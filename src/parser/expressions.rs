use crate::{
	context::Context,
	cursor::TokenCursor,
	lexer::{Token, TokenType},
	parse_error,
	parser::{
		ast::{AstKind, AstNode, NodeData},
		statements::{found, LetParser},
		Parse,
	},
};

/// Parses an expression: an integer literal, a variable reference, a binary operation, or a nested `let` block.
///
/// The grammar gives all four operators a single precedence level and groups them to the right, so `a + b * c` parses
/// as `a + (b * c)` and `a - b - c` parses as `a - (b - c)`. The rule works by speculation: after consuming an atom it
/// saves a restore point and attempts a binary continuation, committing the continuation if it matches and rewinding
/// to the bare atom if it doesn't. An identifier additionally speculates on a nested `let` first, since `let` is
/// itself just an identifier token.
pub struct ExpressionParser;

impl Parse for ExpressionParser {
	type Output = AstNode;

	fn parse(tokens: &mut TokenCursor, context: &mut Context, can_fail: bool) -> anyhow::Result<Option<Self::Output>> {
		match tokens.peek().map(|token| token.token_type.clone()) {
			Some(TokenType::Integer) => {
				let token = tokens.advance().cloned().unwrap_or_else(|| unreachable!());
				tokens.checkpoint();
				match binary_continuation(tokens, context, &token)? {
					Some(expression) => {
						tokens.commit();
						Ok(Some(expression))
					},
					None => {
						tokens.restore();
						Ok(Some(atom(&token)?))
					},
				}
			},

			Some(TokenType::Identifier) => {
				// A nested `let` first; Its keyword is an ordinary identifier, so this has to be speculative.
				tokens.checkpoint();
				if let Some(nested) = LetParser::parse(tokens, context, true)? {
					tokens.commit();
					return Ok(Some(nested));
				}
				tokens.restore();

				let token = tokens.advance().cloned().unwrap_or_else(|| unreachable!());
				tokens.checkpoint();
				match binary_continuation(tokens, context, &token)? {
					Some(expression) => {
						tokens.commit();
						Ok(Some(expression))
					},
					None => {
						tokens.restore();
						Ok(Some(atom(&token)?))
					},
				}
			},

			_ => parse_error!(context, can_fail, tokens.here(), "Expected an expression but found {}", found(tokens)),
		}
	}
}

/// Attempts to parse a binary continuation after an already-consumed atom token: one operator token followed by a full
/// expression as the right operand. Failure is always tolerated here; The caller holds the restore point and falls
/// back to the bare atom.
fn binary_continuation(tokens: &mut TokenCursor, context: &mut Context, left_token: &Token) -> anyhow::Result<Option<AstNode>> {
	let Some(kind) = tokens.peek().and_then(|token| binary_kind(&token.token_type)) else {
		return Ok(None);
	};
	tokens.advance();

	// The right operand recurses into the full expression rule, which is what makes every operator right-associative.
	let Some(right) = ExpressionParser::parse(tokens, context, true)? else {
		return Ok(None);
	};

	let left = atom(left_token)?;
	let span = left.span.to(right.span);
	Ok(Some(AstNode {
		kind,
		children: vec![left, right],
		data: None,
		span,
	}))
}

/// Returns the binary-operator node kind for the given token type, if it is an operator token.
const fn binary_kind(token_type: &TokenType) -> Option<AstKind> {
	match token_type {
		TokenType::Plus => Some(AstKind::BinaryPlus),
		TokenType::Hyphen => Some(AstKind::BinaryMinus),
		TokenType::Star => Some(AstKind::BinaryMul),
		TokenType::FSlash => Some(AstKind::BinaryDiv),
		_ => None,
	}
}

/// Builds the leaf node for an already-consumed atom token: an `IntLiteral` for an integer token and a `VarRef` for an
/// identifier token.
fn atom(token: &Token) -> anyhow::Result<AstNode> {
	match token.token_type {
		TokenType::Integer => {
			let value = token
				.value
				.parse::<i32>()
				.map_err(|error| anyhow::anyhow!("Internal error: the lexer produced an unparsable integer literal \"{}\": {error}", token.value))?;
			Ok(AstNode {
				kind: AstKind::IntLiteral,
				children: Vec::new(),
				data: Some(NodeData::Integer(value)),
				span: token.span,
			})
		},
		TokenType::Identifier => Ok(AstNode {
			kind: AstKind::VarRef,
			children: Vec::new(),
			data: Some(NodeData::Name(token.value.clone())),
			span: token.span,
		}),
		_ => anyhow::bail!("Internal error: {} is not an atom token", token.token_type),
	}
}
