use crate::{
	lexer::{Token, TokenType},
	span::Span,
};

/// A linear reader over the token stream produced by the lexer. The cursor supports peeking, advancing, and a stack of
/// saved restore points, which is what lets the parser speculatively descend into an alternative and back out again
/// when it doesn't match.
#[derive(Debug)]
pub struct TokenCursor {
	/// The tokens being read, in source order.
	tokens: Vec<Token>,
	/// The index of the next token to be returned.
	index: usize,
	/// The stack of saved restore points. `checkpoint` pushes the current index, `restore` pops one and rewinds to it,
	/// and `commit` pops one without rewinding.
	checkpoints: Vec<usize>,
}

impl TokenCursor {
	/// Creates a cursor positioned at the first of the given tokens.
	#[must_use]
	pub const fn new(tokens: Vec<Token>) -> Self {
		Self {
			tokens,
			index: 0,
			checkpoints: Vec::new(),
		}
	}

	/// Returns a reference to the next token without advancing past it, or `None` at the end of the stream.
	#[must_use]
	pub fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.index)
	}

	/// Returns a reference to the next token and advances past it, or `None` at the end of the stream.
	pub fn advance(&mut self) -> Option<&Token> {
		let token = self.tokens.get(self.index);
		if token.is_some() {
			self.index += 1;
		}
		token
	}

	/// Returns whether the next token exists and has the given type.
	#[must_use]
	pub fn next_is(&self, token_type: TokenType) -> bool {
		self.peek().is_some_and(|token| token.token_type == token_type)
	}

	/// Returns whether the next token is an identifier with exactly the given text. This is how the parser checks for
	/// the `let` and `do` keywords, which are ordinary identifier tokens.
	#[must_use]
	pub fn next_is_identifier(&self, text: &str) -> bool {
		self.peek().is_some_and(|token| token.is_identifier(text))
	}

	/// Saves the current position onto the restore-point stack. Every `checkpoint` must be matched by exactly one
	/// `restore` or `commit`.
	pub fn checkpoint(&mut self) {
		self.checkpoints.push(self.index);
	}

	/// Pops the most recent restore point and rewinds the cursor to it. Used when a speculative descent didn't match.
	pub fn restore(&mut self) {
		if let Some(saved) = self.checkpoints.pop() {
			self.index = saved;
		}
	}

	/// Pops the most recent restore point without moving the cursor. Used when a speculative descent matched and its
	/// consumed tokens should stay consumed.
	pub fn commit(&mut self) {
		self.checkpoints.pop();
	}

	/// Returns a span for "here" suitable for diagnostics: the next token's span, or an empty span just past the last
	/// token when the stream is exhausted.
	#[must_use]
	pub fn here(&self) -> Span {
		self.peek().map_or_else(
			|| {
				self.tokens.last().map_or_else(Span::at_start, |last| Span {
					start: last.span.end,
					end: last.span.end,
				})
			},
			|token| token.span,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{context::Context, lexer::tokenize};

	fn cursor_over(code: &str) -> TokenCursor {
		let mut context = Context::new("test.hawk", code);
		TokenCursor::new(tokenize(code, &mut context))
	}

	#[test]
	fn advance_walks_the_stream_and_stops_at_the_end() {
		let mut cursor = cursor_over("a = 5");
		assert_eq!(cursor.advance().map(|token| token.value.clone()), Some("a".to_owned()));
		assert_eq!(cursor.advance().map(|token| token.value.clone()), Some("=".to_owned()));
		assert_eq!(cursor.advance().map(|token| token.value.clone()), Some("5".to_owned()));
		assert!(cursor.advance().is_none());
		assert!(cursor.peek().is_none());
	}

	#[test]
	fn peek_does_not_advance() {
		let mut cursor = cursor_over("a b");
		assert_eq!(cursor.peek().map(|token| token.value.clone()), Some("a".to_owned()));
		assert_eq!(cursor.peek().map(|token| token.value.clone()), Some("a".to_owned()));
		cursor.advance();
		assert_eq!(cursor.peek().map(|token| token.value.clone()), Some("b".to_owned()));
	}

	#[test]
	fn restore_rewinds_to_the_matching_checkpoint() {
		let mut cursor = cursor_over("a b c d");
		cursor.advance();
		cursor.checkpoint();
		cursor.advance();
		cursor.checkpoint();
		cursor.advance();
		cursor.restore();
		assert_eq!(cursor.peek().map(|token| token.value.clone()), Some("c".to_owned()));
		cursor.restore();
		assert_eq!(cursor.peek().map(|token| token.value.clone()), Some("b".to_owned()));
	}

	#[test]
	fn commit_keeps_the_position() {
		let mut cursor = cursor_over("a b c");
		cursor.checkpoint();
		cursor.advance();
		cursor.advance();
		cursor.commit();
		assert_eq!(cursor.peek().map(|token| token.value.clone()), Some("c".to_owned()));
		// A later restore must not fall back to the committed point.
		cursor.restore();
		assert_eq!(cursor.peek().map(|token| token.value.clone()), Some("c".to_owned()));
	}

	#[test]
	fn keyword_peeking_matches_identifier_text() {
		let cursor = cursor_over("do a");
		assert!(cursor.next_is_identifier("do"));
		assert!(!cursor.next_is_identifier("let"));
		assert!(cursor.next_is(TokenType::Identifier));
	}

	#[test]
	fn here_points_past_the_last_token_at_the_end() {
		let mut cursor = cursor_over("ab");
		cursor.advance();
		let here = cursor.here();
		assert_eq!(here.start.offset, 2);
		assert_eq!(here.end.offset, 2);
	}
}
