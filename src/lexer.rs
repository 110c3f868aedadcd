// Bring the `Casing` trait into scope, which allows us to use `.to_case()` on strings. This is used to convert `TokenType` enum variant names into Title Case,
// which is useful for outputting human-readable errors. We assign this to `as _` to indicate clearly that the trait is not referenced directly and only used
// to bring its methods into scope to be called.
use convert_case::Casing as _;
// Bring the `IntoEnumIterator` trait into scope, which allows us to use `::iter()` on enums that `#[derive(strum_macros::EnumIter)]`. Specifically here, this is used
// on `TokenType` to iterate over the values of the enum to test which one matches a specific string of Hawk code.
use strum::IntoEnumIterator as _;

use crate::{
	context::Context,
	span::{SourcePos, Span},
};

/// A type of token in Hawk source code. The first step in Hawk compilation is tokenization, which is the process of splitting a raw string of source code into
/// "tokens" which each have a "type" representing the kind of token it is, and a "value" representing the string of source code that is associated with it.
///
/// # Conventions
///
/// These token types are named by what the token itself appears as, not the usage in the language. For example, the "`-`" token is not called "minus" or
/// "negate", it is just called `Hyphen`. The names of the tokens are parser-agnostic, meaning they have no "knowledge" of the actual use cases of the
/// token in the language. Notably, `let` and `do` are *not* token types: Hawk's keywords are ordinary `Identifier` tokens whose text the parser matches.
#[derive(strum_macros::EnumIter, PartialEq, Eq, Debug, Clone)]
pub enum TokenType {
	/// An identifier in the language. This is essentially a "name" of a variable. Identifiers start with an ASCII letter, followed by any number of
	/// letters, digits, and underscores. Keywords (`let` and `do`) are tokenized as identifiers; The parser tells them apart by their text.
	Identifier,

	/// The integer token type. Hawk only supports plain decimal runs of digits; There are no sign characters (a leading `-` tokenizes as `Hyphen`), no
	/// separators, and no other bases. The value must fit in a signed 32-bit integer; A run of digits that doesn't produces a diagnostic and aborts
	/// tokenization.
	Integer,

	/// The floating-point token type. This is reserved for a future version of the language and is currently never produced by the tokenizer.
	Float,

	/// The "equal" token type. This is used for variable assignment in `let` bindings.
	Equal,

	/// The "plus" token type. This is used for parsing arithmetic addition expressions.
	Plus,

	/// The "hyphen" token type. This is used for parsing arithmetic subtraction expressions.
	Hyphen,

	/// The "star" token type. This is used for parsing arithmetic multiplication expressions.
	Star,

	/// The "forward slash" token type. This is used for parsing arithmetic division expressions.
	FSlash,

	/// The left parenthesis token type. Not currently used by the grammar.
	LParen,

	/// The left curly brace token type. Not currently used by the grammar.
	LCurly,

	/// The left square bracket token type. Not currently used by the grammar.
	LSquare,

	/// The right parenthesis token type. Not currently used by the grammar.
	RParen,

	/// The right curly brace token type. Not currently used by the grammar.
	RCurly,

	/// The right square bracket token type. Not currently used by the grammar.
	RSquare,

	Semicolon,
	Colon,
	Comma,
	Dot,
	Bang,
	At,
	Hash,
	Dollar,
	Mod,
	Caret,
	Amp,

	/// The underscore token type. Note that this is only produced for a `_` that doesn't continue an identifier; Identifiers may contain underscores
	/// after their first character but may not start with one.
	Underscore,

	Apost,
	Quote,
	LAngle,
	RAngle,
	Question,
	BSlash,
	Pipe,
	Tick,
	Tilde,
}

impl TokenType {
	/// Returns a regular expression pattern that matches the token type. This specifically checks if the given string *starts* with the token type.
	/// The returned value is a lazily-evaluated static, so there is no performance loss to calling this repeatedly. Token types the tokenizer never
	/// produces (currently only `Float`) return `None`.
	fn pattern(&self) -> Option<&'static regex_macro::Regex> {
		Some(match self {
			// Literals and names
			Self::Identifier => regex_macro::regex!("^[A-Za-z][A-Za-z0-9_]*"),
			Self::Integer => regex_macro::regex!("^[0-9]+"),
			Self::Float => return None,

			// Operators
			Self::Equal => regex_macro::regex!("^="),
			Self::Plus => regex_macro::regex!(r"^\+"),
			Self::Hyphen => regex_macro::regex!("^-"),
			Self::Star => regex_macro::regex!(r"^\*"),
			Self::FSlash => regex_macro::regex!("^/"),

			// Left opening groupings
			Self::LParen => regex_macro::regex!(r"^\("),
			Self::LCurly => regex_macro::regex!(r"^\{"),
			Self::LSquare => regex_macro::regex!(r"^\["),

			// Right closing groupings
			Self::RParen => regex_macro::regex!(r"^\)"),
			Self::RCurly => regex_macro::regex!(r"^\}"),
			Self::RSquare => regex_macro::regex!(r"^\]"),

			// Punctuations / Misc
			Self::Semicolon => regex_macro::regex!("^;"),
			Self::Colon => regex_macro::regex!("^:"),
			Self::Comma => regex_macro::regex!("^,"),
			Self::Dot => regex_macro::regex!(r"^\."),
			Self::Bang => regex_macro::regex!("^!"),
			Self::At => regex_macro::regex!("^@"),
			Self::Hash => regex_macro::regex!("^#"),
			Self::Dollar => regex_macro::regex!(r"^\$"),
			Self::Mod => regex_macro::regex!("^%"),
			Self::Caret => regex_macro::regex!(r"^\^"),
			Self::Amp => regex_macro::regex!("^&"),
			Self::Underscore => regex_macro::regex!("^_"),
			Self::Apost => regex_macro::regex!("^'"),
			Self::Quote => regex_macro::regex!("^\""),
			Self::LAngle => regex_macro::regex!("^<"),
			Self::RAngle => regex_macro::regex!("^>"),
			Self::Question => regex_macro::regex!(r"^\?"),
			Self::BSlash => regex_macro::regex!(r"^\\"),
			Self::Pipe => regex_macro::regex!(r"^\|"),
			Self::Tick => regex_macro::regex!("^`"),
			Self::Tilde => regex_macro::regex!("^~"),
		})
	}

	/// Finds the first token type that matches the start of the given code.
	///
	/// # Parameters
	/// - `code`: The code to find a match for.
	///
	/// # Returns
	/// The first token type that matches the given code, along with the matched text, or `None` if no token type matches.
	#[must_use]
	fn find_match(code: &str) -> Option<(Self, String)> {
		for token_type in Self::iter() {
			if let Some(matched) = token_type.pattern().and_then(|pattern| pattern.find(code)) {
				return Some((token_type, matched.as_str().to_owned()));
			}
		}
		None
	}
}

impl std::fmt::Display for TokenType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", format!("{self:?}").to_case(convert_case::Case::Title))
	}
}

/// A token in source code.
#[derive(Debug, Clone)]
pub struct Token {
	/// The type of the token.
	pub token_type: TokenType,
	/// The value of the token. This value is how the token originally appears in the source code *exactly*.
	pub value: String,
	/// The region of source code the token was read from. The start points at the token's first character and the end
	/// points one past its last character.
	pub span: Span,
}

impl Token {
	/// Returns whether this token is an identifier with exactly the given text. The parser uses this to recognize the
	/// `let` and `do` keywords, which are ordinary identifier tokens.
	#[must_use]
	pub fn is_identifier(&self, text: &str) -> bool {
		self.token_type == TokenType::Identifier && self.value == text
	}
}

/// Tokenizes a string of Hawk source code into a vector of tokens. This is the first step in compiling Hawk source code. The returned vector of tokens
/// should be wrapped in a `TokenCursor` and passed into the Hawk parser, which will convert it into an abstract syntax tree.
///
/// Position accounting while scanning: a newline advances the line and resets the column to 1, a space advances the column by 1, and a tab advances the
/// column by 3. None of them produce tokens. Characters that match no token type are skipped silently; This is a known limitation, and it means a stray
/// non-ASCII character in a program simply disappears instead of producing an error.
///
/// # Parameters
/// - `code` - The Hawk source code. It needn't be syntactically or semantically valid; The only input this function diagnoses is an integer literal
///   that doesn't fit in a signed 32-bit value, which aborts tokenization with the tokens read so far.
/// - `context` - Global data about the compiler's state. Out-of-range integer literals push a diagnostic here.
///
/// # Returns
/// A vector of tokens in the order they appeared in the given source code.
pub fn tokenize(code: &str, context: &mut Context) -> Vec<Token> {
	let mut tokens = Vec::new();
	let mut position = SourcePos::start();

	while position.offset < code.len() {
		let rest = &code[position.offset..];
		let character = rest.chars().next().unwrap_or_default();

		// Whitespace produces no tokens; It only moves the position.
		match character {
			'\n' => {
				position.line += 1;
				position.column = 1;
				position.offset += 1;
				continue;
			},
			'\t' => {
				position.column += 3;
				position.offset += 1;
				continue;
			},
			' ' => {
				position.column += 1;
				position.offset += 1;
				continue;
			},
			_ => {},
		}

		// We've got a match - we found a token that matches the start of the remaining code
		if let Some((token_type, value)) = TokenType::find_match(rest) {
			let length = value.len();
			let start = position;
			let end = SourcePos {
				line: position.line,
				column: position.column + length,
				offset: position.offset + length,
			};

			// Digit runs must fit in a signed 32-bit integer. An overflowing literal is the one lexical error in the
			// language, and it stops tokenization on the spot.
			if token_type == TokenType::Integer && value.parse::<i32>().is_err() {
				context
					.diagnostics
					.error(format!("Integer literal is out of 32-bit range: {value}"), Span::new(start, end));
				return tokens;
			}

			tokens.push(Token {
				token_type,
				value,
				span: Span::new(start, end),
			});
			position = end;
		}
		// Unrecognized character - skip it silently
		else {
			position.column += 1;
			position.offset += character.len_utf8();
		}
	}

	tokens
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokenize_all(code: &str) -> Vec<Token> {
		let mut context = Context::new("test.hawk", code);
		let tokens = tokenize(code, &mut context);
		assert!(context.diagnostics.is_empty());
		tokens
	}

	#[test]
	fn tokenizes_a_simple_program() {
		let tokens = tokenize_all("let a = 5 do a");
		let types = tokens.iter().map(|token| token.token_type.clone()).collect::<Vec<_>>();
		assert_eq!(
			types,
			vec![
				TokenType::Identifier,
				TokenType::Identifier,
				TokenType::Equal,
				TokenType::Integer,
				TokenType::Identifier,
				TokenType::Identifier,
			]
		);
		assert_eq!(tokens[0].value, "let");
		assert_eq!(tokens[3].value, "5");
		assert!(tokens[4].is_identifier("do"));
	}

	#[test]
	fn keywords_are_plain_identifiers() {
		let tokens = tokenize_all("let do");
		assert!(tokens.iter().all(|token| token.token_type == TokenType::Identifier));
	}

	#[test]
	fn tracks_lines_columns_and_offsets() {
		let tokens = tokenize_all("let a = 5\ndo a");
		let do_token = &tokens[4];
		assert!(do_token.is_identifier("do"));
		assert_eq!(do_token.span.start.line, 2);
		assert_eq!(do_token.span.start.column, 1);
		assert_eq!(do_token.span.start.offset, 10);
		assert_eq!(do_token.span.end.offset, 12);
	}

	#[test]
	fn a_tab_advances_the_column_by_three() {
		let tokens = tokenize_all("\ta");
		assert_eq!(tokens[0].span.start.column, 4);
		assert_eq!(tokens[0].span.start.offset, 1);
	}

	#[test]
	fn identifiers_may_contain_but_not_start_with_underscores() {
		let tokens = tokenize_all("my_var _x");
		assert_eq!(tokens[0].token_type, TokenType::Identifier);
		assert_eq!(tokens[0].value, "my_var");
		assert_eq!(tokens[1].token_type, TokenType::Underscore);
		assert_eq!(tokens[2].token_type, TokenType::Identifier);
		assert_eq!(tokens[2].value, "x");
	}

	#[test]
	fn punctuation_tokenizes_one_character_at_a_time() {
		let tokens = tokenize_all("a = b + c - 1 * 2 / 3");
		let types = tokens.iter().map(|token| token.token_type.clone()).collect::<Vec<_>>();
		assert!(types.contains(&TokenType::Equal));
		assert!(types.contains(&TokenType::Plus));
		assert!(types.contains(&TokenType::Hyphen));
		assert!(types.contains(&TokenType::Star));
		assert!(types.contains(&TokenType::FSlash));
	}

	#[test]
	fn unrecognized_characters_are_skipped_silently() {
		let tokens = tokenize_all("a § b");
		assert_eq!(tokens.len(), 2);
		assert_eq!(tokens[0].value, "a");
		assert_eq!(tokens[1].value, "b");
		// The skipped character still advanced the scanner past its bytes.
		assert_eq!(tokens[1].span.start.offset, 5);
	}

	#[test]
	fn an_overflowing_integer_literal_aborts_tokenization() {
		let code = "let a = 99999999999 do a";
		let mut context = Context::new("test.hawk", code);
		let tokens = tokenize(code, &mut context);
		assert!(context.diagnostics.has_errors());
		// Everything before the bad literal is still returned; nothing after it is.
		assert_eq!(tokens.len(), 3);
	}

	#[test]
	fn token_type_names_render_in_title_case() {
		assert_eq!(format!("{}", TokenType::FSlash), "F Slash");
		assert_eq!(format!("{}", TokenType::Identifier), "Identifier");
	}
}
