use crate::parser::ast::{AstKind, AstNode};

/// A trait for AST nodes to convert themselves into human-readable Hawk code. The rendering recursively converts
/// sub-nodes and joins their renderings, which makes it a formatter: parsing a file and rendering the tree back out
/// yields a cleanly spaced version of the same program. Because every operator shares one precedence level and groups
/// to the right, no parentheses are ever needed; Re-tokenizing the rendering yields the original token sequence.
pub trait ToHawk {
	/// Converts this AST node into Hawk code.
	fn to_hawk(&self) -> String;
}

impl ToHawk for AstNode {
	fn to_hawk(&self) -> String {
		match self.kind {
			AstKind::Let => {
				let mut output = "let".to_owned();
				for child in &self.children {
					output.push(' ');
					output.push_str(&child.to_hawk());
				}
				output
			},

			AstKind::Var => format!("{} = {}", self.children[0].to_hawk(), self.children[1].to_hawk()),

			AstKind::Do => format!("do {}", self.children[0].to_hawk()),

			AstKind::Identifier | AstKind::VarRef => self.name().unwrap_or_default().to_owned(),

			AstKind::IntLiteral => self.integer().unwrap_or_default().to_string(),

			AstKind::BinaryPlus | AstKind::BinaryMinus | AstKind::BinaryMul | AstKind::BinaryDiv => {
				let operator = match self.kind {
					AstKind::BinaryPlus => "+",
					AstKind::BinaryMinus => "-",
					AstKind::BinaryMul => "*",
					_ => "/",
				};
				format!("{} {operator} {}", self.children[0].to_hawk(), self.children[1].to_hawk())
			},

			// Reserved; the parser never produces it.
			AstKind::Expression => self.children.first().map(Self::to_hawk).unwrap_or_default(),
		}
	}
}
