use crate::span::Span;

/// A kind of node in the abstract syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstKind {
	/// A `let` block: zero or more `Var` children followed by exactly one `Do` child. This is the single form of scope
	/// in the language, and the whole program is one of these.
	Let,

	/// The body of a `let` block: exactly one expression child, whose value becomes the value of the block.
	Do,

	/// A binding inside a `let` block: exactly two children, an `Identifier` naming the variable followed by the
	/// initializer expression.
	Var,

	/// A name in binding position. Carries the name as data and has no children.
	Identifier,

	/// A reference to a variable in expression position. Carries the name as data and has no children.
	VarRef,

	/// An integer literal. Carries the parsed value as data and has no children.
	IntLiteral,

	/// An addition. Two expression children, left then right.
	BinaryPlus,

	/// A subtraction. Two expression children, left then right.
	BinaryMinus,

	/// A multiplication. Two expression children, left then right.
	BinaryMul,

	/// A division. Two expression children, left then right.
	BinaryDiv,

	/// A generic expression wrapper. Reserved; The parser never produces it.
	Expression,
}

impl AstKind {
	/// Returns whether this kind is one of the four binary operators.
	#[must_use]
	pub const fn is_binary(&self) -> bool {
		matches!(self, Self::BinaryPlus | Self::BinaryMinus | Self::BinaryMul | Self::BinaryDiv)
	}
}

impl std::fmt::Display for AstKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Let => "Let",
			Self::Do => "Do",
			Self::Var => "Var",
			Self::Identifier => "Identifier",
			Self::VarRef => "VarRef",
			Self::IntLiteral => "IntLiteral",
			Self::BinaryPlus => "BinaryPlus",
			Self::BinaryMinus => "BinaryMinus",
			Self::BinaryMul => "BinaryMul",
			Self::BinaryDiv => "BinaryDiv",
			Self::Expression => "Expression",
		};
		write!(f, "{name}")
	}
}

/// The payload a node can carry beyond its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
	/// A name, carried by `Identifier` and `VarRef` nodes.
	Name(String),
	/// A parsed integer value, carried by `IntLiteral` nodes.
	Integer(i32),
}

/// A node in the abstract syntax tree. Nodes own their children outright, which keeps the tree a plain value; Passes
/// that need to know about an enclosing node pass that information down their recursion instead of chasing parent
/// pointers back up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
	/// The kind of this node.
	pub kind: AstKind,
	/// The node's children, in source order.
	pub children: Vec<AstNode>,
	/// The node's payload, if its kind carries one.
	pub data: Option<NodeData>,
	/// The region of source code this node was parsed from. A node's span always contains the spans of all of its
	/// children.
	pub span: Span,
}

impl AstNode {
	/// Creates a childless node with no data.
	#[must_use]
	pub const fn new(kind: AstKind, span: Span) -> Self {
		Self {
			kind,
			children: Vec::new(),
			data: None,
			span,
		}
	}

	/// Returns the node's name data, if it carries any. `Identifier` and `VarRef` nodes always do.
	#[must_use]
	pub fn name(&self) -> Option<&str> {
		match &self.data {
			Some(NodeData::Name(name)) => Some(name),
			_ => None,
		}
	}

	/// Returns the node's integer data, if it carries any. `IntLiteral` nodes always do.
	#[must_use]
	pub fn integer(&self) -> Option<i32> {
		match &self.data {
			Some(NodeData::Integer(value)) => Some(*value),
			_ => None,
		}
	}

	/// Calls the given function on this node and every node below it, in pre-order.
	pub fn walk(&self, visit: &mut impl FnMut(&Self)) {
		visit(self);
		for child in &self.children {
			child.walk(visit);
		}
	}

	/// Renders an indented dump of this subtree, one node per line, for the `ast` debug stage.
	#[must_use]
	pub fn dump(&self) -> String {
		let mut output = String::new();
		self.dump_into(&mut output, 0);
		output
	}

	fn dump_into(&self, output: &mut String, depth: usize) {
		// Brings `write!` for appending to a string into scope; Infallible for `String`, hence the `.ok()`s.
		use std::fmt::Write as _;

		write!(output, "{}{}", "  ".repeat(depth), self.kind).ok();
		match &self.data {
			Some(NodeData::Name(name)) => {
				write!(output, " \"{name}\"").ok();
			},
			Some(NodeData::Integer(value)) => {
				write!(output, " {value}").ok();
			},
			None => {},
		}
		writeln!(output, " @ {}", self.span).ok();
		for child in &self.children {
			child.dump_into(output, depth + 1);
		}
	}
}
