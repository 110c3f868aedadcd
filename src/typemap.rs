use crate::span::Span;

/// The name of the unresolved type. Every typemap node starts out with this type and is promoted away from it as the
/// inferencer learns more.
pub const DYN: &str = "dyn";

/// The name of the integer type, currently the language's only concrete type.
pub const INT: &str = "int";

/// A type in the language. Currently the only concrete type is `int`; `dyn` marks a node whose type hasn't been
/// resolved yet. Every typemap node gets its own `Type` value with a fresh id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
	/// A fresh integer identifying this particular type value.
	pub id: usize,
	/// The type's name: `dyn` or `int`.
	pub name: String,
}

impl Type {
	/// Returns whether this type is still the unresolved `dyn`.
	#[must_use]
	pub fn is_dyn(&self) -> bool {
		self.name == DYN
	}
}

/// The way a typemap node binds its symbol. Every binding in the language is currently a first binding; Reassignment
/// is reserved for a future version with mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMapNodeKind {
	/// A first binding of a name.
	Assignment,
	/// A rebinding of an existing name. Reserved; Never produced.
	Reassignment,
}

/// The data every typemap node carries, whether leaf or branch.
#[derive(Debug, Clone)]
pub struct TypeMapEntry {
	/// The node's id, which is its index in the typemap's node arena.
	pub id: usize,
	/// The name of the symbol this node types.
	pub symbol: String,
	/// The span of the symbol's declaration.
	pub span: Span,
	/// The node's current type.
	pub ty: Type,
	/// How the node binds its symbol.
	pub kind: TypeMapNodeKind,
}

/// A node in the typemap. A node starts as a `Leaf`; Attaching its first child converts it to a `Branch`. Children are
/// held by id rather than by value, because the same node can appear as a child of several branches: a branch's
/// children are the nodes its variable's initializer referenced, and one variable can be referenced any number of
/// times.
#[derive(Debug, Clone)]
pub enum TypeMapNode {
	/// A node with no children: a variable whose initializer referenced no other variables (yet).
	Leaf(TypeMapEntry),
	/// A node with children: a variable whose type flows from the variables its initializer referenced.
	Branch(TypeMapEntry, Vec<usize>),
}

impl TypeMapNode {
	/// Returns the node's entry data regardless of which variant it is.
	#[must_use]
	pub const fn entry(&self) -> &TypeMapEntry {
		match self {
			Self::Leaf(entry) | Self::Branch(entry, _) => entry,
		}
	}

	/// Returns the node's entry data mutably, regardless of which variant it is.
	pub fn entry_mut(&mut self) -> &mut TypeMapEntry {
		match self {
			Self::Leaf(entry) | Self::Branch(entry, _) => entry,
		}
	}

	/// Returns the node's child ids. A leaf has none.
	#[must_use]
	pub fn children(&self) -> &[usize] {
		match self {
			Self::Leaf(_) => &[],
			Self::Branch(_, children) => children,
		}
	}
}

/// The typemap: an id-indexed arena of nodes plus the list of roots in declaration order. Every binding the inferencer
/// visits appends a root, including the bindings of nested `let` blocks, so the root list is the program's bindings in
/// the order they are declared.
#[derive(Debug, Default)]
pub struct TypeMap {
	/// Every node created so far, indexed by id.
	nodes: Vec<TypeMapNode>,
	/// The root nodes, in declaration order.
	roots: Vec<usize>,
	/// The source of fresh type ids.
	next_type_id: usize,
}

impl TypeMap {
	/// Creates an empty typemap.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			nodes: Vec::new(),
			roots: Vec::new(),
			next_type_id: 0,
		}
	}

	/// Appends a new root leaf of type `dyn` for the given symbol and returns its id.
	pub fn add_root(&mut self, symbol: String, span: Span) -> usize {
		let id = self.nodes.len();
		let type_id = self.next_type_id;
		self.next_type_id += 1;
		self.nodes.push(TypeMapNode::Leaf(TypeMapEntry {
			id,
			symbol,
			span,
			ty: Type {
				id: type_id,
				name: DYN.to_owned(),
			},
			kind: TypeMapNodeKind::Assignment,
		}));
		self.roots.push(id);
		id
	}

	/// Finds the node for the given name. The roots are scanned in order and the *last* one with the name wins; The
	/// scan then falls through into every branch's children (depth-first, in order), where a match also wins. A name
	/// that was shadowed or referenced across scopes can therefore resolve to an aliased occurrence rather than the
	/// nearest one; Lookups here are by name alone and know nothing about scopes.
	#[must_use]
	pub fn find_node(&self, name: &str) -> Option<usize> {
		let mut found = None;
		for &id in &self.roots {
			if self.nodes[id].entry().symbol == name {
				found = Some(id);
			}
		}
		for &id in &self.roots {
			self.find_in_children(id, name, &mut found);
		}
		found
	}

	fn find_in_children(&self, id: usize, name: &str, found: &mut Option<usize>) {
		for &child in self.nodes[id].children() {
			if self.nodes[child].entry().symbol == name {
				*found = Some(child);
			}
			self.find_in_children(child, name, found);
		}
	}

	/// Attaches the given child node to the given parent node, converting the parent from a leaf to a branch if this
	/// is its first child. The same child may be attached any number of times.
	pub fn attach_child(&mut self, parent: usize, child: usize) {
		let node = &mut self.nodes[parent];
		match node {
			TypeMapNode::Branch(_, children) => children.push(child),
			TypeMapNode::Leaf(entry) => *node = TypeMapNode::Branch(entry.clone(), vec![child]),
		}
	}

	/// Replaces the name of the given node's type, keeping the type's id.
	pub fn set_type_name(&mut self, id: usize, name: &str) {
		self.nodes[id].entry_mut().ty.name = name.to_owned();
	}

	/// Returns the node with the given id.
	#[must_use]
	pub fn node(&self, id: usize) -> &TypeMapNode {
		&self.nodes[id]
	}

	/// Returns the root ids in declaration order.
	#[must_use]
	pub fn roots(&self) -> &[usize] {
		&self.roots
	}

	/// Renders an indented dump of the typemap for the `tymap` debug stage: each root with its type, and below it the
	/// nodes its initializer referenced.
	#[must_use]
	pub fn dump(&self) -> String {
		let mut output = String::new();
		for &id in &self.roots {
			self.dump_node(id, &mut output, 0);
		}
		output
	}

	fn dump_node(&self, id: usize, output: &mut String, depth: usize) {
		// Brings `write!` for appending to a string into scope; Infallible for `String`, hence the `.ok()`.
		use std::fmt::Write as _;

		let entry = self.nodes[id].entry();
		writeln!(
			output,
			"{}{}: {} (node {}, type {}) @ {}",
			"  ".repeat(depth),
			entry.symbol,
			entry.ty.name,
			entry.id,
			entry.ty.id,
			entry.span
		)
		.ok();
		for &child in self.nodes[id].children() {
			self.dump_node(child, output, depth + 1);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_roots_start_as_dyn_leaves() {
		let mut typemap = TypeMap::new();
		let id = typemap.add_root("a".to_owned(), Span::at_start());
		let node = typemap.node(id);
		assert!(matches!(node, TypeMapNode::Leaf(_)));
		assert!(node.entry().ty.is_dyn());
		assert_eq!(node.entry().kind, TypeMapNodeKind::Assignment);
	}

	#[test]
	fn each_node_gets_a_fresh_type_id() {
		let mut typemap = TypeMap::new();
		let first = typemap.add_root("a".to_owned(), Span::at_start());
		let second = typemap.add_root("b".to_owned(), Span::at_start());
		assert_ne!(typemap.node(first).entry().ty.id, typemap.node(second).entry().ty.id);
	}

	#[test]
	fn attaching_a_child_promotes_a_leaf_to_a_branch() {
		let mut typemap = TypeMap::new();
		let a = typemap.add_root("a".to_owned(), Span::at_start());
		let b = typemap.add_root("b".to_owned(), Span::at_start());
		typemap.attach_child(b, a);
		assert!(matches!(typemap.node(b), TypeMapNode::Branch(..)));
		assert_eq!(typemap.node(b).children(), &[a]);
		// Attaching again just appends; duplicates are allowed.
		typemap.attach_child(b, a);
		assert_eq!(typemap.node(b).children(), &[a, a]);
	}

	#[test]
	fn find_node_takes_the_last_occurrence_among_roots() {
		let mut typemap = TypeMap::new();
		let _first = typemap.add_root("a".to_owned(), Span::at_start());
		let second = typemap.add_root("a".to_owned(), Span::at_start());
		assert_eq!(typemap.find_node("a"), Some(second));
	}

	#[test]
	fn find_node_falls_through_into_branch_children() {
		let mut typemap = TypeMap::new();
		let first_a = typemap.add_root("a".to_owned(), Span::at_start());
		let b = typemap.add_root("b".to_owned(), Span::at_start());
		typemap.attach_child(b, first_a);
		let second_a = typemap.add_root("a".to_owned(), Span::at_start());

		// The root scan finds the later `a`, but the child scan runs afterwards and overrides it with the aliased
		// occurrence inside `b`.
		assert_ne!(typemap.find_node("a"), Some(second_a));
		assert_eq!(typemap.find_node("a"), Some(first_a));
	}
}
