use crate::span::Span;

/// A property attached to a symbol. No properties are defined yet; The list on `Symbol` is an extension point for
/// later passes to hang information off declarations without changing the table's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolProperty {}

/// A declared variable. A symbol remembers the span of its declaration so that later passes can point diagnostics at
/// the place a variable was introduced rather than the place it was used.
#[derive(Debug, Clone)]
pub struct Symbol {
	/// The declared name.
	pub ident: String,
	/// The span of the declaring identifier.
	pub span: Span,
	/// Properties attached to the symbol. Currently always empty.
	pub properties: Vec<SymbolProperty>,
}

impl Symbol {
	/// Creates a symbol with the given name and declaration span and no properties.
	#[must_use]
	pub const fn new(ident: String, span: Span) -> Self {
		Self {
			ident,
			span,
			properties: Vec::new(),
		}
	}
}

/// A single lexical scope: the region introduced by one `let` block. The label is a stable name like `let_2` that only
/// exists for the symbol table's debug dump.
#[derive(Debug)]
pub struct Scope {
	/// The scope's stable debug label.
	pub ident: String,
	/// The symbols declared in this scope, in declaration order. Shadowing is allowed, so the same name can appear
	/// more than once; Lookups take the most recent occurrence.
	symbols: Vec<Symbol>,
}

impl Scope {
	/// Returns the most recently declared symbol in this scope with the given name, if any.
	#[must_use]
	pub fn find(&self, name: &str) -> Option<&Symbol> {
		self.symbols.iter().rev().find(|symbol| symbol.ident == name)
	}

	/// Returns the symbols declared in this scope, in declaration order.
	#[must_use]
	pub fn symbols(&self) -> &[Symbol] {
		&self.symbols
	}
}

/// The symbol table: an append-only, ordered list of every scope the program creates, plus a cursor marking which of
/// them is current.
///
/// Scopes are never removed. The resolver creates them as it walks the tree, and the passes after it re-walk the tree
/// in the same order using only `enter_scope` and `leave_scope`, which move the cursor forward and backward through
/// the very same list; Because both walks visit `let` blocks in the same order, the cursor lands on the same scope at
/// the same tree position each time. The cursor moves linearly rather than following a parent chain, which is also
/// how lookups walk "outward": from the current scope's index straight down to index 0.
#[derive(Debug, Default)]
pub struct SymbolTable {
	/// Every scope created so far, in creation order.
	scopes: Vec<Scope>,
	/// The index of the current scope, or `None` outside of every scope (before the first `enter_scope` and after the
	/// final `leave_scope`).
	cursor: Option<usize>,
}

impl SymbolTable {
	/// Creates an empty symbol table with no scopes.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			scopes: Vec::new(),
			cursor: None,
		}
	}

	/// Appends a fresh scope to the table and makes it current. Only the resolver calls this; Later passes re-enter
	/// the scopes it created.
	pub fn create_scope(&mut self) {
		let index = self.scopes.len();
		self.scopes.push(Scope {
			ident: format!("let_{index}"),
			symbols: Vec::new(),
		});
		self.cursor = Some(index);
	}

	/// Moves the cursor forward to the next scope in creation order. Passes that re-walk the tree call this wherever
	/// the resolver called `create_scope`.
	pub fn enter_scope(&mut self) {
		self.cursor = Some(self.cursor.map_or(0, |current| current + 1));
	}

	/// Moves the cursor backward to the previous scope in creation order, or outside of every scope when the current
	/// one is the first.
	pub fn leave_scope(&mut self) {
		self.cursor = match self.cursor {
			Some(current) if current > 0 => Some(current - 1),
			_ => None,
		};
	}

	/// Resets the cursor to before the first scope, ready for a pass to re-walk the tree from the top.
	pub fn rewind(&mut self) {
		self.cursor = None;
	}

	/// Declares a symbol in the current scope. Shadowing an existing name, in this scope or an outer one, is allowed.
	///
	/// # Errors
	/// If no scope is current, which would mean a declaration outside of every `let` block.
	pub fn define(&mut self, symbol: Symbol) -> anyhow::Result<()> {
		let Some(current) = self.cursor else {
			anyhow::bail!("Internal error: attempted to declare \"{}\" outside of any scope", symbol.ident);
		};
		self.scopes[current].symbols.push(symbol);
		Ok(())
	}

	/// Finds the lexically nearest declaration of the given name: the scopes are searched from the current one down
	/// to the first, and within each scope the most recent declaration wins.
	///
	/// # Returns
	/// The nearest symbol with the given name, or `None` if no scope in range declares it.
	#[must_use]
	pub fn find_symbol(&self, name: &str) -> Option<&Symbol> {
		let current = self.cursor?;
		(0..=current).rev().find_map(|index| self.scopes[index].find(name))
	}

	/// Returns the scopes in creation order.
	#[must_use]
	pub fn scopes(&self) -> &[Scope] {
		&self.scopes
	}

	/// Renders an indented dump of every scope and its symbols, for the `symtab` debug stage.
	#[must_use]
	pub fn dump(&self) -> String {
		// Brings `write!` for appending to a string into scope; Infallible for `String`, hence the `.ok()`s.
		use std::fmt::Write as _;

		let mut output = String::new();
		for scope in &self.scopes {
			writeln!(output, "{}", scope.ident).ok();
			for symbol in scope.symbols() {
				writeln!(output, "  {} @ {}", symbol.ident, symbol.span).ok();
			}
		}
		output
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn symbol(name: &str) -> Symbol {
		Symbol::new(name.to_owned(), Span::at_start())
	}

	#[test]
	fn lookup_searches_outward_from_the_current_scope() {
		let mut table = SymbolTable::new();
		table.create_scope();
		table.define(symbol("a")).unwrap();
		table.create_scope();
		table.define(symbol("b")).unwrap();

		assert!(table.find_symbol("a").is_some());
		assert!(table.find_symbol("b").is_some());

		table.leave_scope();
		assert!(table.find_symbol("a").is_some());
		assert!(table.find_symbol("b").is_none());
	}

	#[test]
	fn shadowing_picks_the_most_recent_declaration() {
		use crate::span::SourcePos;

		let spot = |offset| Span {
			start: SourcePos { line: 1, column: offset + 1, offset },
			end: SourcePos {
				line: 1,
				column: offset + 2,
				offset: offset + 1,
			},
		};
		let mut table = SymbolTable::new();
		table.create_scope();
		table.define(Symbol::new("a".to_owned(), spot(0))).unwrap();
		table.define(Symbol::new("a".to_owned(), spot(4))).unwrap();
		table.create_scope();
		table.define(Symbol::new("a".to_owned(), spot(8))).unwrap();

		// The inner scope's declaration wins while it is current, and within a scope the later one wins.
		assert_eq!(table.find_symbol("a").unwrap().span, spot(8));
		table.leave_scope();
		assert_eq!(table.find_symbol("a").unwrap().span, spot(4));
	}

	#[test]
	fn scopes_survive_leaving_and_can_be_reentered() {
		let mut table = SymbolTable::new();
		table.create_scope();
		table.define(symbol("a")).unwrap();
		table.create_scope();
		table.define(symbol("b")).unwrap();
		table.leave_scope();
		table.leave_scope();

		assert_eq!(table.scopes().len(), 2);
		assert!(table.find_symbol("a").is_none());

		// A second pass re-enters the same scopes in the same order.
		table.rewind();
		table.enter_scope();
		assert!(table.find_symbol("a").is_some());
		table.enter_scope();
		assert!(table.find_symbol("b").is_some());
		table.leave_scope();
		table.leave_scope();
		assert!(table.find_symbol("a").is_none());
	}

	#[test]
	fn defining_outside_any_scope_is_an_internal_error() {
		let mut table = SymbolTable::new();
		assert!(table.define(symbol("a")).is_err());
	}

	#[test]
	fn dump_lists_scopes_by_label() {
		let mut table = SymbolTable::new();
		table.create_scope();
		table.define(symbol("a")).unwrap();
		let dump = table.dump();
		assert!(dump.starts_with("let_0\n"));
		assert!(dump.contains("  a @"));
	}
}
