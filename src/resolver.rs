use crate::{
	context::Context,
	parser::ast::{AstKind, AstNode},
	scopes::Symbol,
};

/// Resolves every name in the program against the lexical scope structure, building the symbol table as it goes.
///
/// Each `let` block creates a scope; Each binding declares its symbol *before* its initializer is visited, so a
/// variable is in scope for its own initializer and for the bindings after it. References that resolve to nothing
/// push a diagnostic; The pass itself keeps walking so that every undeclared reference in the program is reported.
///
/// # Errors
/// Only for malformed trees the parser can't produce, such as a binding whose first child isn't an identifier.
pub fn resolve(ast: &AstNode, context: &mut Context) -> anyhow::Result<()> {
	resolve_let(ast, context)
}

fn resolve_let(node: &AstNode, context: &mut Context) -> anyhow::Result<()> {
	if node.kind != AstKind::Let {
		anyhow::bail!("Internal error: expected a Let node but found {}", node.kind);
	}
	context.scopes.create_scope();

	for child in &node.children {
		match child.kind {
			AstKind::Var => resolve_var(child, context)?,
			AstKind::Do => resolve_do(child, context)?,
			other => anyhow::bail!("Internal error: a Let node cannot have a {other} child"),
		}
	}
	Ok(())
}

fn resolve_var(node: &AstNode, context: &mut Context) -> anyhow::Result<()> {
	let identifier = &node.children[0];
	let Some(name) = identifier.name().filter(|_| identifier.kind == AstKind::Identifier) else {
		anyhow::bail!("Internal error: a Var node's first child must be an identifier carrying a name");
	};

	// Declared before the initializer is visited: the variable is visible to its own initializer.
	context.scopes.define(Symbol::new(name.to_owned(), identifier.span))?;
	resolve_expression(&node.children[1], context)
}

fn resolve_do(node: &AstNode, context: &mut Context) -> anyhow::Result<()> {
	resolve_expression(&node.children[0], context)?;
	context.scopes.leave_scope();
	Ok(())
}

fn resolve_expression(node: &AstNode, context: &mut Context) -> anyhow::Result<()> {
	match node.kind {
		AstKind::IntLiteral => Ok(()),
		AstKind::VarRef => {
			let Some(name) = node.name() else {
				anyhow::bail!("Internal error: a VarRef node must carry a name");
			};
			if context.scopes.find_symbol(name).is_none() {
				context.diagnostics.error(format!("Use of undeclared symbol: {name}"), node.span);
			}
			Ok(())
		},
		kind if kind.is_binary() => {
			resolve_expression(&node.children[0], context)?;
			resolve_expression(&node.children[1], context)
		},
		AstKind::Let => resolve_let(node, context),
		other => anyhow::bail!("Internal error: {other} is not an expression node"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{cursor::TokenCursor, lexer::tokenize, parser};

	fn resolve_program(code: &str) -> Context {
		let mut context = Context::new("test.hawk", code);
		let tokens = tokenize(code, &mut context);
		let mut cursor = TokenCursor::new(tokens);
		let ast = parser::parse(&mut cursor, &mut context).unwrap().unwrap();
		resolve(&ast, &mut context).unwrap();
		context
	}

	#[test]
	fn declared_references_resolve_cleanly() {
		let context = resolve_program("let a = 5 b = 3 do a + b");
		assert!(context.diagnostics.is_empty());
	}

	#[test]
	fn undeclared_references_are_diagnosed() {
		let context = resolve_program("let a = b do a");
		assert!(context.diagnostics.has_errors());
		let messages = context.diagnostics.iter().map(|diagnostic| diagnostic.message.clone()).collect::<Vec<_>>();
		assert_eq!(messages, vec!["Use of undeclared symbol: b"]);
	}

	#[test]
	fn the_diagnostic_points_at_the_reference() {
		let context = resolve_program("let a = b do a");
		let diagnostic = context.diagnostics.iter().next().unwrap();
		// `b` sits at column 9, one byte wide.
		assert_eq!(diagnostic.span.start.column, 9);
		assert_eq!(diagnostic.span.end.offset - diagnostic.span.start.offset, 1);
	}

	#[test]
	fn each_occurrence_is_reported_once() {
		let context = resolve_program("let a = c do a + c");
		assert_eq!(context.diagnostics.len(), 2);
	}

	#[test]
	fn a_variable_is_in_scope_for_later_siblings() {
		let context = resolve_program("let a = 5 b = a do b");
		assert!(context.diagnostics.is_empty());
	}

	#[test]
	fn a_variable_is_in_scope_for_its_own_initializer() {
		let context = resolve_program("let a = a do a");
		assert!(context.diagnostics.is_empty());
	}

	#[test]
	fn outer_variables_are_visible_in_nested_blocks() {
		let context = resolve_program("let a = 5 b = let c = 10 do c + a do b * 2");
		assert!(context.diagnostics.is_empty());
	}

	#[test]
	fn inner_variables_are_not_visible_outside_their_block() {
		let context = resolve_program("let a = let b = 5 do b do a + b");
		assert!(context.diagnostics.has_errors());
		assert_eq!(context.diagnostics.len(), 1);
	}

	#[test]
	fn all_scopes_are_retained_after_the_pass() {
		let context = resolve_program("let a = let b = 5 do b do a");
		assert_eq!(context.scopes.scopes().len(), 2);
	}
}
