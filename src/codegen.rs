use crate::{
	context::Context,
	parser::ast::{AstKind, AstNode},
};

/// A bytecode operation. Every opcode is exactly one byte on the wire; `Push` and `Read` are followed by a signed
/// 32-bit big-endian operand.
#[derive(strum_macros::FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
	/// Pushes its operand onto the stack.
	Push = 0,
	/// Removes the top of the stack.
	Pop = 1,
	/// Pops two values and pushes their sum.
	Add = 2,
	/// Pops two values and pushes their difference.
	Sub = 3,
	/// Pops two values and pushes their product.
	Mul = 4,
	/// Pops two values and pushes their quotient.
	Div = 5,
	/// Reads the value its operand says below the top of the stack and pushes a copy of it, unless that value is 0.
	Read = 6,
	/// Pops the top of the stack into the save register.
	Save = 7,
	/// Pushes the save register onto the stack.
	Load = 8,
}

impl std::fmt::Display for Opcode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Push => "PUSH",
			Self::Pop => "POP",
			Self::Add => "ADD",
			Self::Sub => "SUB",
			Self::Mul => "MUL",
			Self::Div => "DIV",
			Self::Read => "READ",
			Self::Save => "SAVE",
			Self::Load => "LOAD",
		};
		write!(f, "{name}")
	}
}

/// The value a `let` block pushes at entry to mark the bottom of its locals at runtime.
pub const FRAME_MARKER: i32 = 0xff;

/// An entry on the generator's shadow stack, which models what the VM's stack will hold at the corresponding point of
/// execution. Variable offsets for `Read` come from searching this model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEntry {
	/// The marker a `let` block pushes at entry; The bottom of that block's locals.
	Frame,
	/// A value with a name: either a declared variable or a synthetic temporary.
	Var(String),
}

/// A node in the tree of emitted byte chunks. Each `let` block groups its emissions in a `Block`; The final packet is
/// the in-order concatenation of every `Statement`'s bytes.
#[derive(Debug)]
pub enum BytecodeTree {
	/// A block's emissions, in order.
	Block(Vec<BytecodeTree>),
	/// One emitted chunk of bytes.
	Statement(Vec<u8>),
}

impl BytecodeTree {
	fn flatten_into(&self, output: &mut Vec<u8>) {
		match self {
			Self::Statement(bytes) => output.extend_from_slice(bytes),
			Self::Block(children) => {
				for child in children {
					child.flatten_into(output);
				}
			},
		}
	}
}

/// The code generator. It walks the tree once, emitting bytes into a tree of blocks while keeping the shadow stack in
/// lock-step with what the VM's stack will hold, so that a variable's offset from the top of the stack can be read
/// straight out of the model.
pub struct CodeGenerator {
	/// The compile-time model of the VM stack.
	shadow: Vec<StackEntry>,
	/// The stack of open blocks. The first element is the root block; `enter_block` pushes and `leave_block` folds
	/// the finished block into its parent.
	blocks: Vec<Vec<BytecodeTree>>,
	/// The source of fresh names for synthetic temporaries.
	temporaries: usize,
}

impl Default for CodeGenerator {
	fn default() -> Self {
		Self::new()
	}
}

impl CodeGenerator {
	/// Creates a generator with an empty shadow stack and a single open root block.
	#[must_use]
	pub fn new() -> Self {
		Self {
			shadow: Vec::new(),
			blocks: vec![Vec::new()],
			temporaries: 0,
		}
	}

	/// Generates the bytecode packet for the given program.
	///
	/// # Parameters
	/// - `ast` - The program's root node, already resolved and typed.
	/// - `context` - Global data about the compiler's state. Invariant violations push a diagnostic here.
	///
	/// # Returns
	/// The flattened bytecode packet.
	pub fn generate(&mut self, ast: &AstNode, context: &mut Context) -> anyhow::Result<Vec<u8>> {
		self.generate_let(ast, context)?;

		let mut packet = Vec::new();
		for node in self.blocks.iter().flat_map(|block| block.iter()) {
			node.flatten_into(&mut packet);
		}
		Ok(packet)
	}

	/// Returns the current depth of the shadow stack.
	#[must_use]
	pub fn shadow_depth(&self) -> usize {
		self.shadow.len()
	}

	fn enter_block(&mut self) {
		self.blocks.push(Vec::new());
	}

	fn leave_block(&mut self) {
		if let Some(block) = self.blocks.pop() {
			if let Some(parent) = self.blocks.last_mut() {
				parent.push(BytecodeTree::Block(block));
			} else {
				// The root block was popped; put it back rather than lose the bytes.
				self.blocks.push(block);
			}
		}
	}

	fn emit(&mut self, opcode: Opcode) {
		if let Some(block) = self.blocks.last_mut() {
			block.push(BytecodeTree::Statement(vec![opcode as u8]));
		}
	}

	fn emit_with_operand(&mut self, opcode: Opcode, operand: i32) {
		let mut bytes = vec![opcode as u8];
		bytes.extend_from_slice(&operand.to_be_bytes());
		if let Some(block) = self.blocks.last_mut() {
			block.push(BytecodeTree::Statement(bytes));
		}
	}

	fn fresh_temporary(&mut self) -> String {
		let name = format!("$temp{}", self.temporaries);
		self.temporaries += 1;
		name
	}

	/// Renames the top shadow entry to the given name. The previous top is popped without checking what it was.
	fn name_top(&mut self, name: String) {
		self.shadow.pop();
		self.shadow.push(StackEntry::Var(name));
	}

	fn generate_let(&mut self, node: &AstNode, context: &mut Context) -> anyhow::Result<()> {
		self.enter_block();
		self.emit_with_operand(Opcode::Push, FRAME_MARKER);
		self.shadow.push(StackEntry::Frame);

		let mut saw_do = false;
		for child in &node.children {
			match child.kind {
				AstKind::Var => self.generate_var(child, context)?,
				AstKind::Do => {
					self.generate_do(child, context)?;
					saw_do = true;
				},
				other => anyhow::bail!("Internal error: a Let node cannot have a {other} child"),
			}
		}
		if !saw_do {
			let message = "let block has no do block";
			context.diagnostics.error(message, node.span);
			anyhow::bail!(message);
		}

		// The block's locals are gone; replace the frame with an entry for the value LOAD left behind.
		self.shadow.pop();
		let result = self.fresh_temporary();
		self.shadow.push(StackEntry::Var(result));
		self.leave_block();
		Ok(())
	}

	fn generate_var(&mut self, node: &AstNode, context: &mut Context) -> anyhow::Result<()> {
		let Some(name) = node.children[0].name() else {
			anyhow::bail!("Internal error: a Var node's first child must be an identifier carrying a name");
		};
		let initializer = &node.children[1];
		self.generate_expression(initializer, context)?;

		// A literal initializer leaves no shadow entry of its own; everything else does and just gets renamed.
		if initializer.kind == AstKind::IntLiteral {
			self.shadow.push(StackEntry::Var(name.to_owned()));
		} else {
			self.name_top(name.to_owned());
		}
		Ok(())
	}

	fn generate_do(&mut self, node: &AstNode, context: &mut Context) -> anyhow::Result<()> {
		self.generate_expression(&node.children[0], context)?;
		self.emit(Opcode::Save);

		// One POP per entry above the frame. SAVE already consumed the expression's value, so the last POP of the
		// sequence is the one that removes the frame marker itself; LOAD then restores the saved result.
		let locals = self.shadow.iter().rev().take_while(|entry| **entry != StackEntry::Frame).count();
		for _ in 0..locals {
			self.emit(Opcode::Pop);
			self.shadow.pop();
		}
		self.emit(Opcode::Load);
		Ok(())
	}

	fn generate_expression(&mut self, node: &AstNode, context: &mut Context) -> anyhow::Result<()> {
		match node.kind {
			AstKind::IntLiteral => {
				let Some(value) = node.integer() else {
					anyhow::bail!("Internal error: an IntLiteral node must carry a value");
				};
				self.emit_with_operand(Opcode::Push, value);
				Ok(())
			},

			AstKind::VarRef => {
				let Some(name) = node.name() else {
					anyhow::bail!("Internal error: a VarRef node must carry a name");
				};
				let Some(offset) = self.shadow.iter().rev().position(|entry| matches!(entry, StackEntry::Var(entry_name) if entry_name == name)) else {
					let message = format!("Use of undeclared symbol: {name}");
					context.diagnostics.error(message.clone(), node.span);
					anyhow::bail!(message);
				};
				self.emit_with_operand(Opcode::Read, i32::try_from(offset)?);
				self.shadow.push(StackEntry::Var(name.to_owned()));
				Ok(())
			},

			kind if kind.is_binary() => {
				// Right first, then left: at run time the left operand ends up on top.
				self.generate_operand(&node.children[1], context)?;
				self.generate_operand(&node.children[0], context)?;
				self.emit(match kind {
					AstKind::BinaryPlus => Opcode::Add,
					AstKind::BinaryMinus => Opcode::Sub,
					AstKind::BinaryMul => Opcode::Mul,
					_ => Opcode::Div,
				});
				self.shadow.pop();
				self.shadow.pop();
				let result = self.fresh_temporary();
				self.shadow.push(StackEntry::Var(result));
				Ok(())
			},

			AstKind::Let => self.generate_let(node, context),

			other => anyhow::bail!("Internal error: {other} is not an expression node"),
		}
	}

	/// Generates one operand of a binary operation. A bare integer literal gets a synthetic shadow entry here, so
	/// that the operation's pop-two-push-one bookkeeping stays consistent.
	fn generate_operand(&mut self, node: &AstNode, context: &mut Context) -> anyhow::Result<()> {
		self.generate_expression(node, context)?;
		if node.kind == AstKind::IntLiteral {
			let name = self.fresh_temporary();
			self.shadow.push(StackEntry::Var(name));
		}
		Ok(())
	}
}

/// Renders a human-readable disassembly of a bytecode packet, one operation per line with its byte offset.
///
/// # Errors
/// If the packet contains a byte that isn't an opcode, or an operand is cut short.
pub fn disassemble(bytecode: &[u8]) -> anyhow::Result<String> {
	// Brings `write!` for appending to a string into scope; Infallible for `String`, hence the `.ok()`s.
	use std::fmt::Write as _;

	let mut output = String::new();
	let mut cursor = 0;
	while cursor < bytecode.len() {
		let offset = cursor;
		let byte = bytecode[cursor];
		cursor += 1;
		let Some(opcode) = Opcode::from_repr(byte) else {
			anyhow::bail!("Malformed opcode byte {byte:#04x} at offset {offset}");
		};

		if matches!(opcode, Opcode::Push | Opcode::Read) {
			let Some(operand) = bytecode.get(cursor..cursor + 4) else {
				anyhow::bail!("The {opcode} at offset {offset} is missing its operand");
			};
			let value = i32::from_be_bytes([operand[0], operand[1], operand[2], operand[3]]);
			cursor += 4;
			writeln!(output, "{offset:04} {opcode} {value}").ok();
		} else {
			writeln!(output, "{offset:04} {opcode}").ok();
		}
	}
	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{cursor::TokenCursor, lexer::tokenize, parser};

	fn generate_program(code: &str) -> Vec<u8> {
		let mut context = Context::new("test.hawk", code);
		let tokens = tokenize(code, &mut context);
		let mut cursor = TokenCursor::new(tokens);
		let ast = parser::parse(&mut cursor, &mut context).unwrap().unwrap();
		crate::resolver::resolve(&ast, &mut context).unwrap();
		let mut generator = CodeGenerator::new();
		let bytecode = generator.generate(&ast, &mut context).unwrap();
		assert!(context.diagnostics.is_empty());
		// The program's own block reduced to a single entry for its result.
		assert_eq!(generator.shadow_depth(), 1);
		bytecode
	}

	fn push(value: i32) -> Vec<u8> {
		let mut bytes = vec![Opcode::Push as u8];
		bytes.extend_from_slice(&value.to_be_bytes());
		bytes
	}

	fn read(offset: i32) -> Vec<u8> {
		let mut bytes = vec![Opcode::Read as u8];
		bytes.extend_from_slice(&offset.to_be_bytes());
		bytes
	}

	#[test]
	fn a_single_binding_compiles_to_the_expected_packet() {
		let bytecode = generate_program("let a = 5 do a");
		let mut expected = Vec::new();
		expected.extend(push(FRAME_MARKER));
		expected.extend(push(5));
		expected.extend(read(0));
		expected.push(Opcode::Save as u8);
		expected.push(Opcode::Pop as u8);
		expected.push(Opcode::Pop as u8);
		expected.push(Opcode::Load as u8);
		assert_eq!(bytecode, expected);
	}

	#[test]
	fn read_offsets_count_from_the_top_of_the_shadow_stack() {
		let bytecode = generate_program("let a = 5 b = 3 c = 8 do a + b * c");
		let disassembly = disassemble(&bytecode).unwrap();
		let reads = disassembly.lines().filter(|line| line.contains("READ")).collect::<Vec<_>>();
		// Right-to-left emission: `c` is read first at the top, then `b` from under the copy of `c`, then `a` from
		// under both copies and the multiplication's result.
		assert_eq!(reads.len(), 3);
		assert!(reads[0].ends_with("READ 0"));
		assert!(reads[1].ends_with("READ 2"));
		assert!(reads[2].ends_with("READ 3"));
	}

	#[test]
	fn operators_emit_right_operand_first() {
		let bytecode = generate_program("let a = 5 do a - 2");
		let disassembly = disassemble(&bytecode).unwrap();
		let lines = disassembly.lines().collect::<Vec<_>>();
		// PUSH 255, PUSH 5, then the expression: PUSH 2 (right), READ 1 (left), SUB.
		assert!(lines[2].ends_with("PUSH 2"));
		assert!(lines[3].ends_with("READ 1"));
		assert!(lines[4].ends_with("SUB"));
	}

	#[test]
	fn each_block_opens_with_a_frame_marker_push() {
		let bytecode = generate_program("let a = let b = 5 do b * 2 do a * 2");
		let disassembly = disassemble(&bytecode).unwrap();
		let marker = format!("PUSH {FRAME_MARKER}");
		assert_eq!(disassembly.lines().filter(|line| line.ends_with(&marker)).count(), 2);
	}

	#[test]
	fn do_emits_one_pop_per_local_then_load() {
		let bytecode = generate_program("let a = 5 b = 3 do b");
		let disassembly = disassemble(&bytecode).unwrap();
		// Locals above the frame at SAVE time: a, b, and the copy of b. The last POP clears the frame marker.
		let pops = disassembly.lines().filter(|line| line.ends_with("POP")).count();
		assert_eq!(pops, 3);
		assert!(disassembly.trim_end().ends_with("LOAD"));
	}

	#[test]
	fn a_missing_do_block_is_a_codegen_invariant() {
		use crate::span::Span;
		let mut context = Context::new("test.hawk", "");
		let orphan = AstNode::new(AstKind::Let, Span::at_start());
		let result = CodeGenerator::new().generate(&orphan, &mut context);
		assert!(result.is_err());
		assert!(context.diagnostics.has_errors());
	}

	#[test]
	fn disassembly_round_trips_each_opcode() {
		let bytecode = generate_program("let a = 5 do a + a");
		let disassembly = disassemble(&bytecode).unwrap();
		for opcode in ["PUSH", "READ", "ADD", "SAVE", "POP", "LOAD"] {
			assert!(disassembly.contains(opcode), "missing {opcode} in:\n{disassembly}");
		}
	}

	#[test]
	fn disassembly_rejects_unknown_bytes() {
		assert!(disassemble(&[9]).is_err());
		assert!(disassemble(&[Opcode::Push as u8, 0, 0]).is_err());
	}
}
