//! Indented dump of a syntax tree, for debugging and tests.
//!
//! ```text
//! Block([
//!   Text("Hello ")
//!   Lookup(name | upper)
//! ])
//! ```

use std::fmt;

use crate::Argument;
use crate::Block;
use crate::Call;
use crate::Lookup;
use crate::Node;

/// Print `block` as an indented, parenthesised tree without a trailing
/// newline.
pub fn print_tree(block: &Block) -> String {
	let mut printer = TreePrinter::default();
	printer.block(block);
	printer.finish()
}

/// Print a single node. Useful when a test only builds part of a tree.
pub fn print_node(node: &Node) -> String {
	let mut printer = TreePrinter::default();
	printer.node(node);
	printer.finish()
}

impl fmt::Display for Block {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&print_tree(self))
	}
}

#[derive(Default)]
struct TreePrinter {
	depth: usize,
	output: String,
}

impl TreePrinter {
	fn finish(self) -> String {
		self.output.trim_end().to_string()
	}

	fn line(&mut self, text: &str) {
		for _ in 0..self.depth {
			self.output.push_str("  ");
		}
		self.output.push_str(text);
		self.output.push('\n');
	}

	fn nested(&mut self, open: &str, close: &str, body: impl FnOnce(&mut Self)) {
		self.line(open);
		self.depth += 1;
		body(self);
		self.depth -= 1;
		self.line(close);
	}

	fn block(&mut self, block: &Block) {
		self.nested("Block([", "])", |printer| {
			for node in &block.nodes {
				printer.node(node);
			}
		});
	}

	fn node(&mut self, node: &Node) {
		match node {
			Node::Block(block) => self.block(block),
			Node::Text(text) => self.line(&format!("Text({:?})", text.content)),
			Node::Lookup(lookup) => self.line(&lookup_label(lookup)),
			Node::Include(include) => self.line(&format!("Include({})", include.source)),
			Node::If(if_stmt) => {
				self.nested("If(", ")", |printer| {
					printer.line(&format!("condition={}", if_stmt.condition));
					printer.block(&if_stmt.consequence);
					printer.block(&if_stmt.alternative);
				});
			}
			Node::For(for_loop) => {
				self.nested("For(", ")", |printer| {
					printer.line(&format!("name={}", for_loop.name));
					printer.line(&format!("iterator={}", for_loop.iterator));
					printer.block(&for_loop.body);
				});
			}
			Node::Macro(declaration) => {
				self.nested("Macro(", ")", |printer| {
					printer.line(&format!("name={}", declaration.name));
					printer.line(&format!(
						"parameters=[{}]",
						declaration.parameters.join(", ")
					));
					printer.block(&declaration.body);
				});
			}
			Node::Call(call) => self.call(call),
		}
	}

	fn call(&mut self, call: &Call) {
		self.nested("Call(", ")", |printer| {
			printer.line(&format!("name={}", call.name));
			for argument in &call.arguments {
				let value = match &argument.value {
					Argument::Literal(literal) => format!("{literal:?}"),
					Argument::Lookup(lookup) => lookup_label(lookup),
				};
				printer.line(&format!("{}={value}", argument.name));
			}
		});
	}
}

fn lookup_label(lookup: &Lookup) -> String {
	if lookup.transforms.is_empty() {
		format!("Lookup({})", lookup.path)
	} else {
		format!("Lookup({} | {})", lookup.path, lookup.transforms.join(" | "))
	}
}
