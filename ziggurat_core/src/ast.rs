//! The syntax tree shared by the parser and the renderer.
//!
//! Trees are built once by [`parse`](crate::parse) and only read afterwards.
//! Every container owns its children, so a tree is always finite and acyclic.

/// A sequence of nodes rendered one after another. Used as the root of a
/// template and as the body of `@if@`, `@for@` and `@macro@`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
	pub nodes: Vec<Node>,
}

impl Block {
	pub fn new(nodes: Vec<Node>) -> Self {
		Self { nodes }
	}

	/// An empty block, used as the alternative of an `@if@` without `@else@`.
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// A single node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Text(Text),
	Lookup(Lookup),
	If(If),
	For(For),
	Include(Include),
	Macro(Macro),
	Call(Call),
	Block(Block),
}

/// Literal output with escape sequences already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
	pub content: String,
}

/// `{path|transform|...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
	/// Dotted path, e.g. `user.name`.
	pub path: String,
	/// Transform names, applied left to right.
	pub transforms: Vec<String>,
}

impl Lookup {
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			transforms: vec![],
		}
	}

	#[must_use]
	pub fn with_transforms<I, S>(mut self, transforms: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.transforms = transforms.into_iter().map(Into::into).collect();
		self
	}
}

/// `@if condition@ ... [@else@ ...] @endif@`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
	pub condition: String,
	pub consequence: Block,
	/// Empty when the source had no `@else@`.
	pub alternative: Block,
}

/// `@for name in iterator@ ... @endfor@`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct For {
	/// The loop variable bound for each element.
	pub name: String,
	pub iterator: String,
	pub body: Block,
}

/// `@include path@`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
	pub source: String,
}

/// `@macro name(a, b)@ ... @endmacro@`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
	pub name: String,
	pub parameters: Vec<String>,
	pub body: Block,
}

/// `{!name a="literal" b=lookup}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
	pub name: String,
	/// Arguments in source order. A repeated name keeps its last value.
	pub arguments: Vec<CallArgument>,
}

impl Call {
	/// The argument bound to `name`, if any. Later arguments shadow earlier
	/// ones with the same name.
	pub fn argument(&self, name: &str) -> Option<&Argument> {
		self.arguments
			.iter()
			.rev()
			.find(|argument| argument.name == name)
			.map(|argument| &argument.value)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
	pub name: String,
	pub value: Argument,
}

impl CallArgument {
	pub fn new(name: impl Into<String>, value: Argument) -> Self {
		Self {
			name: name.into(),
			value,
		}
	}
}

/// The value passed for a macro parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
	/// A quoted string, fixed at parse time.
	Literal(String),
	/// A bare name, resolved against the caller's context when the call is
	/// rendered.
	Lookup(Lookup),
}

impl From<&str> for Argument {
	fn from(value: &str) -> Self {
		Self::Literal(value.to_string())
	}
}

impl From<Lookup> for Argument {
	fn from(value: Lookup) -> Self {
		Self::Lookup(value)
	}
}

macro_rules! impl_from_for_node {
	($($variant:ident),* $(,)?) => {
		$(
			impl From<$variant> for Node {
				fn from(node: $variant) -> Self {
					Node::$variant(node)
				}
			}
		)*
	};
}

impl_from_for_node!(Text, Lookup, If, For, Include, Macro, Call, Block);

impl From<&str> for Node {
	fn from(content: &str) -> Self {
		Node::Text(Text {
			content: content.to_string(),
		})
	}
}
