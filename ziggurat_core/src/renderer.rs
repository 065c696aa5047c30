use std::collections::HashMap;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::Argument;
use crate::Block;
use crate::Call;
use crate::Context;
use crate::FileLoader;
use crate::For;
use crate::If;
use crate::Include;
use crate::Loader;
use crate::Lookup;
use crate::Macro;
use crate::Node;
use crate::Transforms;
use crate::Value;
use crate::ZigguratError;
use crate::ZigguratResult;
use crate::parse;

/// Rendered output of included templates, keyed by the resolved and
/// lexically normalized include path. One cache lives for one top-level
/// render.
pub type IncludeCache = HashMap<PathBuf, String>;

/// Macros declared so far in a render, keyed by name.
pub type MacroTable<'t> = HashMap<String, MacroDefinition<'t>>;

/// A declared macro. Borrows its parameters and body from the tree that
/// declared it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroDefinition<'t> {
	pub parameters: &'t [String],
	pub body: &'t Block,
}

impl<'t> From<&'t Macro> for MacroDefinition<'t> {
	fn from(declaration: &'t Macro) -> Self {
		Self {
			parameters: &declaration.parameters,
			body: &declaration.body,
		}
	}
}

/// The read-only inputs of a render.
#[derive(Debug, Clone, Copy)]
pub struct RenderEnv<'r> {
	pub transforms: &'r Transforms,
	pub loader: &'r dyn Loader,
	/// Directory that `@include@` paths are resolved against. Includes fail
	/// when this is `None`.
	pub base_dir: Option<&'r Path>,
}

impl<'r> RenderEnv<'r> {
	pub fn new(transforms: &'r Transforms, loader: &'r dyn Loader) -> Self {
		Self {
			transforms,
			loader,
			base_dir: None,
		}
	}

	#[must_use]
	pub fn with_base_dir(mut self, base_dir: Option<&'r Path>) -> Self {
		self.base_dir = base_dir;
		self
	}
}

/// Render `tree` against `context`, loading includes from the filesystem.
pub fn render(
	tree: &Block,
	context: &mut Context,
	transforms: &Transforms,
	base_dir: Option<&Path>,
) -> ZigguratResult<String> {
	let env = RenderEnv::new(transforms, &FileLoader).with_base_dir(base_dir);
	render_with_env(tree, context, env)
}

/// Render `tree` in a fresh session: a new include cache and macro table
/// shared by every nested include and macro call.
pub fn render_with_env(
	tree: &Block,
	context: &mut Context,
	env: RenderEnv<'_>,
) -> ZigguratResult<String> {
	let mut includes = IncludeCache::new();
	let mut macros = MacroTable::new();
	let mut renderer = Renderer::new(env, context, &mut includes, &mut macros);
	renderer.render_block(tree)?;

	Ok(renderer.finish())
}

/// Walks a syntax tree depth first and collects the output.
///
/// Macro calls render their body with a new `Renderer` that shares this
/// renderer's include cache and macro table. Includes get a new `Renderer`
/// with its own macro table but the same include cache and context.
/// Recursion depth follows template nesting plus include and macro call
/// depth; a macro that calls itself unconditionally will overflow the stack.
#[derive(Debug)]
pub struct Renderer<'r, 't> {
	env: RenderEnv<'r>,
	context: &'r mut Context,
	includes: &'r mut IncludeCache,
	macros: &'r mut MacroTable<'t>,
	output: String,
}

impl<'r, 't> Renderer<'r, 't> {
	pub fn new(
		env: RenderEnv<'r>,
		context: &'r mut Context,
		includes: &'r mut IncludeCache,
		macros: &'r mut MacroTable<'t>,
	) -> Self {
		Self {
			env,
			context,
			includes,
			macros,
			output: String::new(),
		}
	}

	/// Output rendered so far.
	pub fn output(&self) -> &str {
		&self.output
	}

	pub fn finish(self) -> String {
		self.output
	}

	pub fn macros(&self) -> &MacroTable<'t> {
		&*self.macros
	}

	pub fn render_block(&mut self, block: &'t Block) -> ZigguratResult<()> {
		for node in &block.nodes {
			self.render_node(node)?;
		}

		Ok(())
	}

	pub fn render_node(&mut self, node: &'t Node) -> ZigguratResult<()> {
		match node {
			Node::Text(text) => {
				self.output.push_str(&text.content);
				Ok(())
			}
			Node::Lookup(lookup) => self.render_lookup(lookup),
			Node::If(if_stmt) => self.render_if(if_stmt),
			Node::For(for_loop) => self.render_for(for_loop),
			Node::Include(include) => self.render_include(include),
			Node::Macro(declaration) => {
				self.declare_macro(declaration);
				Ok(())
			}
			Node::Call(call) => self.render_call(call),
			Node::Block(block) => self.render_block(block),
		}
	}

	fn render_lookup(&mut self, lookup: &Lookup) -> ZigguratResult<()> {
		let text = self.evaluate(lookup)?.to_output();
		self.output.push_str(&text);

		Ok(())
	}

	/// Resolve a lookup. Without transforms the value is returned as is;
	/// otherwise the value is converted to text and each transform is applied
	/// in order.
	fn evaluate(&self, lookup: &Lookup) -> ZigguratResult<Value> {
		let value = self.context.resolve(&lookup.path)?;

		if lookup.transforms.is_empty() {
			return Ok(value);
		}

		let mut text = value.to_output();
		for name in &lookup.transforms {
			text = self.env.transforms.apply(name, &text)?;
		}

		Ok(Value::String(text))
	}

	fn render_if(&mut self, if_stmt: &'t If) -> ZigguratResult<()> {
		if self.context.resolve(&if_stmt.condition)?.is_truthy() {
			self.render_block(&if_stmt.consequence)
		} else {
			self.render_block(&if_stmt.alternative)
		}
	}

	fn render_for(&mut self, for_loop: &'t For) -> ZigguratResult<()> {
		let items = self
			.context
			.resolve(&for_loop.iterator)?
			.iterate(&for_loop.iterator)?;
		let previous = self.context.get(&for_loop.name).cloned();

		let mut result = Ok(());
		for item in items {
			self.context.bind(&for_loop.name, item);
			result = self.render_block(&for_loop.body);
			if result.is_err() {
				break;
			}
		}

		self.context.restore(&for_loop.name, previous);
		result
	}

	fn render_include(&mut self, include: &Include) -> ZigguratResult<()> {
		let Some(base_dir) = self.env.base_dir else {
			return Err(ZigguratError::MissingBaseDirectory(include.source.clone()));
		};

		let path = normalize_path(&base_dir.join(&include.source));
		if let Some(cached) = self.includes.get(&path) {
			tracing::debug!(source = %include.source, path = %path.display(), "include cache hit");
			self.output.push_str(cached);
			return Ok(());
		}

		tracing::debug!(source = %include.source, path = %path.display(), "include cache miss");

		let source = self.env.loader.load(&path)?;
		let tree = parse(&source)?;
		let nested_base = path.parent();
		let env = RenderEnv {
			transforms: self.env.transforms,
			loader: self.env.loader,
			base_dir: nested_base,
		};

		let mut macros = MacroTable::new();
		let mut renderer = Renderer::new(env, &mut *self.context, &mut *self.includes, &mut macros);
		renderer.render_block(&tree)?;
		let rendered = renderer.finish();

		self.output.push_str(&rendered);
		self.includes.insert(path, rendered);

		Ok(())
	}

	fn declare_macro(&mut self, declaration: &'t Macro) {
		tracing::debug!(
			name = %declaration.name,
			parameters = declaration.parameters.len(),
			"macro declared"
		);
		self.macros
			.insert(declaration.name.clone(), MacroDefinition::from(declaration));
	}

	fn render_call(&mut self, call: &Call) -> ZigguratResult<()> {
		let definition = *self
			.macros
			.get(&call.name)
			.ok_or_else(|| ZigguratError::UnknownMacro(call.name.clone()))?;

		let mut scope = Context::new();
		for parameter in definition.parameters {
			let value = match call.argument(parameter) {
				Some(Argument::Literal(literal)) => Value::String(literal.clone()),
				Some(Argument::Lookup(lookup)) => self.evaluate(lookup)?,
				None => {
					return Err(ZigguratError::MissingArgument {
						name: call.name.clone(),
						parameter: parameter.clone(),
					});
				}
			};
			scope.insert(parameter.clone(), value);
		}

		for argument in &call.arguments {
			if !definition.parameters.contains(&argument.name) {
				tracing::debug!(
					name = %call.name,
					argument = %argument.name,
					"ignoring argument without a matching parameter"
				);
			}
		}

		let mut renderer = Renderer::new(self.env, &mut scope, &mut *self.includes, &mut *self.macros);
		renderer.render_block(definition.body)?;
		let rendered = renderer.finish();
		self.output.push_str(&rendered);

		Ok(())
	}
}

/// Drop `.` components and fold `..` into the preceding normal component
/// without touching the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
					normalized.pop();
				} else {
					normalized.push(component);
				}
			}
			other => normalized.push(other),
		}
	}

	normalized
}
