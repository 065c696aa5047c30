use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Block;
use crate::Context;
use crate::FileLoader;
use crate::Loader;
use crate::RenderEnv;
use crate::Transforms;
use crate::ZigguratResult;
use crate::parse;
use crate::render_with_env;

/// A parsed template together with everything needed to render it.
///
/// ```rust,no_run
/// use ziggurat_core::Context;
/// use ziggurat_core::Template;
///
/// let template = Template::from_path("templates/greeting.txt").unwrap();
/// let mut context = Context::new().with("name", "World");
/// let output = template.render(&mut context).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Template {
	tree: Block,
	base_dir: Option<PathBuf>,
	transforms: Transforms,
	loader: Arc<dyn Loader>,
}

impl Template {
	/// Load and parse the template at `path`. Includes resolve relative to
	/// the directory containing it.
	pub fn from_path(path: impl AsRef<Path>) -> ZigguratResult<Self> {
		Self::from_path_with_loader(path, Arc::new(FileLoader))
	}

	/// Like [`from_path`](Self::from_path), reading the template and its
	/// includes through `loader`.
	pub fn from_path_with_loader(
		path: impl AsRef<Path>,
		loader: Arc<dyn Loader>,
	) -> ZigguratResult<Self> {
		let path = path.as_ref();
		let source = loader.load(path)?;
		let tree = parse(&source)?;

		Ok(Self {
			tree,
			base_dir: path.parent().map(Path::to_path_buf),
			transforms: Transforms::default(),
			loader,
		})
	}

	/// Parse a template held in memory. It has no base directory, so
	/// `@include@` fails unless one is set with
	/// [`with_base_dir`](Self::with_base_dir).
	pub fn from_source(source: impl AsRef<str>) -> ZigguratResult<Self> {
		Ok(Self {
			tree: parse(source)?,
			base_dir: None,
			transforms: Transforms::default(),
			loader: Arc::new(FileLoader),
		})
	}

	#[must_use]
	pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
		self.base_dir = Some(base_dir.into());
		self
	}

	#[must_use]
	pub fn with_loader(mut self, loader: Arc<dyn Loader>) -> Self {
		self.loader = loader;
		self
	}

	#[must_use]
	pub fn with_transforms(mut self, transforms: Transforms) -> Self {
		self.transforms = transforms;
		self
	}

	/// Register a transform for this template, replacing any existing one
	/// with the same name.
	pub fn register_transform<F>(&mut self, name: impl Into<String>, transform: F) -> &mut Self
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		self.transforms.register(name, transform);
		self
	}

	pub fn tree(&self) -> &Block {
		&self.tree
	}

	pub fn base_dir(&self) -> Option<&Path> {
		self.base_dir.as_deref()
	}

	pub fn transforms(&self) -> &Transforms {
		&self.transforms
	}

	pub fn transforms_mut(&mut self) -> &mut Transforms {
		&mut self.transforms
	}

	/// Render against `context`. Each call starts a new render session with
	/// an empty include cache and macro table.
	pub fn render(&self, context: &mut Context) -> ZigguratResult<String> {
		let env =
			RenderEnv::new(&self.transforms, self.loader.as_ref()).with_base_dir(self.base_dir());
		render_with_env(&self.tree, context, env)
	}
}
