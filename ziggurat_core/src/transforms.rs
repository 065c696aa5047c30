use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ZigguratError;
use crate::ZigguratResult;

/// A named single-argument string function, applied with `{name|transform}`.
pub type TransformFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The transforms available to a render.
///
/// [`Transforms::default`] starts with the built-ins `upper`, `lower` and
/// `capitalize`. Entries registered later stay until they are removed.
#[derive(Clone)]
pub struct Transforms {
	entries: HashMap<String, TransformFn>,
}

impl Default for Transforms {
	fn default() -> Self {
		let mut transforms = Self::empty();
		transforms.register("upper", str::to_uppercase);
		transforms.register("lower", str::to_lowercase);
		transforms.register("capitalize", capitalize);
		transforms
	}
}

impl Transforms {
	/// A registry without any built-ins.
	pub fn empty() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}

	/// Register `transform` under `name`, replacing any existing entry.
	pub fn register<F>(&mut self, name: impl Into<String>, transform: F) -> &mut Self
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		self.entries.insert(name.into(), Arc::new(transform));
		self
	}

	pub fn remove(&mut self, name: &str) -> Option<TransformFn> {
		self.entries.remove(name)
	}

	/// Make `target` available under a second name.
	pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> ZigguratResult<()> {
		let alias = alias.into();
		let transform = self.entries.get(target).cloned().ok_or_else(|| {
			ZigguratError::UnknownAliasTarget {
				alias: alias.clone(),
				target: target.to_string(),
			}
		})?;
		self.entries.insert(alias, transform);

		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&TransformFn> {
		self.entries.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Run the transform `name` over `input`.
	pub fn apply(&self, name: &str, input: &str) -> ZigguratResult<String> {
		let transform = self
			.get(name)
			.ok_or_else(|| ZigguratError::UnknownTransform(name.to_string()))?;

		Ok(transform(input))
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

impl fmt::Debug for Transforms {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Transforms")
			.field("names", &self.names())
			.finish()
	}
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(input: &str) -> String {
	let mut chars = input.chars();
	let Some(first) = chars.next() else {
		return String::new();
	};

	first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
}
