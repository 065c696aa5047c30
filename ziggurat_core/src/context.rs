use std::collections::HashMap;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Serialize;

use crate::Value;
use crate::ZigguratError;
use crate::ZigguratResult;

/// The names visible to a template while it renders.
///
/// The caller owns the context. Rendering borrows it mutably so that `@for@`
/// can bind its loop variable; the previous binding is put back once the loop
/// ends.
#[derive(Debug, Clone, Default, PartialEq, Deref, DerefMut)]
pub struct Context(
	#[deref]
	#[deref_mut]
	HashMap<String, Value>,
);

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a context from a serializable map or struct. Top-level fields
	/// become names.
	pub fn from_serialize(value: &impl Serialize) -> ZigguratResult<Self> {
		match Value::from_serialize(value)? {
			Value::Map(entries) => Ok(entries.into_iter().collect()),
			other => {
				Err(ZigguratError::InvalidValue(format!(
					"a context must be built from a map, found `{}`",
					other.type_name()
				)))
			}
		}
	}

	#[must_use]
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(name.into(), value.into());
		self
	}

	/// Resolve a dotted path such as `user.address.city`.
	///
	/// The first segment names a context entry; each following segment indexes
	/// a map by key or reads an attribute of an object.
	pub fn resolve(&self, path: &str) -> ZigguratResult<Value> {
		let mut segments = path.split('.');
		let first = segments.next().unwrap_or(path);

		let mut value = self
			.0
			.get(first)
			.cloned()
			.ok_or_else(|| ZigguratError::UndefinedName(first.to_string()))?;

		for segment in segments {
			value = value.get_segment(segment, path)?;
		}

		Ok(value)
	}

	/// Bind `name` to `value`, returning whatever was bound before.
	pub fn bind(&mut self, name: &str, value: Value) -> Option<Value> {
		self.0.insert(name.to_string(), value)
	}

	/// Undo a [`bind`](Self::bind): put back the previous value, or remove the
	/// name when it was unbound.
	pub fn restore(&mut self, name: &str, previous: Option<Value>) {
		match previous {
			Some(value) => {
				self.0.insert(name.to_string(), value);
			}
			None => {
				self.0.remove(name);
			}
		}
	}

	pub fn into_inner(self) -> HashMap<String, Value> {
		self.0
	}
}

impl From<HashMap<String, Value>> for Context {
	fn from(entries: HashMap<String, Value>) -> Self {
		Self(entries)
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Context {
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		self.0.extend(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into())),
		);
	}
}
