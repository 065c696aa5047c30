use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Display;
use std::sync::Arc;

use float_cmp::approx_eq;
use serde::Serialize;

use crate::ZigguratError;
use crate::ZigguratResult;

/// A record with named fields that templates can read with dotted paths.
///
/// Implement this for host types that should be visible to templates without
/// converting them into a [`Value::Map`] first.
pub trait Object: Debug + Send + Sync {
	/// The name reported in type errors.
	fn type_name(&self) -> &str;

	/// The value of the attribute `name`, or `None` when it does not exist.
	fn get_attr(&self, name: &str) -> Option<Value>;

	/// The elements produced when the object is used in `@for@`. Objects are
	/// not iterable unless they override this.
	fn iterate(&self) -> Option<Vec<Value>> {
		None
	}

	fn is_truthy(&self) -> bool {
		true
	}

	/// Write the canonical string form of the object.
	fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<{}>", self.type_name())
	}
}

/// A value stored in a render [`Context`](crate::Context).
#[derive(Debug, Clone, Default)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	List(Vec<Value>),
	Map(BTreeMap<String, Value>),
	Object(Arc<dyn Object>),
}

impl Value {
	/// Convert any serializable value, going through `serde_json`.
	pub fn from_serialize(value: &impl Serialize) -> ZigguratResult<Self> {
		serde_json::to_value(value)
			.map(Self::from)
			.map_err(|e| ZigguratError::InvalidValue(e.to_string()))
	}

	pub fn object(object: impl Object + 'static) -> Self {
		Self::Object(Arc::new(object))
	}

	pub fn type_name(&self) -> &str {
		match self {
			Self::Null => "none",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Float(_) => "float",
			Self::String(_) => "string",
			Self::List(_) => "list",
			Self::Map(_) => "map",
			Self::Object(object) => object.type_name(),
		}
	}

	/// Truthiness used by `@if@`.
	///
	/// | variant  | falsy when                    |
	/// | -------- | ----------------------------- |
	/// | `Null`   | always                        |
	/// | `Bool`   | `false`                       |
	/// | `Int`    | `0`                           |
	/// | `Float`  | `0.0`                         |
	/// | `String` | empty                         |
	/// | `List`   | empty                         |
	/// | `Map`    | empty                         |
	/// | `Object` | [`Object::is_truthy`] is false |
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Bool(value) => *value,
			Self::Int(value) => *value != 0,
			Self::Float(value) => *value != 0.0,
			Self::String(value) => !value.is_empty(),
			Self::List(items) => !items.is_empty(),
			Self::Map(entries) => !entries.is_empty(),
			Self::Object(object) => object.is_truthy(),
		}
	}

	/// Look up one segment of a dotted path: a key for maps, an attribute for
	/// objects. `path` is only used for error messages.
	pub fn get_segment(&self, segment: &str, path: &str) -> ZigguratResult<Value> {
		let found = match self {
			Self::Map(entries) => entries.get(segment).cloned(),
			Self::Object(object) => object.get_attr(segment),
			other => {
				return Err(ZigguratError::NotAContainer {
					path: path.to_string(),
					segment: segment.to_string(),
					type_name: other.type_name().to_string(),
				});
			}
		};

		found.ok_or_else(|| {
			ZigguratError::MissingAttribute {
				path: path.to_string(),
				segment: segment.to_string(),
			}
		})
	}

	/// The elements visited by `@for@`: list items, the characters of a
	/// string, or the keys of a map in order.
	pub fn iterate(&self, name: &str) -> ZigguratResult<Vec<Value>> {
		let items = match self {
			Self::List(items) => Some(items.clone()),
			Self::String(value) => Some(value.chars().map(|ch| Self::String(ch.into())).collect()),
			Self::Map(entries) => Some(entries.keys().cloned().map(Self::String).collect()),
			Self::Object(object) => object.iterate(),
			Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) => None,
		};

		items.ok_or_else(|| {
			ZigguratError::NotIterable {
				name: name.to_string(),
				type_name: self.type_name().to_string(),
			}
		})
	}

	/// The text appended to the output for this value. Strings are used as
	/// they are; everything else goes through [`Display`].
	pub fn to_output(&self) -> String {
		match self {
			Self::String(value) => value.clone(),
			other => other.to_string(),
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => write!(f, "none"),
			Self::Bool(value) => write!(f, "{value}"),
			Self::Int(value) => write!(f, "{value}"),
			// Integral floats keep a decimal place so `1.0` does not read as an int.
			Self::Float(value) if value.is_finite() && value.fract() == 0.0 => write!(f, "{value:.1}"),
			Self::Float(value) => write!(f, "{value}"),
			Self::String(value) => write!(f, "{value}"),
			Self::List(items) => {
				write!(f, "[")?;
				for (index, item) in items.iter().enumerate() {
					if index > 0 {
						write!(f, ", ")?;
					}
					write_nested(f, item)?;
				}
				write!(f, "]")
			}
			Self::Map(entries) => {
				write!(f, "{{")?;
				for (index, (key, item)) in entries.iter().enumerate() {
					if index > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{key:?}: ")?;
					write_nested(f, item)?;
				}
				write!(f, "}}")
			}
			Self::Object(object) => object.render(f),
		}
	}
}

/// Strings inside lists and maps are quoted so `["a, b"]` stays readable.
fn write_nested(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
	match value {
		Value::String(inner) => write!(f, "{inner:?}"),
		other => write!(f, "{other}"),
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(value), Self::Bool(other_value)) => value == other_value,
			(Self::Int(value), Self::Int(other_value)) => value == other_value,
			(Self::Float(value), Self::Float(other_value)) => {
				approx_eq!(f64, *value, *other_value, ulps = 2)
			}
			(Self::String(value), Self::String(other_value)) => value == other_value,
			(Self::List(items), Self::List(other_items)) => items == other_items,
			(Self::Map(entries), Self::Map(other_entries)) => entries == other_entries,
			(Self::Object(object), Self::Object(other_object)) => Arc::ptr_eq(object, other_object),
			_ => false,
		}
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(value) => Self::Bool(value),
			serde_json::Value::Number(number) => {
				if let Some(int) = number.as_i64() {
					Self::Int(int)
				} else {
					Self::Float(number.as_f64().unwrap_or_default())
				}
			}
			serde_json::Value::String(value) => Self::String(value),
			serde_json::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
			serde_json::Value::Object(entries) => {
				Self::Map(
					entries
						.into_iter()
						.map(|(key, value)| (key, Self::from(value)))
						.collect(),
				)
			}
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

macro_rules! impl_from_int {
	($($ty:ty),* $(,)?) => {
		$(
			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Self::Int(i64::from(value))
				}
			}
		)*
	};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(items: Vec<T>) -> Self {
		Self::List(items.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
	fn from(entries: BTreeMap<K, V>) -> Self {
		Self::Map(
			entries
				.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self::Map(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}
