use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Context;
use crate::Transforms;
use crate::Value;
use crate::ZigguratError;
use crate::ZigguratResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["ziggurat.toml", ".ziggurat.toml", ".config/ziggurat.toml"];

/// Data source entry for a `[data]` namespace.
///
/// A plain string is a path whose extension picks the format:
///
/// ```toml
/// [data]
/// site = "site.json"
/// ```
///
/// Typed entries name the format explicitly:
///
/// ```toml
/// [data]
/// release = { path = "release-info", format = "yaml" }
/// ```
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum DataSource {
	Path(PathBuf),
	Typed(TypedDataSource),
}

impl DataSource {
	pub fn path(&self) -> &Path {
		match self {
			Self::Path(path) => path.as_path(),
			Self::Typed(typed) => typed.path.as_path(),
		}
	}

	/// The explicit format, or the lowercased file extension.
	pub fn format(&self) -> String {
		match self {
			Self::Path(path) => format_from_extension(path),
			Self::Typed(typed) => typed.format.trim().to_ascii_lowercase(),
		}
	}
}

/// Typed data source configuration for `[data]` entries.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct TypedDataSource {
	pub path: PathBuf,
	pub format: String,
}

/// Configuration loaded from a `ziggurat.toml` file.
///
/// ```toml
/// [data]
/// site = "site.json"
/// release = { path = "release-info", format = "yaml" }
///
/// [transforms]
/// shout = "upper"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ZigguratConfig {
	/// Map of namespace name to data file. Each file is loaded into the
	/// render context under its namespace.
	#[serde(default)]
	pub data: HashMap<String, DataSource>,
	/// Map of alias to an existing transform name.
	#[serde(default)]
	pub transforms: BTreeMap<String, String>,
}

impl ZigguratConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is no config file.
	pub fn load(root: &Path) -> ZigguratResult<Option<ZigguratConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;

		Self::from_toml(&content).map(Some)
	}

	pub fn from_toml(content: &str) -> ZigguratResult<ZigguratConfig> {
		toml::from_str(content).map_err(|e| ZigguratError::ConfigParse(e.to_string()))
	}

	/// Read each data file, keyed by namespace.
	pub fn load_data(&self, root: &Path) -> ZigguratResult<BTreeMap<String, Value>> {
		let mut data = BTreeMap::new();

		for (namespace, source) in &self.data {
			let value = load_data_file(&root.join(source.path()), &source.format())?;
			data.insert(namespace.clone(), value);
		}

		Ok(data)
	}

	/// Register every `[transforms]` alias.
	pub fn apply_transforms(&self, transforms: &mut Transforms) -> ZigguratResult<()> {
		for (alias, target) in &self.transforms {
			transforms.alias(alias.clone(), target)?;
		}

		Ok(())
	}

	/// A context holding every data namespace.
	pub fn load_context(&self, root: &Path) -> ZigguratResult<Context> {
		Ok(self.load_data(root)?.into_iter().collect())
	}
}

/// Load a single data file. The format is one of `text`, `json`, `toml`,
/// `yaml`, `yml`, `kdl` or `ini`.
pub fn load_data_file(path: &Path, format: &str) -> ZigguratResult<Value> {
	let source = DataFileSource {
		path: path.display().to_string(),
	};
	let content = std::fs::read_to_string(path).map_err(|e| source.error(e))?;

	source.parse(&content, format)
}

/// The data format implied by a path's extension.
pub fn format_from_extension(path: &Path) -> String {
	path.extension()
		.and_then(|e| e.to_str())
		.unwrap_or("")
		.to_ascii_lowercase()
}

/// A data file being decoded. Only carries the path for error messages.
struct DataFileSource {
	path: String,
}

impl DataFileSource {
	fn error(&self, reason: impl ToString) -> ZigguratError {
		ZigguratError::DataFile {
			path: self.path.clone(),
			reason: reason.to_string(),
		}
	}

	fn parse(&self, content: &str, format: &str) -> ZigguratResult<Value> {
		match format {
			"text" | "string" | "raw" | "txt" => Ok(Value::String(content.to_string())),
			"json" => {
				serde_json::from_str::<serde_json::Value>(content)
					.map(Value::from)
					.map_err(|e| self.error(e))
			}
			"toml" => {
				let table: toml::Value = toml::from_str(content).map_err(|e| self.error(e))?;
				self.toml_value(table)
			}
			"yaml" | "yml" => {
				serde_yaml_ng::from_str::<serde_json::Value>(content)
					.map(Value::from)
					.map_err(|e| self.error(e))
			}
			"kdl" => {
				let document: kdl::KdlDocument = content
					.parse()
					.map_err(|e: kdl::KdlError| self.error(e))?;
				self.kdl_document(&document)
			}
			"ini" => {
				serde_ini::from_str::<serde_json::Value>(content)
					.map(Value::from)
					.map_err(|e| self.error(e))
			}
			other => Err(ZigguratError::UnsupportedDataFormat(other.to_string())),
		}
	}

	/// NaN and infinities have no template representation.
	fn float(&self, value: f64) -> ZigguratResult<Value> {
		if value.is_finite() {
			return Ok(Value::Float(value));
		}

		Err(ZigguratError::UnconvertibleFloat {
			path: self.path.clone(),
			value: value.to_string(),
		})
	}

	/// Integers stay integers so that `{count}` renders as `3`, not `3.0`.
	/// Datetimes become their TOML string form.
	fn toml_value(&self, value: toml::Value) -> ZigguratResult<Value> {
		Ok(match value {
			toml::Value::String(text) => Value::String(text),
			toml::Value::Integer(int) => Value::Int(int),
			toml::Value::Float(float) => self.float(float)?,
			toml::Value::Boolean(flag) => Value::Bool(flag),
			toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
			toml::Value::Array(items) => {
				Value::List(
					items
						.into_iter()
						.map(|item| self.toml_value(item))
						.collect::<ZigguratResult<_>>()?,
				)
			}
			toml::Value::Table(table) => {
				Value::Map(
					table
						.into_iter()
						.map(|(key, item)| -> ZigguratResult<(String, Value)> {
							Ok((key, self.toml_value(item)?))
						})
						.collect::<ZigguratResult<_>>()?,
				)
			}
		})
	}

	/// Each top-level node becomes a key.
	fn kdl_document(&self, document: &kdl::KdlDocument) -> ZigguratResult<Value> {
		let entries = document
			.nodes()
			.iter()
			.map(|node| -> ZigguratResult<(String, Value)> {
				Ok((node.name().value().to_string(), self.kdl_node(node)?))
			})
			.collect::<ZigguratResult<BTreeMap<_, _>>>()?;

		Ok(Value::Map(entries))
	}

	/// A node with children is a map. Otherwise its entries decide the shape:
	/// none is `none`, a single positional value is that value, only named
	/// properties form a map and anything else is a list.
	fn kdl_node(&self, node: &kdl::KdlNode) -> ZigguratResult<Value> {
		if let Some(children) = node.children() {
			return self.kdl_document(children);
		}

		let entries = node.entries();
		match entries {
			[] => Ok(Value::Null),
			[single] if single.name().is_none() => self.kdl_value(single.value()),
			_ if entries.iter().all(|entry| entry.name().is_some()) => {
				let mut properties = BTreeMap::new();
				for entry in entries {
					if let Some(name) = entry.name() {
						properties.insert(name.value().to_string(), self.kdl_value(entry.value())?);
					}
				}
				Ok(Value::Map(properties))
			}
			_ => {
				entries
					.iter()
					.map(|entry| self.kdl_value(entry.value()))
					.collect::<ZigguratResult<Vec<_>>>()
					.map(Value::List)
			}
		}
	}

	fn kdl_value(&self, value: &kdl::KdlValue) -> ZigguratResult<Value> {
		match value {
			kdl::KdlValue::String(text) => Ok(Value::String(text.clone())),
			kdl::KdlValue::Integer(int) => {
				match i64::try_from(*int) {
					Ok(int) => Ok(Value::Int(int)),
					Err(_) => self.float(*int as f64),
				}
			}
			kdl::KdlValue::Float(float) => self.float(*float),
			kdl::KdlValue::Bool(flag) => Ok(Value::Bool(*flag)),
			kdl::KdlValue::Null => Ok(Value::Null),
		}
	}
}
