use miette::Diagnostic;
use thiserror::Error;

/// The broad category of a [`ZigguratError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// The template source could not be parsed.
	Syntax,
	/// A context key, attribute, transform, macro or argument was not found.
	Name,
	/// A value was used in a way its type does not support.
	Type,
	/// The render was set up incorrectly, e.g. `@include@` without a base
	/// directory.
	Configuration,
	/// A template or data file could not be read.
	Io,
}

impl ErrorKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Syntax => "syntax",
			Self::Name => "name",
			Self::Type => "type",
			Self::Configuration => "configuration",
			Self::Io => "io",
		}
	}
}

impl std::fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ZigguratError {
	#[error(transparent)]
	#[diagnostic(code(ziggurat::io_error))]
	Io(#[from] std::io::Error),

	#[error("template not found: `{path}`")]
	#[diagnostic(
		code(ziggurat::template_not_found),
		help("include paths are resolved relative to the including template's directory")
	)]
	TemplateNotFound { path: String },

	#[error("expected {expected} at offset {offset}, found {found}")]
	#[diagnostic(code(ziggurat::syntax))]
	Syntax {
		expected: String,
		found: String,
		offset: usize,
	},

	#[error("unterminated string literal: expected closing `{quote}`")]
	#[diagnostic(code(ziggurat::unterminated_string))]
	UnterminatedString { quote: char, offset: usize },

	#[error("undefined name: `{0}`")]
	#[diagnostic(
		code(ziggurat::undefined_name),
		help("add `{0}` to the render context")
	)]
	UndefinedName(String),

	#[error("`{path}` has no attribute `{segment}`")]
	#[diagnostic(code(ziggurat::missing_attribute))]
	MissingAttribute { path: String, segment: String },

	#[error("cannot access `{segment}` on a value of type `{type_name}` in `{path}`")]
	#[diagnostic(code(ziggurat::not_a_container))]
	NotAContainer {
		path: String,
		segment: String,
		type_name: String,
	},

	#[error("unknown transform: `{0}`")]
	#[diagnostic(
		code(ziggurat::unknown_transform),
		help("built-in transforms: upper, lower, capitalize")
	)]
	UnknownTransform(String),

	#[error("unknown macro: `{0}`")]
	#[diagnostic(
		code(ziggurat::unknown_macro),
		help("declare it first with `@macro {0}(...)@ ... @endmacro@`")
	)]
	UnknownMacro(String),

	#[error("macro `{name}` was called without an argument for `{parameter}`")]
	#[diagnostic(code(ziggurat::missing_argument))]
	MissingArgument { name: String, parameter: String },

	#[error("`{name}` is not iterable (found `{type_name}`)")]
	#[diagnostic(
		code(ziggurat::not_iterable),
		help("`@for@` accepts lists, maps and strings")
	)]
	NotIterable { name: String, type_name: String },

	#[error("cannot include `{0}` without a base directory")]
	#[diagnostic(
		code(ziggurat::missing_base_directory),
		help("load the template from a path, or set one with `Template::with_base_dir`")
	)]
	MissingBaseDirectory(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(ziggurat::config_parse),
		help("check that ziggurat.toml is valid TOML with [data] and/or [transforms] sections")
	)]
	ConfigParse(String),

	#[error("transform alias `{alias}` points at unknown transform `{target}`")]
	#[diagnostic(code(ziggurat::unknown_alias_target))]
	UnknownAliasTarget { alias: String, target: String },

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(ziggurat::data_file))]
	DataFile { path: String, reason: String },

	#[error("unsupported data file format: `{0}`")]
	#[diagnostic(
		code(ziggurat::unsupported_format),
		help("supported formats: text, json, toml, yaml, yml, kdl, ini")
	)]
	UnsupportedDataFormat(String),

	#[error("unconvertible float value in data file `{path}`: {value}")]
	#[diagnostic(
		code(ziggurat::unconvertible_float),
		help("NaN and Infinity are not valid data values")
	)]
	UnconvertibleFloat { path: String, value: String },

	#[error("invalid context value: {0}")]
	#[diagnostic(code(ziggurat::invalid_value))]
	InvalidValue(String),
}

impl ZigguratError {
	/// The category this error falls under.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Syntax { .. } | Self::UnterminatedString { .. } => ErrorKind::Syntax,
			Self::UndefinedName(_)
			| Self::MissingAttribute { .. }
			| Self::NotAContainer { .. }
			| Self::UnknownTransform(_)
			| Self::UnknownMacro(_)
			| Self::MissingArgument { .. } => ErrorKind::Name,
			Self::NotIterable { .. } | Self::InvalidValue(_) => ErrorKind::Type,
			Self::MissingBaseDirectory(_)
			| Self::ConfigParse(_)
			| Self::UnknownAliasTarget { .. }
			| Self::UnsupportedDataFormat(_) => ErrorKind::Configuration,
			Self::Io(_)
			| Self::TemplateNotFound { .. }
			| Self::DataFile { .. }
			| Self::UnconvertibleFloat { .. } => ErrorKind::Io,
		}
	}
}

pub type ZigguratResult<T> = Result<T, ZigguratError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
