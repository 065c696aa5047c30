use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Render text templates with conditionals, loops, includes and macros.",
	long_about = "ziggurat renders plain-text templates against data loaded from JSON, TOML, \
	              YAML, KDL or INI files.\n\nTemplates use `{name|transform}` lookups and \
	              `@if@`, `@for@`, `@include@` and `@macro@` directives.\n\nQuick start:\n  \
	              ziggurat render page.txt --data site.json\n  ziggurat tree page.txt\n  \
	              ziggurat check templates/*.txt"
)]
pub struct ZigguratCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. The config file is discovered
	/// here and relative template, data and output paths resolve against it.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Log include and macro activity to stderr. `RUST_LOG` overrides the
	/// default filter.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Render a template and write the result to stdout.
	///
	/// The render context starts with the `[data]` namespaces from
	/// `ziggurat.toml`. Each `--data` file is then merged in at the top level
	/// and each `--set` pair is applied last.
	Render {
		/// The template file to render.
		template: PathBuf,

		/// A data file whose top-level keys are added to the context. The
		/// format is picked from the file extension. May be repeated.
		#[arg(long = "data", short = 'd', value_name = "FILE")]
		data: Vec<PathBuf>,

		/// Set a string value in the context. Dotted keys such as
		/// `site.name=Docs` create nested maps. May be repeated.
		#[arg(long = "set", short = 's', value_name = "KEY=VALUE", value_parser = parse_key_value)]
		set: Vec<(String, String)>,

		/// Write the output to this file instead of stdout.
		#[arg(long, short, value_name = "FILE")]
		output: Option<PathBuf>,
	},
	/// Print the syntax tree of a template.
	///
	/// Useful for checking how directives and escapes were parsed.
	Tree {
		/// The template file to parse.
		template: PathBuf,
	},
	/// Check that templates parse.
	///
	/// Only the given files are parsed; included templates are not followed.
	/// Exits with a non-zero status code if any template fails.
	Check {
		/// The template files to check.
		#[arg(required = true)]
		templates: Vec<PathBuf>,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

/// Parse a `KEY=VALUE` pair. The value may be empty and may itself contain
/// `=`.
pub fn parse_key_value(input: &str) -> Result<(String, String), String> {
	let Some((key, value)) = input.split_once('=') else {
		return Err(format!("expected `KEY=VALUE`, found `{input}`"));
	};

	let key = key.trim();
	if key.is_empty() || key.split('.').any(str::is_empty) {
		return Err(format!("invalid key in `{input}`"));
	}

	Ok((key.to_string(), value.to_string()))
}
