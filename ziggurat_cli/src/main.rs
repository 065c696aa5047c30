use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use supports_color::Stream;
use tracing_subscriber::EnvFilter;
use ziggurat_cli::Commands;
use ziggurat_cli::OutputFormat;
use ziggurat_cli::ZigguratCli;
use ziggurat_core::Context;
use ziggurat_core::Template;
use ziggurat_core::Transforms;
use ziggurat_core::Value;
use ziggurat_core::ZigguratConfig;
use ziggurat_core::ZigguratError;
use ziggurat_core::format_from_extension;
use ziggurat_core::load_data_file;
use ziggurat_core::print_tree;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
	let args = ZigguratCli::parse();

	// Respect NO_COLOR env var, --no-color flag and terminal support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	if args.verbose {
		let filter = EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| EnvFilter::new("ziggurat_core=debug"));
		tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_writer(std::io::stderr)
			.with_ansi(use_color)
			.init();
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Render {
			template,
			data,
			set,
			output,
		}) => run_render(&args, template, data, set, output.as_deref()),
		Some(Commands::Tree { template }) => run_tree(&args, template),
		Some(Commands::Check { templates, format }) => {
			match run_check(&args, templates, *format) {
				Ok(true) => Ok(()),
				Ok(false) => process::exit(1),
				Err(e) => Err(e),
			}
		}
		None => {
			eprintln!("No subcommand specified. Run `ziggurat --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		report_error(e);
		process::exit(2);
	}
}

/// Print an error through miette when it is a [`ZigguratError`].
fn report_error(error: Box<dyn std::error::Error>) {
	match error.downcast::<ZigguratError>() {
		Ok(ziggurat_error) => {
			let report: miette::Report = (*ziggurat_error).into();
			eprintln!("{report:?}");
		}
		Err(e) => {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn resolve_root(args: &ZigguratCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_render(
	args: &ZigguratCli,
	template: &Path,
	data: &[PathBuf],
	set: &[(String, String)],
	output: Option<&Path>,
) -> CliResult {
	let root = resolve_root(args);
	let mut transforms = Transforms::default();
	let mut context = Context::new();

	if let Some(config) = ZigguratConfig::load(&root)? {
		config.apply_transforms(&mut transforms)?;
		context = config.load_context(&root)?;
	}

	for path in data {
		let path = root.join(path);
		match load_data_file(&path, &format_from_extension(&path))? {
			Value::Map(entries) => context.extend(entries),
			other => {
				return Err(Box::new(ZigguratError::InvalidValue(format!(
					"data file `{}` must contain a map, found `{}`",
					path.display(),
					other.type_name()
				))));
			}
		}
	}

	for (key, value) in set {
		set_dotted(&mut context, key, Value::String(value.clone()));
	}

	let template = Template::from_path(root.join(template))?.with_transforms(transforms);
	let rendered = template.render(&mut context)?;

	match output {
		Some(output) => {
			let output = root.join(output);
			std::fs::write(&output, rendered)?;
			eprintln!("{} {}", colored!("Wrote", green), output.display());
		}
		None => print!("{rendered}"),
	}

	Ok(())
}

/// Insert `value` at a dotted key, creating (or replacing non-map values
/// with) nested maps along the way.
fn set_dotted(context: &mut Context, key: &str, value: Value) {
	let segments: Vec<&str> = key.split('.').collect();
	let Some((first, rest)) = segments.split_first() else {
		return;
	};

	insert_nested(context.entry((*first).to_string()).or_default(), rest, value);
}

fn insert_nested(slot: &mut Value, segments: &[&str], value: Value) {
	let Some((first, rest)) = segments.split_first() else {
		*slot = value;
		return;
	};

	if !matches!(slot, Value::Map(_)) {
		*slot = Value::Map(BTreeMap::new());
	}

	if let Value::Map(entries) = slot {
		insert_nested(entries.entry((*first).to_string()).or_default(), rest, value);
	}
}

fn run_tree(args: &ZigguratCli, template: &Path) -> CliResult {
	let root = resolve_root(args);
	let template = Template::from_path(root.join(template))?;
	println!("{}", print_tree(template.tree()));

	Ok(())
}

/// Parse each template. Returns `Ok(false)` when any of them fails.
fn run_check(
	args: &ZigguratCli,
	templates: &[PathBuf],
	format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let results: Vec<(&PathBuf, Option<ZigguratError>)> = templates
		.iter()
		.map(|path| (path, Template::from_path(root.join(path)).err()))
		.collect();
	let failures = results.iter().filter(|(_, error)| error.is_some()).count();

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = results
				.iter()
				.map(|(path, error)| {
					serde_json::json!({
						"path": path.display().to_string(),
						"ok": error.is_none(),
						"kind": error.as_ref().map(|e| e.kind().as_str()),
						"error": error.as_ref().map(ToString::to_string),
					})
				})
				.collect();
			let summary = serde_json::json!({
				"ok": failures == 0,
				"checked": results.len(),
				"failed": failures,
				"templates": entries,
			});
			println!("{}", serde_json::to_string_pretty(&summary)?);
		}
		OutputFormat::Text => {
			for (path, error) in results {
				match error {
					None => println!("{} {}", colored!("ok", green), path.display()),
					Some(error) => {
						println!("{} {}", colored!("failed", red), path.display());
						let report: miette::Report = error.into();
						eprintln!("{report:?}");
					}
				}
			}

			if failures == 0 {
				println!(
					"{}",
					colored!(format!("All {} templates parsed.", templates.len()), bold)
				);
			} else {
				println!(
					"{}",
					colored!(
						format!("{failures} of {} templates failed to parse.", templates.len()),
						red
					)
				);
			}
		}
	}

	Ok(failures == 0)
}
