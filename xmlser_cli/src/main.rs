use std::io::IsTerminal;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xmlser_cli::Commands;
use xmlser_cli::SourceArgs;
use xmlser_cli::XmlserCli;
use xmlser_core::Template;
use xmlser_core::Value;
use xmlser_core::XmlserConfig;
use xmlser_core::XmlserError;
use xmlser_core::XmlserResult;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
	let args = XmlserCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();

	let default_level = if args.verbose { "debug" } else { "warn" };
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
		)
		.with_writer(std::io::stderr)
		.init();

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
			source,
			fragment,
			input,
			encoding,
			output,
		}) => {
			run_render(
				&args,
				source,
				*fragment,
				input.as_deref(),
				encoding.as_deref(),
				output.as_deref(),
			)
		}
		Some(Commands::Check { source, fragment }) => run_check(&args, source, *fragment),
		Some(Commands::Inspect { source, fragment }) => run_inspect(&args, source, *fragment),
		None => {
			eprintln!("No subcommand specified. Run `xmlser --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<XmlserError>() {
			Ok(xmlser_err) => {
				let report: miette::Report = (*xmlser_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("error: {e}");
			}
		}
		process::exit(2);
	}
}

fn resolve_root(args: &XmlserCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// A compiled template and the encoding configured for it.
struct Resolved {
	template: Template,
	encoding: Option<String>,
}

fn resolve_template(args: &XmlserCli, source: &SourceArgs, fragment: bool) -> XmlserResult<Resolved> {
	let root = resolve_root(args);
	let config = XmlserConfig::load(&root)?.unwrap_or_default();

	if let Some(format) = &source.format {
		return Ok(Resolved {
			template: Template::compile(format, !fragment)?,
			encoding: config.encoding.clone(),
		});
	}

	let name = source.template.as_deref().unwrap_or_default();
	let entry = config.template(name)?;
	let template = Template::compile(entry.format(), !(fragment || entry.is_fragment()))?;
	debug!(name, document = template.is_document(), "resolved named template");

	Ok(Resolved {
		template,
		encoding: config.encoding_for(name).map(ToString::to_string),
	})
}

fn read_input(input: Option<&Path>) -> XmlserResult<Value> {
	let text = match input {
		Some(path) => std::fs::read_to_string(path)?,
		None if std::io::stdin().is_terminal() => String::new(),
		None => {
			let mut text = String::new();
			std::io::stdin().read_to_string(&mut text)?;
			text
		}
	};

	if text.trim().is_empty() {
		return Ok(Value::Null);
	}

	serde_json::from_str::<serde_json::Value>(&text)
		.map(Value::from)
		.map_err(|e| XmlserError::InputParse(e.to_string()))
}

fn run_render(
	args: &XmlserCli,
	source: &SourceArgs,
	fragment: bool,
	input: Option<&Path>,
	encoding: Option<&str>,
	output: Option<&Path>,
) -> CliResult {
	let resolved = resolve_template(args, source, fragment)?;
	let value = read_input(input)?;
	let encoding = encoding.or(resolved.encoding.as_deref());

	match output {
		Some(path) => {
			let file = std::fs::File::create(path).map_err(XmlserError::from)?;
			resolved.template.write_xml(&value, file, encoding)?;
			if args.verbose {
				eprintln!("Wrote {}", path.display());
			}
		}
		None => {
			let xml = resolved.template.to_xml_string(&value, encoding)?;
			println!("{xml}");
		}
	}

	Ok(())
}

fn run_check(args: &XmlserCli, source: &SourceArgs, fragment: bool) -> CliResult {
	let resolved = resolve_template(args, source, fragment)?;
	if args.verbose {
		let kind = if resolved.template.is_document() {
			"document"
		} else {
			"fragment"
		};
		eprintln!("Compiled {kind} format `{}`", resolved.template.format());
	}

	println!("ok");
	Ok(())
}

fn run_inspect(args: &XmlserCli, source: &SourceArgs, fragment: bool) -> CliResult {
	let resolved = resolve_template(args, source, fragment)?;
	println!("{}", serde_json::to_string_pretty(resolved.template.root())?);
	Ok(())
}
