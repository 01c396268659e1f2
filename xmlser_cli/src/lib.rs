use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Render JSON data as XML using compact format strings.",
	long_about = "xmlser compiles compact format strings into XML serializers and runs them \
	              over JSON input.\n\nA format like `<people<person*.people=name.name&.age>>` \
	              describes one <people> element holding a <person> per item of `people`, with \
	              a `name` attribute and the age as text.\n\nQuick start:\n  xmlser render -f \
	              FORMAT -i data.json   Render a file\n  xmlser check -f FORMAT                \
	              Validate a format string\n  xmlser inspect -f FORMAT              Show the \
	              compiled tree\n\nNamed templates can be kept in xmlser.toml and selected with \
	              `--template`."
)]
pub struct XmlserCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Directory searched for `xmlser.toml`.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable debug logging on stderr.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

/// Where the format string comes from. Exactly one is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
	/// A format string, e.g. `<root&.name>`.
	#[arg(long, short)]
	pub format: Option<String>,

	/// The name of a template in the `[templates]` table of `xmlser.toml`.
	#[arg(long, short)]
	pub template: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Render JSON input as XML.
	///
	/// Reads a JSON document from `--input` or stdin, evaluates the template
	/// against it and writes the XML to stdout or `--output`. Documents get an
	/// XML declaration when an encoding is given on the command line or in
	/// `xmlser.toml`.
	Render {
		#[command(flatten)]
		source: SourceArgs,

		/// Compile the format as a fragment with any number of top-level
		/// tags.
		#[arg(long, default_value_t = false)]
		fragment: bool,

		/// JSON input file. Defaults to stdin.
		#[arg(long, short)]
		input: Option<PathBuf>,

		/// Encoding named in the XML declaration.
		#[arg(long, short)]
		encoding: Option<String>,

		/// Write the XML to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// Compile a format string and report any errors.
	///
	/// Prints `ok` and exits successfully when the format is valid. Invalid
	/// formats print a diagnostic pointing at the offending character and
	/// exit with status 2.
	Check {
		#[command(flatten)]
		source: SourceArgs,

		/// Compile as a fragment.
		#[arg(long, default_value_t = false)]
		fragment: bool,
	},
	/// Print the compiled tree of a format string as JSON.
	Inspect {
		#[command(flatten)]
		source: SourceArgs,

		/// Compile as a fragment.
		#[arg(long, default_value_t = false)]
		fragment: bool,
	},
}
