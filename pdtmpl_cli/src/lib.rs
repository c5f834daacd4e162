use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use pdtmpl_core::WebFormConfig;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "A Pandoc preprocessor for data-driven markdown.",
	long_about = "pdtmpl is a Pandoc preprocessor for experimenting with Pandoc generated \
	              static websites.\n\nThe `webform` verb reads a markdown document, finds YAML \
	              or JSON metadata blocks holding a `form` object, and replaces each of them with \
	              an HTML form. Everything else, including fenced code, is copied \
	              unchanged.\n\nExample:\n  pdtmpl webform -i guestbook.md | pandoc -f markdown \
	              -t html5 -s > guestbook.html"
)]
pub struct PdtmplCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Directory searched for `pdtmpl.toml`. Defaults to the current
	/// directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output on stderr.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Replace `form` metadata blocks with HTML web forms.
	///
	/// Reads a text document (e.g. markdown) and rewrites every `---`
	/// delimited metadata block that contains a `form` object as an HTML
	/// `<form>`. Blocks that fail to decode are copied through unchanged and
	/// reported on stderr as `line <N>: <message>`; the command then exits
	/// with status 1 after writing the whole document.
	Webform(WebformArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct WebformArgs {
	/// Read the document from this file instead of stdin. `-` means stdin.
	#[arg(short, long)]
	pub input: Option<PathBuf>,

	/// Write the result to this file instead of stdout. `-` means stdout.
	#[arg(short, long)]
	pub output: Option<PathBuf>,

	/// Write attribute values and label text without HTML escaping.
	#[arg(long, default_value_t = false)]
	pub no_escape: bool,

	/// Render labels with empty text, matching older releases.
	#[arg(long, default_value_t = false)]
	pub legacy_labels: bool,
}

impl WebformArgs {
	/// Apply command line overrides on top of the configured settings.
	pub fn apply_overrides(&self, mut config: WebFormConfig) -> WebFormConfig {
		if self.no_escape {
			config.escape_markup = false;
		}
		if self.legacy_labels {
			config.legacy_empty_labels = true;
		}
		config
	}

	/// The input file, or `None` for stdin.
	pub fn input_path(&self) -> Option<&PathBuf> {
		self.input.as_ref().filter(|path| path.as_os_str() != "-")
	}

	/// The output file, or `None` for stdout.
	pub fn output_path(&self) -> Option<&PathBuf> {
		self.output.as_ref().filter(|path| path.as_os_str() != "-")
	}
}
