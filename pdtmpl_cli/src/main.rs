use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use pdtmpl_cli::Commands;
use pdtmpl_cli::PdtmplCli;
use pdtmpl_cli::WebformArgs;
use pdtmpl_core::PdtmplConfig;
use pdtmpl_core::PdtmplError;
use pdtmpl_core::PdtmplResult;
use pdtmpl_core::ScanSummary;
use pdtmpl_core::apply_web_form;
use tracing_subscriber::EnvFilter;

fn main() {
	let args = PdtmplCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();

	init_tracing(args.verbose, use_color);

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
		Some(Commands::Webform(webform)) => run_webform(&args, webform),
		None => {
			eprintln!("No subcommand specified. Run `pdtmpl --help` for usage.");
			process::exit(1);
		}
	};

	match result {
		Ok(summary) if summary.is_ok() => {}
		Ok(summary) => {
			eprintln!(
				"{} {}",
				error_prefix(use_color),
				PdtmplError::BlockErrors {
					count: summary.error_count(),
				}
			);
			process::exit(1);
		}
		Err(e) => {
			let report: miette::Report = e.into();
			eprintln!("{report:?}");
			process::exit(2);
		}
	}
}

/// Route `tracing` output to stderr. `RUST_LOG` takes precedence over
/// `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "debug" } else { "error" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn error_prefix(use_color: bool) -> String {
	if use_color {
		format!("{}", "error:".red())
	} else {
		"error:".to_string()
	}
}

fn resolve_root(args: &PdtmplCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_webform(args: &PdtmplCli, webform: &WebformArgs) -> PdtmplResult<ScanSummary> {
	let root = resolve_root(args);
	let config = PdtmplConfig::load_or_default(&root)?;
	let config = webform.apply_overrides(config.webform);
	tracing::debug!(?config, "running webform");

	let reader: Box<dyn BufRead> = match webform.input_path() {
		Some(path) => Box::new(BufReader::new(open_input(path)?)),
		None => Box::new(io::stdin().lock()),
	};
	let mut writer: Box<dyn Write> = match webform.output_path() {
		Some(path) => Box::new(BufWriter::new(create_output(path)?)),
		None => Box::new(io::stdout().lock()),
	};
	let mut diagnostics = io::stderr().lock();

	apply_web_form(reader, &mut writer, &mut diagnostics, config)
}

fn open_input(path: &Path) -> PdtmplResult<File> {
	File::open(path).map_err(|e| with_path(path, &e))
}

fn create_output(path: &Path) -> PdtmplResult<File> {
	File::create(path).map_err(|e| with_path(path, &e))
}

fn with_path(path: &Path, error: &io::Error) -> PdtmplError {
	PdtmplError::Io(io::Error::new(
		error.kind(),
		format!("{}: {error}", path.display()),
	))
}
