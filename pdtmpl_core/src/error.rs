use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum PdtmplError {
	#[error(transparent)]
	#[diagnostic(code(pdtmpl::io_error))]
	Io(#[from] std::io::Error),

	#[error("line {line}: invalid metadata block: {reason}")]
	#[diagnostic(
		code(pdtmpl::decode),
		help("metadata blocks between `---` lines must hold valid YAML or JSON")
	)]
	Decode { line: usize, reason: String },

	#[error("line {line}: metadata block must be a mapping, found {found}")]
	#[diagnostic(
		code(pdtmpl::not_a_mapping),
		help("use `key: value` pairs inside a metadata block")
	)]
	NotAMapping { line: usize, found: String },

	#[error("line {line}: unterminated metadata block")]
	#[diagnostic(
		code(pdtmpl::unterminated_block),
		help("close the metadata block with a line containing only `---`")
	)]
	UnterminatedBlock { line: usize },

	#[error("{count} metadata block(s) could not be processed")]
	#[diagnostic(
		code(pdtmpl::block_errors),
		help("the affected blocks were copied to the output unchanged")
	)]
	BlockErrors { count: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(pdtmpl::config_parse),
		help("check that pdtmpl.toml is valid TOML with an optional [webform] section")
	)]
	ConfigParse(String),
}

impl PdtmplError {
	/// Returns `true` for errors that only affect a single metadata block.
	/// The scanner records these and keeps going.
	pub fn is_recoverable(&self) -> bool {
		matches!(
			self,
			Self::Decode { .. } | Self::NotAMapping { .. } | Self::UnterminatedBlock { .. }
		)
	}

	/// The 1-indexed input line a block error is attributed to.
	pub fn line(&self) -> Option<usize> {
		match self {
			Self::Decode { line, .. }
			| Self::NotAMapping { line, .. }
			| Self::UnterminatedBlock { line } => Some(*line),
			_ => None,
		}
	}
}

pub type PdtmplResult<T> = Result<T, PdtmplError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
