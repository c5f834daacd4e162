use std::io::BufRead;
use std::io::Write;

use crate::BlockScanner;
use crate::FormEmitter;
use crate::FormSpec;
use crate::MetadataBlock;
use crate::PdtmplResult;
use crate::ScanSummary;
use crate::WebFormConfig;
use crate::decode::decode_mapping;
use crate::decode::form_mapping;

/// Decode a completed metadata block and decide what replaces it.
///
/// A block holding a `form` mapping becomes form markup with no delimiters.
/// Any other mapping is passed through as the original raw lines between
/// delimiters, never re-serialized, so comments and formatting survive.
/// `line` is the line number of the closing delimiter and is used for
/// error reporting.
pub fn decode_and_render(
	block: &MetadataBlock,
	line: usize,
	emitter: &FormEmitter,
) -> PdtmplResult<String> {
	let mapping = decode_mapping(&block.text(), line)?;

	let Some(form) = form_mapping(&mapping) else {
		tracing::debug!(
			opening_line = block.opening_line,
			closing_line = line,
			"passing metadata block through"
		);
		return Ok(block.to_delimited());
	};

	let form = FormSpec::from_mapping(form);
	tracing::debug!(
		opening_line = block.opening_line,
		closing_line = line,
		form_id = form.id.as_deref().unwrap_or_default(),
		elements = form.elements.len(),
		"rendering form"
	);
	Ok(emitter.render(&form))
}

/// Stream a document from `reader` to `output`, replacing every metadata
/// block that holds a `form` mapping with HTML form markup.
///
/// Blocks that fail to decode are copied through unchanged and reported on
/// `diagnostics` as `line <N>: <message>`. Check
/// [`ScanSummary::error_count`] (or call [`ScanSummary::into_result`]) to
/// find out whether any block failed.
pub fn apply_web_form<R, W, D>(
	reader: R,
	output: &mut W,
	diagnostics: &mut D,
	config: WebFormConfig,
) -> PdtmplResult<ScanSummary>
where
	R: BufRead,
	W: Write + ?Sized,
	D: Write + ?Sized,
{
	let emitter = FormEmitter::new(config);
	BlockScanner::new().scan(reader, output, diagnostics, |block, line| {
		decode_and_render(block, line, &emitter)
	})
}

/// The in-memory result of [`render_web_form`].
#[derive(Debug)]
pub struct WebFormOutput {
	pub output: String,
	/// Diagnostic lines, one per failed block.
	pub diagnostics: String,
	pub summary: ScanSummary,
}

/// Run [`apply_web_form`] over a string.
pub fn render_web_form(input: &str, config: WebFormConfig) -> PdtmplResult<WebFormOutput> {
	let mut output = Vec::new();
	let mut diagnostics = Vec::new();
	let summary = apply_web_form(input.as_bytes(), &mut output, &mut diagnostics, config)?;

	Ok(WebFormOutput {
		output: String::from_utf8_lossy(&output).into_owned(),
		diagnostics: String::from_utf8_lossy(&diagnostics).into_owned(),
		summary,
	})
}
