use std::io::BufRead;
use std::io::Write;

use crate::PdtmplError;
use crate::PdtmplResult;

/// A line whose trimmed content equals this token opens or closes a metadata
/// block.
pub const METADATA_DELIMITER: &str = "---";

/// A line whose trimmed content starts with this marker opens or closes a
/// fenced code region.
pub const FENCE_MARKER: &str = "~~~";

/// The raw lines collected between two metadata delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
	/// 1-indexed line number of the opening delimiter.
	pub opening_line: usize,
	/// The opening delimiter line as it appeared in the input, surrounding
	/// whitespace included.
	pub opening_delimiter: String,
	/// The closing delimiter line, once the block has been closed.
	pub closing_delimiter: Option<String>,
	/// Lines between the delimiters, exactly as they appeared in the input.
	pub lines: Vec<String>,
}

impl MetadataBlock {
	pub fn new(opening_line: usize, opening_delimiter: &str) -> Self {
		Self {
			opening_line,
			opening_delimiter: opening_delimiter.to_string(),
			closing_delimiter: None,
			lines: Vec::new(),
		}
	}

	/// The block text handed to the decoder.
	pub fn text(&self) -> String {
		self.lines.join("\n")
	}

	/// Re-wrap the raw lines in their original delimiters. Used whenever a
	/// block is passed through instead of rendered.
	pub fn to_delimited(&self) -> String {
		let mut out = self.to_unterminated();
		out.push_str(
			self.closing_delimiter
				.as_deref()
				.unwrap_or(METADATA_DELIMITER),
		);
		out.push('\n');
		out
	}

	/// The opening delimiter followed by the raw lines, without a closing
	/// delimiter.
	pub fn to_unterminated(&self) -> String {
		let capacity = self.lines.iter().map(|l| l.len() + 1).sum::<usize>()
			+ self.opening_delimiter.len()
			+ 1;
		let mut out = String::with_capacity(capacity);
		out.push_str(&self.opening_delimiter);
		out.push('\n');
		for line in &self.lines {
			out.push_str(line);
			out.push('\n');
		}
		out
	}
}

/// The externally visible state of a [`BlockScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
	Plain,
	InFencedCode,
	InMetadataBlock,
}

#[derive(Debug, Default)]
enum ScanState {
	#[default]
	Plain,
	InMetadataBlock(MetadataBlock),
	/// A fence overrides everything else. A block that was accumulating when
	/// the fence opened is parked here and resumes when the fence closes.
	InFencedCode { suspended: Option<MetadataBlock> },
}

/// What the scanner decided to do with a single input line.
#[derive(Debug, PartialEq, Eq)]
pub enum LineAction {
	/// Write the line to the output unchanged.
	Passthrough,
	/// The line was taken by the scanner: an opening delimiter or a line
	/// inside a metadata block.
	Consumed,
	/// A closing delimiter completed this block. `line` is the 1-indexed line
	/// number of that closing delimiter.
	Flush { block: MetadataBlock, line: usize },
}

/// Aggregate result of a completed scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
	/// Number of lines written to the output.
	pub lines_written: usize,
	/// Block-level errors that were recovered from. The affected blocks were
	/// written to the output unrendered.
	pub errors: Vec<PdtmplError>,
}

impl ScanSummary {
	pub fn error_count(&self) -> usize {
		self.errors.len()
	}

	/// Returns true if every metadata block was processed without error.
	pub fn is_ok(&self) -> bool {
		self.errors.is_empty()
	}

	/// Convert a scan with recovered errors into an aggregate failure.
	pub fn into_result(self) -> PdtmplResult<Self> {
		if self.errors.is_empty() {
			Ok(self)
		} else {
			Err(PdtmplError::BlockErrors {
				count: self.errors.len(),
			})
		}
	}
}

/// Single-pass, line-oriented state machine that separates fenced code,
/// metadata blocks and plain text.
#[derive(Debug, Default)]
pub struct BlockScanner {
	state: ScanState,
	line_number: usize,
}

impl BlockScanner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of lines pushed so far, which is also the 1-indexed number of
	/// the most recent line.
	pub fn line_number(&self) -> usize {
		self.line_number
	}

	pub fn state(&self) -> ScannerState {
		match self.state {
			ScanState::Plain => ScannerState::Plain,
			ScanState::InMetadataBlock(_) => ScannerState::InMetadataBlock,
			ScanState::InFencedCode { .. } => ScannerState::InFencedCode,
		}
	}

	/// Classify one line and advance the state machine.
	pub fn push_line(&mut self, line: &str) -> LineAction {
		self.line_number += 1;
		let trimmed = line.trim();
		let state = std::mem::take(&mut self.state);

		if trimmed.starts_with(FENCE_MARKER) {
			self.state = match state {
				ScanState::Plain => ScanState::InFencedCode { suspended: None },
				ScanState::InMetadataBlock(block) => {
					ScanState::InFencedCode {
						suspended: Some(block),
					}
				}
				ScanState::InFencedCode { suspended: None } => ScanState::Plain,
				ScanState::InFencedCode {
					suspended: Some(block),
				} => ScanState::InMetadataBlock(block),
			};
			tracing::trace!(line = self.line_number, state = ?self.state(), "fence toggled");
			return LineAction::Passthrough;
		}

		match state {
			fenced @ ScanState::InFencedCode { .. } => {
				self.state = fenced;
				LineAction::Passthrough
			}
			ScanState::Plain if trimmed == METADATA_DELIMITER => {
				tracing::trace!(line = self.line_number, "metadata block opened");
				self.state =
					ScanState::InMetadataBlock(MetadataBlock::new(self.line_number, line));
				LineAction::Consumed
			}
			ScanState::Plain => LineAction::Passthrough,
			ScanState::InMetadataBlock(mut block) if trimmed == METADATA_DELIMITER => {
				tracing::trace!(line = self.line_number, "metadata block closed");
				block.closing_delimiter = Some(line.to_string());
				LineAction::Flush {
					block,
					line: self.line_number,
				}
			}
			ScanState::InMetadataBlock(mut block) => {
				block.lines.push(line.to_string());
				self.state = ScanState::InMetadataBlock(block);
				LineAction::Consumed
			}
		}
	}

	/// End the scan. Returns the block that was still open, if any, whether
	/// it was accumulating or parked behind an unclosed fence.
	pub fn finish(self) -> Option<MetadataBlock> {
		match self.state {
			ScanState::Plain | ScanState::InFencedCode { suspended: None } => None,
			ScanState::InMetadataBlock(block)
			| ScanState::InFencedCode {
				suspended: Some(block),
			} => Some(block),
		}
	}

	/// Stream `reader` to `output` line by line. Every completed metadata
	/// block is handed to `on_flush` together with the line number of its
	/// closing delimiter, and whatever it returns is written in place of the
	/// block.
	///
	/// Lines are classified as UTF-8 with invalid sequences replaced. Lines
	/// written through keep their original bytes.
	///
	/// Recoverable errors from `on_flush` are written to `diagnostics`,
	/// collected in the summary, and the raw block is written between its
	/// delimiters instead. Any other error, including failing to read or
	/// write the streams, aborts the scan.
	pub fn scan<R, W, D, F>(
		mut self,
		mut reader: R,
		output: &mut W,
		diagnostics: &mut D,
		mut on_flush: F,
	) -> PdtmplResult<ScanSummary>
	where
		R: BufRead,
		W: Write + ?Sized,
		D: Write + ?Sized,
		F: FnMut(&MetadataBlock, usize) -> PdtmplResult<String>,
	{
		let mut summary = ScanSummary::default();
		let mut buf = Vec::new();

		loop {
			buf.clear();
			if reader.read_until(b'\n', &mut buf)? == 0 {
				break;
			}
			let raw = trim_line_ending(&buf);
			let line = String::from_utf8_lossy(raw);
			match self.push_line(&line) {
				LineAction::Passthrough => {
					output.write_all(raw)?;
					output.write_all(b"\n")?;
					summary.lines_written += 1;
				}
				LineAction::Consumed => {}
				LineAction::Flush {
					block,
					line: closing_line,
				} => {
					let text = match on_flush(&block, closing_line) {
						Ok(text) => text,
						Err(error) if error.is_recoverable() => {
							record_error(&mut summary, diagnostics, error)?;
							block.to_delimited()
						}
						Err(error) => return Err(error),
					};
					summary.lines_written += write_unit(output, &text)?;
				}
			}
		}

		let last_line = self.line_number;
		if let Some(block) = self.finish() {
			let error = PdtmplError::UnterminatedBlock { line: last_line };
			record_error(&mut summary, diagnostics, error)?;
			summary.lines_written += write_unit(output, &block.to_unterminated())?;
		}

		output.flush()?;
		Ok(summary)
	}
}

fn record_error<D: Write + ?Sized>(
	summary: &mut ScanSummary,
	diagnostics: &mut D,
	error: PdtmplError,
) -> PdtmplResult<()> {
	tracing::warn!(%error, "metadata block passed through unrendered");
	writeln!(diagnostics, "{error}")?;
	summary.errors.push(error);
	Ok(())
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_line_ending(buf: &[u8]) -> &[u8] {
	match buf.strip_suffix(b"\n") {
		Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
		None => buf,
	}
}

/// Write a flushed unit, terminating it with a newline if it lacks one.
/// Returns the number of lines written.
fn write_unit<W: Write + ?Sized>(output: &mut W, text: &str) -> PdtmplResult<usize> {
	output.write_all(text.as_bytes())?;
	let mut lines = text.matches('\n').count();
	if !text.ends_with('\n') {
		output.write_all(b"\n")?;
		lines += 1;
	}
	Ok(lines)
}
