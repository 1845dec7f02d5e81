//! Parser for the text dumped by `rabbitmqctl status` and `rabbitmqctl report`.
//!
//! The output is not a standard serialization. It carries one Erlang-style
//! term list, for example
//!
//! ```text
//! Status of node rabbit@host ...
//! [{pid,1029},
//!  {file_descriptors,[{total_limit,924},{total_used,3},{sockets_used,1}]},
//!  {uptime,5411}]
//! ```
//!
//! followed (for `report`) by blank-line terminated sections such as
//! `Connections:` or `Queues on /:`. Values in the term list are positional:
//! after tokenizing on commas, a value is the token directly after its name.

use tracing::debug;

use super::types::RawReport;

/// Header of the section holding the node status term.
const STATUS_HEADER: &str = "Status of";

/// Boundary between report sections.
const SECTION_BREAK: &str = "\n\n";

/// Literal sequences removed from every token. `\\n` is the two-character
/// escape that appears inside dumped Erlang strings, not a newline.
const STRIPPED: [&str; 7] = ["[", "]", "{", "}", ",", "\"", "\\n"];

/// Strips term-list punctuation from a raw token.
///
/// All token cleaning goes through here, so a delimiter change in a future
/// broker version is a single edit.
pub fn clean_token(token: &str) -> String {
    let mut cleaned = token.to_string();
    // Removing `\n` can splice a new one together (`\\nn`), so run to a fixpoint.
    while let Some(pattern) = STRIPPED.iter().find(|p| cleaned.contains(**p)) {
        cleaned = cleaned.replace(pattern, "");
    }
    cleaned.trim().to_string()
}

/// Splits a bracket span into cleaned, ordered tokens.
pub fn tokenize(span: &str) -> Vec<String> {
    let span = span.trim();
    if span.is_empty() {
        return Vec::new();
    }
    span.split(',').map(|t| clean_token(t.trim())).collect()
}

/// Returns the text from the first `[` to the last `]` (inclusive), or an
/// empty string when no such span exists.
fn bracket_span(text: &str) -> &str {
    match (text.find('['), text.rfind(']')) {
        (Some(beg), Some(end)) if beg <= end => &text[beg..=end],
        _ => "",
    }
}

/// Returns the section starting at the first occurrence of `header` and
/// ending before the next blank line (or at end of text).
fn section<'a>(text: &'a str, header: &str) -> Option<&'a str> {
    let beg = text.find(header)?;
    let end = text[beg..]
        .find(SECTION_BREAK)
        .map(|offset| beg + offset)
        .unwrap_or(text.len());
    Some(&text[beg..end])
}

/// Parsed view over one [`RawReport`].
///
/// Tokenization of the status term happens once, in [`ReportParser::new`].
#[derive(Debug)]
pub struct ReportParser<'a> {
    text: &'a str,
    terms: Vec<String>,
}

impl<'a> ReportParser<'a> {
    pub fn new(report: &'a RawReport) -> Self {
        Self::from_text(report.text())
    }

    pub fn from_text(text: &'a str) -> Self {
        // Later report sections may carry their own brackets, so prefer the
        // status section when the tool printed one.
        let scope = section(text, STATUS_HEADER).unwrap_or(text);
        let span = bracket_span(scope);
        if span.is_empty() {
            debug!("No bracketed status term found in report output");
        }
        let terms = tokenize(span);

        Self { text, terms }
    }

    /// Cleaned term-list tokens in report order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Value token following the first token equal to `name`.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        let index = self.terms.iter().position(|t| t == name)?;
        self.terms.get(index + 1).map(String::as_str)
    }

    /// Number of entry lines in the section introduced by `header`.
    ///
    /// `None` means the header is absent, which is different from a present
    /// header with no entries (`Some(0)`). A section ending at end of text
    /// with a trailing newline counts that empty trailing piece too.
    pub fn section_count(&self, header: &str) -> Option<usize> {
        section(self.text, header).map(|s| s.split('\n').count() - 1)
    }
}
