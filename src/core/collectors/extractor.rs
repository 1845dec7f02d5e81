//! Maps report fields and sections onto the fixed metric vocabulary.

use super::{
    error::CollectorError,
    report::ReportParser,
    types::{CollectorResult, MetricSet, Subcommand},
};

/// How a metric is resolved from a parsed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Integer value following a named token in the status term.
    Field(&'static str),
    /// Number of entries under a section header.
    Section(&'static str),
}

/// One row of a metric table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricRow {
    pub key: &'static str,
    pub lookup: Lookup,
}

const fn field(key: &'static str, name: &'static str) -> MetricRow {
    MetricRow {
        key,
        lookup: Lookup::Field(name),
    }
}

const fn section(key: &'static str, header: &'static str) -> MetricRow {
    MetricRow {
        key,
        lookup: Lookup::Section(header),
    }
}

/// Metrics available from both subcommands. `report` appends section counts.
pub static REPORT_TABLE: [MetricRow; 11] = [
    field("file_descriptors", "total_used"),
    field("socket_descriptors", "sockets_used"),
    field("erlang_processes", "used"),
    field("memory", "total"),
    field("disk_space", "disk_free"),
    field("uptime", "uptime"),
    section("connections_count", "Connections:"),
    section("channels_count", "Channels:"),
    section("exchanges_count", "Exchanges on"),
    section("queues_count", "Queues on"),
    section("consumers_count", "Consumers on"),
];

const STATUS_ROWS: usize = 6;

/// Rows the given subcommand's output can satisfy.
pub fn table(subcommand: Subcommand) -> &'static [MetricRow] {
    match subcommand {
        Subcommand::Status => &REPORT_TABLE[..STATUS_ROWS],
        Subcommand::Report => &REPORT_TABLE,
    }
}

/// Coerces a cleaned token the way a plain integer literal is read:
/// optional sign, decimal digits.
fn coerce(row: &MetricRow, name: &str, raw: &str) -> CollectorResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| CollectorError::ParseError {
            metric: row.key.to_string(),
            location: name.to_string(),
            reason: format!("{e}: {raw:?}"),
        })
}

/// Resolves a single row against the parser.
pub fn resolve(parser: &ReportParser<'_>, row: &MetricRow) -> CollectorResult<i64> {
    match row.lookup {
        Lookup::Field(name) => {
            let raw = parser
                .field_value(name)
                .ok_or_else(|| CollectorError::MissingField {
                    field: name.to_string(),
                    location: "status term".to_string(),
                })?;
            coerce(row, name, raw)
        }
        Lookup::Section(header) => {
            let count = parser
                .section_count(header)
                .ok_or_else(|| CollectorError::MissingField {
                    field: header.to_string(),
                    location: "report sections".to_string(),
                })?;
            i64::try_from(count).map_err(|e| CollectorError::ParseError {
                metric: row.key.to_string(),
                location: header.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Outcome of running a table over one report.
#[derive(Debug, Default)]
pub struct Extraction {
    pub metrics: MetricSet,
    /// Rows that were dropped, with the reason.
    pub skipped: Vec<(&'static str, CollectorError)>,
}

/// Resolves every row of `rows`. Failed rows are reported in
/// [`Extraction::skipped`] and never appear in the metric set.
pub fn extract(parser: &ReportParser<'_>, rows: &[MetricRow]) -> Extraction {
    let mut extraction = Extraction::default();
    for row in rows {
        match resolve(parser, row) {
            Ok(value) => extraction.metrics.insert(row.key, value),
            Err(e) => extraction.skipped.push((row.key, e)),
        }
    }
    extraction
}
