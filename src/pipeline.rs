use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::address::AddressTarget;
use crate::errors::AppResult;
use crate::records::{parse_line, read_input, write_output, LineRejection, OutputRecord};
use crate::resolver::AddressResolver;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub lines_seen: usize,
    pub records_emitted: usize,
    pub lines_skipped: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub geocoder_calls: usize,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub records: Vec<OutputRecord>,
    pub summary: RunSummary,
}

/// Enriches every line of a JSON Lines document. Bad lines are skipped with a
/// warning; lines without usable address data are emitted with null coordinates.
pub async fn enrich_lines(contents: &str, resolver: &AddressResolver) -> BatchOutcome {
    let calls_before = resolver.calls();
    let mut summary = RunSummary::default();
    let mut records = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        summary.lines_seen += 1;

        let record = match parse_line(line) {
            Ok(record) => record,
            Err(LineRejection::InvalidJson(err)) => {
                warn!(line = line_number, %err, "skipping line due to invalid JSON");
                summary.lines_skipped += 1;
                continue;
            }
            Err(LineRejection::MissingFields) => {
                warn!(
                    line = line_number,
                    "skipping line due to missing 'text' or 'metadata'"
                );
                summary.lines_skipped += 1;
                continue;
            }
        };

        let coordinates = match AddressTarget::from_metadata(&record.metadata) {
            Some(target) => resolver.resolve(&target.full_address, &target.city).await,
            None => {
                warn!(
                    line = line_number,
                    "skipping geocoding due to insufficient address info"
                );
                None
            }
        };

        if coordinates.is_some() {
            summary.resolved += 1;
        } else {
            summary.unresolved += 1;
        }
        records.push(OutputRecord {
            text: record.text,
            coordinates,
        });
    }

    summary.records_emitted = records.len();
    summary.geocoder_calls = resolver.calls() - calls_before;
    BatchOutcome { records, summary }
}

pub async fn enrich_file(
    input: &Path,
    output: &Path,
    resolver: &AddressResolver,
) -> AppResult<RunSummary> {
    let contents = read_input(input)?;
    let BatchOutcome { records, summary } = enrich_lines(&contents, resolver).await;

    write_output(output, &records)?;
    info!(
        processed = summary.records_emitted,
        lines = summary.lines_seen,
        resolved = summary.resolved,
        geocoder_calls = summary.geocoder_calls,
        "successfully processed {} out of {} lines",
        summary.records_emitted,
        summary.lines_seen
    );
    info!(path = %output.display(), "output written");
    Ok(summary)
}
