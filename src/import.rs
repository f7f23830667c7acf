use crate::blob_store::BlobStore;
use crate::entry_store::{AddOutcome, EntryStore};
use crate::error::ImportError;
use csv::StringRecord;
use std::io::Read;
use std::sync::LazyLock;
use tracing::{info, warn};

static EXPECTED_HEADERS: LazyLock<StringRecord> =
    LazyLock::new(|| StringRecord::from(vec!["date", "reading"]));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub rejected: usize,
}

/// Feeds every `date,reading` row through [`EntryStore::add`], so imported rows get the
/// same validation and duplicate handling as typed ones.
pub fn import_csv<S: BlobStore>(
    store: &mut EntryStore<S>,
    reader: impl Read,
) -> Result<ImportSummary, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    if headers != *EXPECTED_HEADERS {
        return Err(ImportError::UnexpectedHeaders {
            found: headers.iter().map(str::to_owned).collect(),
            expected: EXPECTED_HEADERS.iter().map(str::to_owned).collect(),
        });
    }
    let mut summary = ImportSummary::default();
    for (line, record) in csv_reader.records().enumerate() {
        let row = line + 1;
        let record = record.map_err(|source| ImportError::Row { row, source })?;
        match store.add(&record[0], &record[1])? {
            AddOutcome::Rejected(reason) => {
                warn!(row, %reason, "skipping row");
                summary.rejected += 1;
            }
            AddOutcome::Added { .. } | AddOutcome::Replaced { .. } => summary.added += 1,
        }
    }
    info!(added = summary.added, rejected = summary.rejected, "import finished");
    Ok(summary)
}
