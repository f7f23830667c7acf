use crate::average_calculator::{UsageAverages, calculate_averages};
use crate::blob_store::{BlobStore, ENTRIES_KEY};
use crate::error::{InputRejection, StoreError};
use crate::usage_data::{UsageEntry, decode_entries, encode_entries};
use jiff::civil::Date;
use tracing::{debug, info, warn};

/// What to do when a reading is added for a date that already has one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateDates {
    /// Keep both rows; the interval between them spans zero days.
    #[default]
    Keep,
    /// Overwrite the existing reading for that date.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub duplicates: DuplicateDates,
    pub allow_negative_readings: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            duplicates: DuplicateDates::Keep,
            allow_negative_readings: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddOutcome {
    Added { index: usize },
    Replaced { index: usize, previous: UsageEntry },
    Rejected(InputRejection),
}

/// Default values for the next reading a user is about to enter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draft {
    pub date: Date,
    pub reading: f64,
}

/// The session's authoritative, date-ordered list of readings.
///
/// Only [`EntryStore::load`] builds one, so nothing is ever written back before the
/// saved entries have been read.
#[derive(Debug)]
pub struct EntryStore<S> {
    backend: S,
    options: StoreOptions,
    entries: Vec<UsageEntry>,
}

impl<S: BlobStore> EntryStore<S> {
    pub fn load(backend: S, options: StoreOptions) -> Result<Self, StoreError> {
        let entries = match backend.read(ENTRIES_KEY)? {
            None => Vec::new(),
            Some(blob) => decode_entries(&blob).unwrap_or_else(|| {
                warn!(key = ENTRIES_KEY, "ignoring malformed saved entries");
                Vec::new()
            }),
        };
        debug!(count = entries.len(), "loaded entries");
        Ok(Self {
            backend,
            options,
            entries,
        })
    }

    pub fn entries(&self) -> &[UsageEntry] {
        &self.entries
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn averages(&self) -> UsageAverages {
        calculate_averages(&self.entries)
    }

    pub fn suggested_input(&self, today: Date) -> Draft {
        Draft {
            date: today,
            reading: self.entries.last().map_or(0.0, |entry| entry.reading),
        }
    }

    /// Adds a reading from raw form text. Invalid input is a no-op, reported in the outcome.
    pub fn add(&mut self, date_text: &str, reading_text: &str) -> Result<AddOutcome, StoreError> {
        let entry = match self.validate(date_text, reading_text) {
            Ok(entry) => entry,
            Err(reason) => {
                debug!(date_text, reading_text, %reason, "rejected reading");
                return Ok(AddOutcome::Rejected(reason));
            }
        };
        let mut next = self.entries.clone();
        let outcome = match self.options.duplicates {
            DuplicateDates::Replace => match position_of(&next, entry.date) {
                Some(index) => {
                    let previous = std::mem::replace(&mut next[index], entry);
                    AddOutcome::Replaced { index, previous }
                }
                None => AddOutcome::Added {
                    index: insert_sorted(&mut next, entry),
                },
            },
            DuplicateDates::Keep => AddOutcome::Added {
                index: insert_sorted(&mut next, entry),
            },
        };
        self.commit(next)?;
        Ok(outcome)
    }

    /// Removes the entry at `index`. Out of range changes nothing.
    pub fn delete(&mut self, index: usize) -> Result<Option<UsageEntry>, StoreError> {
        if index >= self.entries.len() {
            debug!(index, len = self.entries.len(), "delete index out of range");
            return Ok(None);
        }
        let mut next = self.entries.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(Some(removed))
    }

    pub fn persist(&mut self) -> Result<(), StoreError> {
        write_entries(&mut self.backend, &self.entries)
    }

    /// Saves `next` and only then makes it current, so a failed write changes nothing.
    fn commit(&mut self, next: Vec<UsageEntry>) -> Result<(), StoreError> {
        write_entries(&mut self.backend, &next)?;
        self.entries = next;
        Ok(())
    }

    fn validate(&self, date_text: &str, reading_text: &str) -> Result<UsageEntry, InputRejection> {
        let entry = UsageEntry::parse(date_text, reading_text)?;
        if !self.options.allow_negative_readings && entry.reading < 0.0 {
            return Err(InputRejection::NegativeReading);
        }
        Ok(entry)
    }
}

fn write_entries<S: BlobStore>(backend: &mut S, entries: &[UsageEntry]) -> Result<(), StoreError> {
    let blob = encode_entries(entries)?;
    backend.write(ENTRIES_KEY, &blob)?;
    info!(count = entries.len(), "saved entries");
    Ok(())
}

fn position_of(entries: &[UsageEntry], date: Date) -> Option<usize> {
    entries.iter().position(|entry| entry.date == date)
}

/// Appends then stably re-sorts, so equal dates stay in insertion order.
fn insert_sorted(entries: &mut Vec<UsageEntry>, entry: UsageEntry) -> usize {
    entries.push(entry);
    entries.sort_by_key(|entry| entry.date);
    entries.partition_point(|existing| existing.date <= entry.date) - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::MemoryBlobStore;
    use jiff::civil::date;
    use pretty_assertions::assert_eq;

    fn entry(y: i16, m: i8, d: i8, reading: f64) -> UsageEntry {
        UsageEntry {
            date: date(y, m, d),
            reading,
        }
    }

    fn store_with(blob: &str) -> EntryStore<MemoryBlobStore> {
        EntryStore::load(
            MemoryBlobStore::with_blob(ENTRIES_KEY, blob),
            StoreOptions::default(),
        )
        .unwrap()
    }

    fn saved(store: &EntryStore<MemoryBlobStore>) -> Option<Vec<UsageEntry>> {
        store.backend().get(ENTRIES_KEY).and_then(decode_entries)
    }

    /// Serves a fixed blob and refuses every write.
    struct ReadOnlyBlob(&'static str);

    impl BlobStore for ReadOnlyBlob {
        fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(Some(self.0.to_owned()))
        }

        fn write(&mut self, key: &str, _blob: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: key.into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn failed_write_leaves_entries_unchanged() {
        let backend = ReadOnlyBlob(r#"[{"date":"2025-01-01","reading":1}]"#);
        let mut store = EntryStore::load(backend, StoreOptions::default()).unwrap();
        let before = vec![entry(2025, 1, 1, 1.0)];

        assert!(store.add("2025-02-01", "10").is_err());
        assert_eq!(store.entries(), before.as_slice());
        assert!(store.add("2025-02-01", "10").is_err());
        assert_eq!(store.entries(), before.as_slice());
        assert!(store.delete(0).is_err());
        assert_eq!(store.entries(), before.as_slice());

        let options = StoreOptions {
            duplicates: DuplicateDates::Replace,
            ..StoreOptions::default()
        };
        let backend = ReadOnlyBlob(r#"[{"date":"2025-01-01","reading":1}]"#);
        let mut replacing = EntryStore::load(backend, options).unwrap();
        assert!(replacing.add("2025-01-01", "5").is_err());
        assert_eq!(replacing.entries(), before.as_slice());
    }

    #[test]
    fn load_without_blob_is_empty_and_writes_nothing() {
        let store = EntryStore::load(MemoryBlobStore::new(), StoreOptions::default()).unwrap();
        assert!(store.entries().is_empty());
        assert_eq!(store.backend().get(ENTRIES_KEY), None);
    }

    #[test]
    fn load_malformed_blob_keeps_it_until_next_change() {
        let mut store = store_with("{oops");
        assert!(store.entries().is_empty());
        assert_eq!(store.backend().get(ENTRIES_KEY), Some("{oops"));
        store.add("2025-01-01", "1").unwrap();
        assert_eq!(saved(&store), Some(vec![entry(2025, 1, 1, 1.0)]));
    }

    #[test]
    fn add_sorts_and_persists() {
        let mut store = store_with(r#"[{"date":"2025-02-01","reading":160}]"#);
        let outcome = store.add("2025-01-01", "100").unwrap();
        assert_eq!(outcome, AddOutcome::Added { index: 0 });
        let expected = vec![entry(2025, 1, 1, 100.0), entry(2025, 2, 1, 160.0)];
        assert_eq!(store.entries(), expected.as_slice());
        assert_eq!(saved(&store), Some(expected));
    }

    #[test]
    fn rejected_input_is_a_no_op() {
        let blob = r#"[{"date":"2025-01-01","reading":100}]"#;
        let mut store = store_with(blob);
        assert_eq!(
            store.add("", "50").unwrap(),
            AddOutcome::Rejected(InputRejection::EmptyDate)
        );
        assert_eq!(
            store.add("2025-03-01", "abc").unwrap(),
            AddOutcome::Rejected(InputRejection::NotANumber)
        );
        assert_eq!(store.entries(), &[entry(2025, 1, 1, 100.0)]);
        assert_eq!(store.backend().get(ENTRIES_KEY), Some(blob));
    }

    #[test]
    fn duplicate_dates_kept_in_insertion_order() {
        let mut store = store_with("[]");
        store.add("2025-01-01", "100").unwrap();
        store.add("2025-01-05", "140").unwrap();
        let outcome = store.add("2025-01-01", "105").unwrap();
        assert_eq!(outcome, AddOutcome::Added { index: 1 });
        assert_eq!(
            store.entries(),
            &[
                entry(2025, 1, 1, 100.0),
                entry(2025, 1, 1, 105.0),
                entry(2025, 1, 5, 140.0),
            ]
        );
        assert_eq!(store.averages().intervals[0].avg_per_day, 0.0);
    }

    #[test]
    fn duplicate_dates_replaced_when_configured() {
        let options = StoreOptions {
            duplicates: DuplicateDates::Replace,
            ..StoreOptions::default()
        };
        let mut store = EntryStore::load(MemoryBlobStore::new(), options).unwrap();
        store.add("2025-01-01", "100").unwrap();
        store.add("2025-01-05", "140").unwrap();
        let outcome = store.add("2025-01-05", "150").unwrap();
        assert_eq!(
            outcome,
            AddOutcome::Replaced {
                index: 1,
                previous: entry(2025, 1, 5, 140.0),
            }
        );
        assert_eq!(
            saved(&store),
            Some(vec![entry(2025, 1, 1, 100.0), entry(2025, 1, 5, 150.0)])
        );
    }

    #[test]
    fn negative_readings_rejected_when_configured() {
        let options = StoreOptions {
            allow_negative_readings: false,
            ..StoreOptions::default()
        };
        let mut store = EntryStore::load(MemoryBlobStore::new(), options).unwrap();
        assert_eq!(
            store.add("2025-01-01", "-1").unwrap(),
            AddOutcome::Rejected(InputRejection::NegativeReading)
        );
        assert!(store.entries().is_empty());

        let mut lenient = store_with("[]");
        lenient.add("2025-01-01", "-1").unwrap();
        assert_eq!(lenient.entries(), &[entry(2025, 1, 1, -1.0)]);
    }

    #[test]
    fn delete_keeps_relative_order() {
        let mut store = store_with(
            r#"[{"date":"2025-01-01","reading":1},{"date":"2025-01-02","reading":2},{"date":"2025-01-03","reading":3}]"#,
        );
        assert_eq!(store.delete(0).unwrap(), Some(entry(2025, 1, 1, 1.0)));
        let expected = vec![entry(2025, 1, 2, 2.0), entry(2025, 1, 3, 3.0)];
        assert_eq!(store.entries(), expected.as_slice());
        assert_eq!(saved(&store), Some(expected));
    }

    #[test]
    fn delete_out_of_range_changes_nothing() {
        let blob = r#"[{"date":"2025-01-01","reading":1}]"#;
        let mut store = store_with(blob);
        assert_eq!(store.delete(1).unwrap(), None);
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.backend().get(ENTRIES_KEY), Some(blob));
    }

    #[test]
    fn suggested_input_uses_latest_reading() {
        let today = date(2025, 4, 25);
        let mut store = store_with("[]");
        assert_eq!(
            store.suggested_input(today),
            Draft {
                date: today,
                reading: 0.0
            }
        );
        store.add("2025-03-01", "250").unwrap();
        store.add("2025-01-01", "100").unwrap();
        assert_eq!(store.suggested_input(today).reading, 250.0);
    }
}
