use std::fs::File;
use std::io::{Read, Seek};
use std::ops::Range;
use std::path::Path;

use chrono::NaiveDate;
use eclio_dtype::{ElementType, NativeElement};
use eclio_error::{EclError, EclResult, ecl_bail, ecl_err};
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::{ArrayDescriptor, ArrayStore};

/// `REAL` array holding the elapsed days of an entry; opens every entry.
pub const TIME: &str = "TIME";
/// `INTE` array holding `[day, month, year]`.
pub const DATE: &str = "DATE";
/// `CHAR` array whose second element is the well name.
pub const WELLETC: &str = "WELLETC";

type EntryKey = (String, NaiveDate);

#[derive(Debug, Clone)]
struct Entry {
    key: EntryKey,
    time: f32,
    range: Range<usize>,
}

/// A well report file: one array store partitioned into `(well, date)` entries.
///
/// Each entry starts at a `TIME` array and runs up to the next one. The `DATE` and `WELLETC`
/// arrays inside the range identify it.
pub struct RftFile<R = File> {
    store: ArrayStore<R>,
    entries: Vec<Entry>,
    lookup: FxHashMap<EntryKey, usize>,
}

impl RftFile<File> {
    pub fn open(path: impl AsRef<Path>) -> EclResult<Self> {
        Self::new(ArrayStore::open(path)?)
    }
}

impl<R: Read + Seek> RftFile<R> {
    /// Index the entries of an opened store, decoding only the identifying arrays.
    pub fn new(store: ArrayStore<R>) -> EclResult<Self> {
        let markers = store.positions(TIME);
        if let Some(&first) = markers.first() {
            if first != 0 {
                ecl_bail!(
                    MalformedFile: "{} arrays precede the first {} array",
                    first,
                    TIME
                );
            }
        }

        let mut entries = Vec::with_capacity(markers.len());
        let mut lookup = FxHashMap::default();
        for (i, &start) in markers.iter().enumerate() {
            let end = markers.get(i + 1).copied().unwrap_or(store.len());
            let entry = read_entry(&store, start..end)?;
            if lookup.insert(entry.key.clone(), entries.len()).is_some() {
                ecl_bail!(
                    MalformedFile: "duplicate report entry for well {} at {}",
                    entry.key.0,
                    entry.key.1
                );
            }
            entries.push(entry);
        }

        log::debug!("indexed {} report entries", entries.len());
        Ok(Self {
            store,
            entries,
            lookup,
        })
    }

    /// `(well, date)` of every entry in file order.
    pub fn list_entries(&self) -> Vec<(&str, NaiveDate)> {
        self.entries
            .iter()
            .map(|e| (e.key.0.as_str(), e.key.1))
            .collect()
    }

    /// Distinct wells, sorted.
    pub fn list_wells(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.key.0.as_str())
            .sorted()
            .dedup()
            .collect()
    }

    /// Distinct report dates, sorted.
    pub fn list_dates(&self) -> Vec<NaiveDate> {
        self.entries.iter().map(|e| e.key.1).sorted().dedup().collect()
    }

    pub fn has_entry(&self, well: &str, date: NaiveDate) -> bool {
        self.lookup.contains_key(&(well.to_string(), date))
    }

    /// Elapsed days recorded for the entry.
    pub fn entry_time(&self, well: &str, date: NaiveDate) -> EclResult<f32> {
        self.entry(well, date).map(|e| e.time)
    }

    pub fn entry_range(&self, well: &str, date: NaiveDate) -> EclResult<Range<usize>> {
        self.entry(well, date).map(|e| e.range.clone())
    }

    /// Descriptors of the entry's arrays, including its `TIME` marker.
    pub fn list_arrays_for_entry(
        &self,
        well: &str,
        date: NaiveDate,
    ) -> EclResult<&[ArrayDescriptor]> {
        let range = self.entry(well, date)?.range.clone();
        self.store
            .get_list()
            .get(range)
            .ok_or_else(|| ecl_err!("entry range outside the directory"))
    }

    pub fn has_array(&self, name: &str, well: &str, date: NaiveDate) -> bool {
        self.entry(well, date)
            .is_ok_and(|e| self.position_in(name, &e.range).is_some())
    }

    pub fn get<T: NativeElement>(&self, name: &str, well: &str, date: NaiveDate) -> EclResult<&[T]> {
        let entry = self.entry(well, date)?;
        let index = self.position_in(name, &entry.range).ok_or_else(|| {
            ecl_err!(
                ArrayNotFound: "{} in report entry for well {} at {}",
                name,
                well,
                date
            )
        })?;
        self.store.get(index)
    }

    /// Decode every array of the entry.
    pub fn load_entry(&self, well: &str, date: NaiveDate) -> EclResult<()> {
        self.entry(well, date)?
            .range
            .clone()
            .try_for_each(|index| self.store.load_by_index(index))
    }

    pub fn store(&self) -> &ArrayStore<R> {
        &self.store
    }

    pub fn into_store(self) -> ArrayStore<R> {
        self.store
    }

    fn entry(&self, well: &str, date: NaiveDate) -> EclResult<&Entry> {
        self.lookup
            .get(&(well.to_string(), date))
            .and_then(|&i| self.entries.get(i))
            .ok_or_else(|| EclError::EntryNotFound {
                well: well.to_string(),
                date: date.format("%Y-%m-%d").to_string(),
            })
    }

    fn position_in(&self, name: &str, range: &Range<usize>) -> Option<usize> {
        self.store.positions_in(name, range).first().copied()
    }
}

fn read_entry<R: Read + Seek>(store: &ArrayStore<R>, range: Range<usize>) -> EclResult<Entry> {
    let find = |name: &str| {
        store
            .positions_in(name, &range)
            .first()
            .copied()
            .ok_or_else(|| {
                ecl_err!(
                    MalformedFile: "report entry at position {} has no {} array",
                    range.start,
                    name
                )
            })
    };

    let marker = store.descriptor(range.start)?;
    if marker.element_type != ElementType::Real {
        ecl_bail!(
            MalformedFile: "{} array at position {} has type {}",
            TIME,
            range.start,
            marker.element_type
        );
    }
    let time = store
        .get::<f32>(range.start)?
        .first()
        .copied()
        .ok_or_else(|| ecl_err!(MalformedFile: "empty {} array at position {}", TIME, range.start))?;

    let date = match store.get::<i32>(find(DATE)?)? {
        &[day, month, year, ..] => u32::try_from(month)
            .ok()
            .zip(u32::try_from(day).ok())
            .and_then(|(month, day)| NaiveDate::from_ymd_opt(year, month, day)),
        _ => None,
    }
    .ok_or_else(|| ecl_err!(MalformedFile: "invalid {} in report entry at position {}", DATE, range.start))?;

    let well = store
        .get::<String>(find(WELLETC)?)?
        .get(1)
        .cloned()
        .ok_or_else(|| ecl_err!(MalformedFile: "{} without a well name at position {}", WELLETC, range.start))?;

    Ok(Entry {
        key: (well, date),
        time,
        range,
    })
}
