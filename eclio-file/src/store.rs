use std::cell::{OnceCell, RefCell};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use eclio_codec::{Format, decode_header, decode_values, skip_values};
use eclio_dtype::{ArrayData, ElementType, NativeElement};
use eclio_error::{EclError, EclResult, ecl_err};
use eclio_metrics::{
    Counter, EclMetrics, STORE_BYTES_DECODED, STORE_DECODE_TIME, STORE_DECODES, Timer,
};
use rustc_hash::FxHashMap;

use crate::OpenOptions;

/// One entry of a store's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDescriptor {
    /// Array name, at most eight characters with trailing blanks removed.
    pub name: String,
    /// Element type declared in the array header.
    pub element_type: ElementType,
    /// Number of elements declared in the array header.
    pub count: usize,
    /// Byte offset of the first value, meaningful only to the store that produced it.
    pub locator: u64,
}

impl Display for ArrayDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} [{}]", self.name, self.element_type, self.count)
    }
}

/// Random access to the arrays of one file.
///
/// Opening a store performs a single pass over the file that reads every header and skips
/// every payload, producing an ordered directory. Values are decoded on first access and
/// cached for the lifetime of the store; later accesses perform no IO.
///
/// A store is `!Sync`: the cache and the file cursor are mutated through shared references.
/// Threads wanting concurrent access each open their own store on the same file.
pub struct ArrayStore<R = File> {
    reader: RefCell<BufReader<R>>,
    format: Format,
    directory: Vec<ArrayDescriptor>,
    positions: FxHashMap<String, Vec<usize>>,
    slots: Vec<OnceCell<ArrayData>>,
    metrics: EclMetrics,
    decodes: Arc<Counter>,
    bytes_decoded: Arc<Counter>,
    decode_time: Arc<Timer>,
}

impl ArrayStore<File> {
    /// Open a file, inferring its representation from the file name.
    pub fn open(path: impl AsRef<Path>) -> EclResult<Self> {
        OpenOptions::new().open(path)
    }
}

impl<R: Read + Seek> ArrayStore<R> {
    /// Index arrays from any seekable source, starting at its current position.
    pub fn from_reader(reader: R, format: Format) -> EclResult<Self> {
        Self::try_new(reader, format, EclMetrics::default())
    }

    pub(crate) fn try_new(reader: R, format: Format, metrics: EclMetrics) -> EclResult<Self> {
        let mut reader = BufReader::new(reader);
        let directory = scan(&mut reader, format)?;

        let mut positions: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (index, descriptor) in directory.iter().enumerate() {
            positions
                .entry(descriptor.name.clone())
                .or_default()
                .push(index);
        }
        log::debug!(
            "indexed {} arrays with {} distinct names",
            directory.len(),
            positions.len()
        );

        let slots = directory.iter().map(|_| OnceCell::new()).collect();
        Ok(Self {
            reader: RefCell::new(reader),
            format,
            directory,
            positions,
            slots,
            decodes: metrics.counter(STORE_DECODES),
            bytes_decoded: metrics.counter(STORE_BYTES_DECODED),
            decode_time: metrics.timer(STORE_DECODE_TIME),
            metrics,
        })
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// The directory, in file order.
    pub fn get_list(&self) -> &[ArrayDescriptor] {
        &self.directory
    }

    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    pub fn has_key(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Directory positions of every array called `name`, ascending.
    pub fn positions(&self, name: &str) -> &[usize] {
        self.positions.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Directory positions of the arrays called `name` that fall inside `range`, ascending.
    pub fn positions_in(&self, name: &str, range: &Range<usize>) -> &[usize] {
        let positions = self.positions(name);
        let start = positions.partition_point(|&i| i < range.start);
        let end = positions.partition_point(|&i| i < range.end);
        positions.get(start..end).unwrap_or_default()
    }

    /// Number of arrays called `name`.
    pub fn occurrence_count(&self, name: &str) -> usize {
        self.positions(name).len()
    }

    /// Position of the first array called `name`.
    pub fn index_of(&self, name: &str) -> EclResult<usize> {
        self.positions(name)
            .first()
            .copied()
            .ok_or_else(|| ecl_err!(ArrayNotFound: "{}", name))
    }

    pub fn descriptor(&self, index: usize) -> EclResult<&ArrayDescriptor> {
        self.directory
            .get(index)
            .ok_or_else(|| ecl_err!(IndexOutOfRange: index, self.directory.len()))
    }

    /// Whether the values at `index` have already been decoded.
    pub fn is_loaded(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.get().is_some())
    }

    /// Typed values of the array at `index`, decoding them on first access.
    pub fn get<T: NativeElement>(&self, index: usize) -> EclResult<&[T]> {
        let descriptor = self.descriptor(index)?;
        if !T::accepts(descriptor.element_type) {
            return Err(type_mismatch::<T>(descriptor));
        }
        let data = self.get_data(index)?;
        T::slice(data).ok_or_else(|| type_mismatch::<T>(descriptor))
    }

    /// Values of the array at `index` without a type check.
    pub fn get_data(&self, index: usize) -> EclResult<&ArrayData> {
        let slot = self
            .slots
            .get(index)
            .ok_or_else(|| ecl_err!(IndexOutOfRange: index, self.slots.len()))?;
        if let Some(data) = slot.get() {
            return Ok(data);
        }
        let data = self.decode(index)?;
        Ok(slot.get_or_init(|| data))
    }

    /// Typed values of the first array called `name`.
    pub fn get_by_name<T: NativeElement>(&self, name: &str) -> EclResult<&[T]> {
        self.get(self.index_of(name)?)
    }

    /// Typed values of the `occurrence`-th (zero based) array called `name`.
    pub fn get_occurrence<T: NativeElement>(&self, name: &str, occurrence: usize) -> EclResult<&[T]> {
        let positions = self.positions(name);
        let index = positions.get(occurrence).copied().ok_or_else(|| {
            ecl_err!(
                ArrayNotFound: "{} occurrence {} (file holds {})",
                name,
                occurrence,
                positions.len()
            )
        })?;
        self.get(index)
    }

    pub fn load_all(&self) -> EclResult<()> {
        (0..self.directory.len()).try_for_each(|index| self.load_by_index(index))
    }

    pub fn load_by_index(&self, index: usize) -> EclResult<()> {
        self.get_data(index).map(|_| ())
    }

    pub fn load_indices(&self, indices: &[usize]) -> EclResult<()> {
        indices.iter().try_for_each(|&index| self.load_by_index(index))
    }

    /// Decode every occurrence of `name`.
    pub fn load_by_name(&self, name: &str) -> EclResult<()> {
        if !self.has_key(name) {
            return Err(ecl_err!(ArrayNotFound: "{}", name));
        }
        self.load_indices(self.positions(name))
    }

    pub fn metrics(&self) -> &EclMetrics {
        &self.metrics
    }

    fn decode(&self, index: usize) -> EclResult<ArrayData> {
        let descriptor = self.descriptor(index)?;
        let _timer = self.decode_time.time();
        let mut reader = self.reader.borrow_mut();
        reader.seek(SeekFrom::Start(descriptor.locator))?;
        let data = decode_values(
            &mut *reader,
            descriptor.element_type,
            descriptor.count,
            self.format,
        )?;

        self.decodes.inc();
        self.bytes_decoded
            .add(i64::try_from(data.nbytes()).unwrap_or(i64::MAX));
        log::trace!("decoded array {} at position {}", descriptor, index);
        Ok(data)
    }
}

fn scan<R: BufRead + Seek>(reader: &mut R, format: Format) -> EclResult<Vec<ArrayDescriptor>> {
    let mut directory = Vec::new();
    while let Some(header) = decode_header(reader, format)? {
        let locator = reader.stream_position()?;
        skip_values(reader, &header, format)?;
        directory.push(ArrayDescriptor {
            name: header.name,
            element_type: header.element_type,
            count: header.count,
            locator,
        });
    }
    Ok(directory)
}

fn type_mismatch<T: NativeElement>(descriptor: &ArrayDescriptor) -> EclError {
    EclError::TypeMismatch {
        name: descriptor.name.clone(),
        expected: T::ELEMENT_TYPE.to_string(),
        found: descriptor.element_type.to_string(),
    }
}
