use std::fs::File;
use std::io::{Read, Seek};
use std::ops::Range;
use std::path::Path;

use eclio_dtype::{ArrayData, ElementType, NativeElement};
use eclio_error::{EclError, EclResult, ecl_bail, ecl_err};

use crate::{ArrayDescriptor, ArrayStore};

/// Name of the `INTE` array that opens every report step.
pub const SEQNUM: &str = "SEQNUM";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReportStep {
    number: i32,
    /// Directory positions of the step's arrays, marker excluded.
    range: Range<usize>,
}

/// A unified restart file: one array store partitioned into report steps.
///
/// Each step starts with a `SEQNUM` marker whose first value is the step number. Arrays
/// written before the first marker form step 0. Every array other than a marker belongs to
/// exactly one step.
pub struct RestartFile<R = File> {
    store: ArrayStore<R>,
    steps: Vec<ReportStep>,
}

impl RestartFile<File> {
    pub fn open(path: impl AsRef<Path>) -> EclResult<Self> {
        Self::new(ArrayStore::open(path)?)
    }
}

impl<R: Read + Seek> RestartFile<R> {
    /// Partition an opened store into report steps. Only the markers are decoded.
    pub fn new(store: ArrayStore<R>) -> EclResult<Self> {
        let markers = store.positions(SEQNUM);
        let mut steps = Vec::with_capacity(markers.len() + 1);

        let first = markers.first().copied().unwrap_or(store.len());
        if first > 0 {
            steps.push(ReportStep {
                number: 0,
                range: 0..first,
            });
        }

        for (i, &marker) in markers.iter().enumerate() {
            let number = step_number(&store, marker)?;
            if let Some(previous) = steps.last() {
                if number <= previous.number {
                    ecl_bail!(
                        MalformedFile: "report step {} follows step {}",
                        number,
                        previous.number
                    );
                }
            }
            let end = markers.get(i + 1).copied().unwrap_or(store.len());
            steps.push(ReportStep {
                number,
                range: marker + 1..end,
            });
        }

        log::debug!("indexed {} report steps", steps.len());
        Ok(Self { store, steps })
    }

    pub fn has_step(&self, step: i32) -> bool {
        self.find(step).is_some()
    }

    /// Step numbers in file order.
    pub fn list_steps(&self) -> Vec<i32> {
        self.steps.iter().map(|s| s.number).collect()
    }

    /// Directory positions covered by `step`.
    pub fn step_range(&self, step: i32) -> EclResult<Range<usize>> {
        self.find(step)
            .map(|s| s.range.clone())
            .ok_or(EclError::StepNotFound(step))
    }

    /// Descriptors of the arrays in `step`; empty for steps that do not exist.
    pub fn list_arrays_for_step(&self, step: i32) -> &[ArrayDescriptor] {
        self.find(step)
            .and_then(|s| self.store.get_list().get(s.range.clone()))
            .unwrap_or_default()
    }

    pub fn has_array(&self, name: &str, step: i32) -> bool {
        self.positions_in_step(name, step)
            .is_ok_and(|positions| !positions.is_empty())
    }

    /// Decode every array of `step`.
    pub fn load_step(&self, step: i32) -> EclResult<()> {
        self.step_range(step)?
            .try_for_each(|index| self.store.load_by_index(index))
    }

    /// Typed values of the first array called `name` in `step`.
    pub fn get<T: NativeElement>(&self, name: &str, step: i32) -> EclResult<&[T]> {
        self.get_occurrence(name, step, 0)
    }

    /// Typed values of the `occurrence`-th (zero based) array called `name` in `step`.
    pub fn get_occurrence<T: NativeElement>(
        &self,
        name: &str,
        step: i32,
        occurrence: usize,
    ) -> EclResult<&[T]> {
        let index = self
            .positions_in_step(name, step)?
            .get(occurrence)
            .copied()
            .ok_or_else(|| EclError::ArrayNotFoundInStep {
                name: name.to_string(),
                step,
            })?;
        self.store.get(index)
    }

    /// Number of arrays called `name` in `step`.
    pub fn occurrence_count(&self, name: &str, step: i32) -> EclResult<usize> {
        self.positions_in_step(name, step).map(<[usize]>::len)
    }

    /// Every array of `step`, decoded, in file order.
    pub fn step_arrays(&self, step: i32) -> EclResult<Vec<(&str, &ArrayData)>> {
        self.step_range(step)?
            .map(|index| {
                let descriptor = self.store.descriptor(index)?;
                Ok((descriptor.name.as_str(), self.store.get_data(index)?))
            })
            .collect()
    }

    pub fn store(&self) -> &ArrayStore<R> {
        &self.store
    }

    pub fn into_store(self) -> ArrayStore<R> {
        self.store
    }

    fn find(&self, step: i32) -> Option<&ReportStep> {
        self.steps
            .binary_search_by_key(&step, |s| s.number)
            .ok()
            .and_then(|i| self.steps.get(i))
    }

    fn positions_in_step(&self, name: &str, step: i32) -> EclResult<&[usize]> {
        let range = self
            .find(step)
            .map(|s| &s.range)
            .ok_or(EclError::StepNotFound(step))?;
        Ok(self.store.positions_in(name, range))
    }
}

fn step_number<R: Read + Seek>(store: &ArrayStore<R>, marker: usize) -> EclResult<i32> {
    let descriptor = store.descriptor(marker)?;
    if descriptor.element_type != ElementType::Inte {
        ecl_bail!(
            MalformedFile: "{} marker at position {} has type {}",
            SEQNUM,
            marker,
            descriptor.element_type
        );
    }
    store
        .get::<i32>(marker)?
        .first()
        .copied()
        .ok_or_else(|| ecl_err!(MalformedFile: "empty {} marker at position {}", SEQNUM, marker))
}
