#![deny(missing_docs)]
//! eclio metrics
//!
//! Stores and writers report how much decoding and writing they do through a shared
//! registry. A registry is cheap to clone; clones observe the same metrics.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use witchcraft_metrics::{Metric, MetricRegistry, Metrics, MetricsIter};

// re-export exposed metric types
pub use witchcraft_metrics::{Counter, MetricId, Timer};

/// Number of array payloads decoded by a store.
pub const STORE_DECODES: &str = "eclio.store.decodes";
/// Number of value bytes materialized by a store.
pub const STORE_BYTES_DECODED: &str = "eclio.store.bytes_decoded";
/// Time spent decoding array payloads in a store.
pub const STORE_DECODE_TIME: &str = "eclio.store.decode_time";
/// Number of arrays appended by a writer.
pub const WRITER_ARRAYS: &str = "eclio.writer.arrays";
/// Number of bytes appended by a writer.
pub const WRITER_BYTES: &str = "eclio.writer.bytes";

/// A metric registry shared between stores, writers and their callers.
#[derive(Default, Clone)]
pub struct EclMetrics {
    registry: Arc<MetricRegistry>,
    default_tags: Arc<DefaultTags>,
}

/// Default tags for metrics used in [`EclMetrics`].
#[derive(Default)]
pub struct DefaultTags(BTreeMap<Cow<'static, str>, Cow<'static, str>>);

impl<K, V> From<&[(K, V)]> for DefaultTags
where
    K: Clone + Into<Cow<'static, str>>,
    V: Clone + Into<Cow<'static, str>>,
{
    fn from(pairs: &[(K, V)]) -> Self {
        DefaultTags(
            pairs
                .iter()
                .map(|(k, v)| (k.clone().into(), v.clone().into()))
                .collect(),
        )
    }
}

impl EclMetrics {
    /// Create an empty metric registry with default tags, e.g. the file being read.
    pub fn with_tags(default_tags: impl Into<DefaultTags>) -> Self {
        Self {
            registry: Arc::new(MetricRegistry::default()),
            default_tags: Arc::new(default_tags.into()),
        }
    }

    /// Returns the counter with the specified ID, creating a default instance if absent.
    ///
    /// # Panics
    ///
    /// Panics if a metric is registered with the ID that is not a counter.
    pub fn counter<T>(&self, id: T) -> Arc<Counter>
    where
        T: Into<MetricId>,
    {
        self.registry.counter(id)
    }

    /// Returns the timer with the specified ID, creating a default instance if absent.
    ///
    /// # Panics
    ///
    /// Panics if a metric is registered with the ID that is not a timer.
    pub fn timer<T>(&self, id: T) -> Arc<Timer>
    where
        T: Into<MetricId>,
    {
        self.registry.timer(id)
    }

    /// Current value of the counter with the specified ID, zero if it was never touched.
    pub fn count<T>(&self, id: T) -> i64
    where
        T: Into<MetricId>,
    {
        self.registry.counter(id).count()
    }

    /// Returns a snapshot of the metrics in the registry.
    ///
    /// Modifications to the registry after this method is called will not affect the state of the returned `MetricsSnapshot`.
    pub fn metrics(&self) -> MetricsSnapshot<'_> {
        MetricsSnapshot {
            snapshot: self.registry.metrics(),
            default_tags: &self.default_tags,
        }
    }
}

/// A snapshot of the metrics in a registry with default tags.
pub struct MetricsSnapshot<'a> {
    snapshot: Metrics,
    default_tags: &'a DefaultTags,
}

impl MetricsSnapshot<'_> {
    /// Create an iterator over the metrics snapshot.
    pub fn iter(&self) -> EclMetricsIter<'_> {
        EclMetricsIter {
            iter: self.snapshot.iter(),
            default_tags: self.default_tags,
        }
    }
}

/// Metrics Iterator that applies the default tags to each metric in the inner iterator.
pub struct EclMetricsIter<'a> {
    iter: MetricsIter<'a>,
    default_tags: &'a DefaultTags,
}

impl<'a> Iterator for EclMetricsIter<'a> {
    type Item = (MetricId, &'a Metric);

    #[inline]
    fn next(&mut self) -> Option<(MetricId, &'a Metric)> {
        self.iter.next().map(|(k, v)| {
            let mut metric_id = k.clone();
            for (tag_key, tag_value) in self.default_tags.0.iter() {
                metric_id = metric_id.with_tag(tag_key.clone(), tag_value.clone())
            }

            (metric_id, v)
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}
