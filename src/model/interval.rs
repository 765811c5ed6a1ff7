// Copyright @yucwang 2026

use crate::core::error::CommitError;
use crate::core::sampler::FieldSampler;
use crate::math::constants::Float;
use crate::math::range::Range1f;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Build/release accounting for interval contexts created by one builder.
/// The counters stand in for the native resource table: a leak shows up as
/// `live() != 0` after every context should be gone.
#[derive(Default)]
pub struct ContextStats {
    builds: AtomicUsize,
    releases: AtomicUsize,
}

impl ContextStats {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.builds() - self.releases()
    }
}

/// Native interval-sampling acceleration resource. Bound to exactly one
/// sampler, holds the ordered value ranges where sampling must not be
/// skipped. Immutable once finalized; rebuilt from scratch on every commit,
/// never patched in place.
pub struct IntervalContext {
    sampler: Arc<dyn FieldSampler>,
    ranges: Vec<Range1f>,
    stats: Arc<ContextStats>,
}

impl IntervalContext {
    pub fn sampler(&self) -> &Arc<dyn FieldSampler> {
        &self.sampler
    }

    pub fn ranges(&self) -> &[Range1f] {
        &self.ranges
    }

    /// True when `value` falls inside any interesting range, i.e. traversal
    /// must evaluate this sample instead of skipping it.
    pub fn value_interesting(&self, value: Float) -> bool {
        self.ranges.iter().any(|r| r.contains(value))
    }
}

impl Drop for IntervalContext {
    fn drop(&mut self) {
        self.stats.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Constructs finalized interval contexts. A pure function of
/// (sampler, range set): equal inputs yield behaviorally equal contexts.
#[derive(Clone, Default)]
pub struct IntervalContextBuilder {
    stats: Arc<ContextStats>,
}

impl IntervalContextBuilder {
    pub fn new() -> Self {
        Self { stats: Arc::new(ContextStats::default()) }
    }

    pub fn stats(&self) -> Arc<ContextStats> {
        Arc::clone(&self.stats)
    }

    /// Finalize a context over `ranges`. The range set must be non-empty;
    /// a caller with no interesting ranges substitutes the degenerate
    /// sentinel range itself, the builder invents no defaults.
    pub fn build(
        &self,
        sampler: Arc<dyn FieldSampler>,
        ranges: Vec<Range1f>,
    ) -> Result<IntervalContext, CommitError> {
        if ranges.is_empty() {
            return Err(CommitError::Resource(
                "interval context requires at least one value range".to_string(),
            ));
        }

        self.stats.builds.fetch_add(1, Ordering::SeqCst);
        Ok(IntervalContext {
            sampler,
            ranges,
            stats: Arc::clone(&self.stats),
        })
    }
}
