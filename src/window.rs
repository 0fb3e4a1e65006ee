//! Time-bounded sample buffer

use crate::frame::{Sample, SampleField};
use chrono::{DateTime, Local, TimeDelta};
use std::collections::VecDeque;

/// How long a sample stays in the window, in seconds
pub const RETENTION_SECS: i64 = 10;

/// Ordered buffer of samples, bounded by age instead of count
///
/// Insertion order is time order. Every append runs a full eviction pass, so
/// the buffer size tracks `arrival rate × RETENTION_SECS` with no hard cap.
#[derive(Debug, Default)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample and evict against the current wall clock
    pub fn append(&mut self, sample: Sample) {
        self.append_at(sample, Local::now());
    }

    /// Append a sample and evict against `now`
    pub fn append_at(&mut self, sample: Sample, now: DateTime<Local>) {
        self.samples.push_back(sample);
        self.evict_at(now);
    }

    /// Drop every sample not strictly newer than `now - RETENTION_SECS`
    ///
    /// Returns the number of samples removed.
    pub fn evict_at(&mut self, now: DateTime<Local>) -> usize {
        let cutoff = now - TimeDelta::seconds(RETENTION_SECS);
        let before = self.samples.len();
        self.samples.retain(|s| s.captured_at > cutoff);
        before - self.samples.len()
    }

    /// Read-only view of the named fields, oldest first
    pub fn projection(&self, fields: &[SampleField]) -> Projection {
        let points = self
            .samples
            .iter()
            .map(|s| ProjectedPoint {
                captured_at: s.captured_at,
                values: fields.iter().map(|f| f.value(s)).collect(),
            })
            .collect();

        Projection {
            fields: fields.to_vec(),
            points,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recently appended sample
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Time between the oldest and newest retained samples
    pub fn span(&self) -> TimeDelta {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => last.captured_at - first.captured_at,
            _ => TimeDelta::zero(),
        }
    }
}

/// One row of a [`Projection`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPoint {
    pub captured_at: DateTime<Local>,
    /// Values in the order of [`Projection::fields`]
    pub values: Vec<f32>,
}

/// Field subset of the window, ready for charting
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub fields: Vec<SampleField>,
    pub points: Vec<ProjectedPoint>,
}

impl Projection {
    /// Time series for the field at `index`
    pub fn series(&self, index: usize) -> impl Iterator<Item = (DateTime<Local>, f32)> + '_ {
        self.points
            .iter()
            .filter_map(move |p| p.values.get(index).map(|&v| (p.captured_at, v)))
    }
}
