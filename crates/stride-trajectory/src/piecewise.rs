//! Piecewise composition of functions.
//!
//! Each segment is registered with the upper bound of the interval it covers.
//! A query at `t` is dispatched to the segment with the smallest upper bound
//! that is `>= t`, so a segment appended with bound `t_i` covers
//! `(t_{i-1}, t_i]`. The composite domain is `[lower_limit, max bound]`.

use std::sync::Arc;

use stride_core::error::DomainError;

use crate::func::{FuncValue, Function};

/// Function composed of segments, each valid up to its upper bound.
///
/// Segments are held behind `Arc` so the same segment can be shared between
/// several trajectories (e.g. the x/y/z channels of one plan) and cloning a
/// whole piecewise function only bumps reference counts.
#[derive(Clone, Debug)]
pub struct PiecewiseFunction<T: FuncValue> {
    /// Segments sorted by strictly increasing upper bound.
    segments: Vec<(f64, Arc<dyn Function<T>>)>,
    /// Lower limit of the domain.
    lower_limit: f64,
}

impl<T: FuncValue> Default for PiecewiseFunction<T> {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            lower_limit: f64::NEG_INFINITY,
        }
    }
}

impl<T: FuncValue> PiecewiseFunction<T> {
    /// Create an empty piecewise function.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a segment valid up to `upper_bound`.
    ///
    /// Bounds are expected in increasing order. Appending a bound that is
    /// already registered keeps the existing segment.
    pub fn append(&mut self, upper_bound: f64, func: Arc<dyn Function<T>>) {
        let idx = self.segments.partition_point(|(bound, _)| *bound < upper_bound);
        if self
            .segments
            .get(idx)
            .is_some_and(|(bound, _)| *bound == upper_bound)
        {
            return;
        }
        self.segments.insert(idx, (upper_bound, func));
    }

    /// Set the lower limit of the domain, independent of the segments.
    pub fn set_domain_lower_limit(&mut self, t: f64) {
        self.lower_limit = t;
    }

    /// Remove all segments and reset the lower limit to `-inf`.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.lower_limit = f64::NEG_INFINITY;
    }

    /// Number of registered segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment responsible for `t`, after checking the domain.
    fn segment(&self, t: f64) -> Result<&Arc<dyn Function<T>>, DomainError> {
        let upper = self.domain_upper_limit();
        // Written so that NaN fails the check too.
        if !(self.lower_limit <= t && t <= upper) {
            return Err(DomainError::OutOfRange {
                t,
                lower: self.lower_limit,
                upper,
            });
        }
        let idx = self.segments.partition_point(|(bound, _)| *bound < t);
        self.segments
            .get(idx)
            .map(|(_, func)| func)
            .ok_or(DomainError::NoSegment { t })
    }
}

impl<T: FuncValue> Function<T> for PiecewiseFunction<T> {
    fn evaluate(&self, t: f64) -> Result<T, DomainError> {
        self.segment(t)?.evaluate(t)
    }

    fn derivative(&self, t: f64, order: usize) -> Result<T, DomainError> {
        self.segment(t)?.derivative(t, order)
    }

    fn domain_lower_limit(&self) -> f64 {
        self.lower_limit
    }

    /// Greatest registered upper bound, or `+inf` while empty.
    fn domain_upper_limit(&self) -> f64 {
        self.segments
            .last()
            .map_or(f64::INFINITY, |(bound, _)| *bound)
    }
}
