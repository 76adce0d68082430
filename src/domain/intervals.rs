//! Canonical interval decomposition of version ranges
//!
//! Every [`VersionRange`] can be rewritten as a sorted list of disjoint,
//! non-adjacent intervals. The interval form is what range simplification
//! and minor relaxation work on.
//!
//! Since `1.2 == 1.2.0` no version has an immediate successor, so a bound
//! cannot always be turned from inclusive to exclusive by bumping the
//! version. Each finite bound therefore records its own [`Bound`] kind.

use super::version::Version;
use super::version_range::VersionRange;
use std::cmp::Ordering;

/// Whether a finite bound includes its version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Inclusive,
    Exclusive,
}

impl Bound {
    fn flip(self) -> Self {
        match self {
            Bound::Inclusive => Bound::Exclusive,
            Bound::Exclusive => Bound::Inclusive,
        }
    }
}

/// Lower end of an interval; always finite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerBound {
    pub version: Version,
    pub bound: Bound,
}

impl LowerBound {
    pub fn new(version: Version, bound: Bound) -> Self {
        Self { version, bound }
    }

    /// `>= 0`, the lowest possible bound
    pub fn minimum() -> Self {
        Self::new(Version::zero(), Bound::Inclusive)
    }

    fn admits(&self, v: &Version) -> bool {
        match self.bound {
            Bound::Inclusive => v >= &self.version,
            Bound::Exclusive => v > &self.version,
        }
    }
}

impl Ord for LowerBound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version).then_with(|| {
            // an inclusive lower bound starts earlier than an exclusive one
            match (self.bound, other.bound) {
                (Bound::Inclusive, Bound::Exclusive) => Ordering::Less,
                (Bound::Exclusive, Bound::Inclusive) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        })
    }
}

impl PartialOrd for LowerBound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Upper end of an interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpperBound {
    Bounded(Version, Bound),
    Unbounded,
}

impl UpperBound {
    fn admits(&self, v: &Version) -> bool {
        match self {
            UpperBound::Unbounded => true,
            UpperBound::Bounded(u, Bound::Inclusive) => v <= u,
            UpperBound::Bounded(u, Bound::Exclusive) => v < u,
        }
    }
}

impl Ord for UpperBound {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (UpperBound::Unbounded, UpperBound::Unbounded) => Ordering::Equal,
            (UpperBound::Unbounded, _) => Ordering::Greater,
            (_, UpperBound::Unbounded) => Ordering::Less,
            (UpperBound::Bounded(a, ab), UpperBound::Bounded(b, bb)) => {
                a.cmp(b).then_with(|| match (ab, bb) {
                    (Bound::Exclusive, Bound::Inclusive) => Ordering::Less,
                    (Bound::Inclusive, Bound::Exclusive) => Ordering::Greater,
                    _ => Ordering::Equal,
                })
            }
        }
    }
}

impl PartialOrd for UpperBound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A contiguous set of versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub lower: LowerBound,
    pub upper: UpperBound,
}

impl Interval {
    pub fn new(lower: LowerBound, upper: UpperBound) -> Self {
        Self { lower, upper }
    }

    /// Returns true if no version lies inside this interval
    pub fn is_empty(&self) -> bool {
        match &self.upper {
            UpperBound::Unbounded => false,
            UpperBound::Bounded(u, ub) => match self.lower.version.cmp(u) {
                Ordering::Less => false,
                Ordering::Equal => {
                    !(self.lower.bound == Bound::Inclusive && *ub == Bound::Inclusive)
                }
                Ordering::Greater => true,
            },
        }
    }

    pub fn contains(&self, v: &Version) -> bool {
        self.lower.admits(v) && self.upper.admits(v)
    }

    /// True if `next` (starting no earlier than `self`) overlaps or touches `self`
    fn touches(&self, next: &Interval) -> bool {
        match &self.upper {
            UpperBound::Unbounded => true,
            UpperBound::Bounded(u, ub) => match u.cmp(&next.lower.version) {
                Ordering::Greater => true,
                Ordering::Equal => *ub == Bound::Inclusive || next.lower.bound == Bound::Inclusive,
                Ordering::Less => false,
            },
        }
    }

    fn to_range(&self) -> VersionRange {
        let lower_is_minimum = self.lower == LowerBound::minimum();
        match (&self.upper, lower_is_minimum) {
            (UpperBound::Unbounded, true) => VersionRange::Any,
            (UpperBound::Unbounded, false) => lower_range(&self.lower),
            (UpperBound::Bounded(u, ub), _)
                if *u == self.lower.version
                    && *ub == Bound::Inclusive
                    && self.lower.bound == Bound::Inclusive =>
            {
                VersionRange::This(u.clone())
            }
            (UpperBound::Bounded(u, ub), true) => upper_range(u, *ub),
            (UpperBound::Bounded(u, ub), false) => {
                lower_range(&self.lower).intersect(upper_range(u, *ub))
            }
        }
    }
}

fn lower_range(lower: &LowerBound) -> VersionRange {
    match lower.bound {
        Bound::Inclusive => VersionRange::OrLater(lower.version.clone()),
        Bound::Exclusive => VersionRange::Later(lower.version.clone()),
    }
}

fn upper_range(version: &Version, bound: Bound) -> VersionRange {
    match bound {
        Bound::Inclusive => VersionRange::OrEarlier(version.clone()),
        Bound::Exclusive => VersionRange::Earlier(version.clone()),
    }
}

/// Sorted, disjoint, non-adjacent intervals
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionIntervals {
    intervals: Vec<Interval>,
}

impl VersionIntervals {
    /// No versions at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every version
    pub fn full() -> Self {
        Self::from_interval(Interval::new(LowerBound::minimum(), UpperBound::Unbounded))
    }

    pub fn exactly(v: Version) -> Self {
        Self::from_interval(Interval::new(
            LowerBound::new(v.clone(), Bound::Inclusive),
            UpperBound::Bounded(v, Bound::Inclusive),
        ))
    }

    pub fn later(v: Version) -> Self {
        Self::from_interval(Interval::new(
            LowerBound::new(v, Bound::Exclusive),
            UpperBound::Unbounded,
        ))
    }

    pub fn or_later(v: Version) -> Self {
        Self::from_interval(Interval::new(
            LowerBound::new(v, Bound::Inclusive),
            UpperBound::Unbounded,
        ))
    }

    pub fn earlier(v: Version) -> Self {
        Self::from_interval(Interval::new(
            LowerBound::minimum(),
            UpperBound::Bounded(v, Bound::Exclusive),
        ))
    }

    pub fn or_earlier(v: Version) -> Self {
        Self::from_interval(Interval::new(
            LowerBound::minimum(),
            UpperBound::Bounded(v, Bound::Inclusive),
        ))
    }

    /// `[lower, upper)`
    pub fn between(lower: Version, upper: Version) -> Self {
        Self::from_interval(Interval::new(
            LowerBound::new(lower, Bound::Inclusive),
            UpperBound::Bounded(upper, Bound::Exclusive),
        ))
    }

    fn from_interval(interval: Interval) -> Self {
        Self::normalize(vec![interval])
    }

    /// Sorts, drops empty intervals and merges overlapping or touching ones
    fn normalize(mut intervals: Vec<Interval>) -> Self {
        intervals.retain(|i| !i.is_empty());
        intervals.sort_by(|a, b| a.lower.cmp(&b.lower));

        let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
        for interval in intervals {
            match merged.last_mut() {
                Some(last) if last.touches(&interval) => {
                    if interval.upper > last.upper {
                        last.upper = interval.upper;
                    }
                }
                _ => merged.push(interval),
            }
        }
        Self { intervals: merged }
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The interval with the greatest lower bound
    pub fn last(&self) -> Option<&Interval> {
        self.intervals.last()
    }

    pub fn contains(&self, v: &Version) -> bool {
        self.intervals.iter().any(|i| i.contains(v))
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut all = self.intervals.clone();
        all.extend(other.intervals.iter().cloned());
        Self::normalize(all)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let a = &self.intervals[i];
            let b = &other.intervals[j];
            let lower = a.lower.clone().max(b.lower.clone());
            let upper = a.upper.clone().min(b.upper.clone());
            result.push(Interval::new(lower, upper));
            if a.upper < b.upper {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self::normalize(result)
    }

    pub fn complement(&self) -> Self {
        let mut gaps = Vec::new();
        let mut cursor = Some(LowerBound::minimum());

        for interval in &self.intervals {
            let Some(start) = cursor.take() else { break };
            gaps.push(Interval::new(
                start,
                UpperBound::Bounded(interval.lower.version.clone(), interval.lower.bound.flip()),
            ));
            cursor = match &interval.upper {
                UpperBound::Unbounded => None,
                UpperBound::Bounded(u, ub) => Some(LowerBound::new(u.clone(), ub.flip())),
            };
        }
        if let Some(start) = cursor {
            gaps.push(Interval::new(start, UpperBound::Unbounded));
        }
        Self::normalize(gaps)
    }

    /// Rebuilds the canonical range for these intervals
    pub fn to_range(&self) -> VersionRange {
        let mut ranges = self.intervals.iter().map(Interval::to_range);
        match ranges.next() {
            None => VersionRange::None,
            Some(first) => ranges.fold(first, VersionRange::union),
        }
    }
}

/// Widens a range so newer minor and patch releases match, but not a new major line
///
/// The last interval `[v0, ..)` is replaced by `>=v0 && <a.(b+1)` where `a.b` are
/// the first two components of `v0`. Ranges whose last interval is open above,
/// and ranges matching nothing, are returned unchanged.
pub fn relax_minor(range: &VersionRange) -> VersionRange {
    let intervals = range.intervals();
    let Some(last) = intervals.last() else {
        return range.clone();
    };
    match last.upper {
        UpperBound::Unbounded => range.clone(),
        UpperBound::Bounded(..) => {
            let v0 = last.lower.version.clone();
            let upper = v0.major_upper_bound();
            VersionRange::OrLater(v0).intersect(VersionRange::Earlier(upper))
        }
    }
}
