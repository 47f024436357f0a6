use chrono::{DateTime, Utc};

/// A time-series point.
pub type Point<V> = (DateTime<Utc>, V);

/// Time series with sorted, unique timestamps, normalized to UTC.
#[derive(Clone, Debug, PartialEq)]
pub struct Series<V> {
    points: Vec<Point<V>>,
}

impl<V: Copy> Series<V> {
    /// Build a series from arbitrary points: sorts by timestamp and keeps
    /// the last observation on duplicate instants.
    pub fn from_points(points: impl IntoIterator<Item = Point<V>>) -> Self {
        let mut points: Vec<_> = points.into_iter().collect();
        points.sort_by_key(|(time, _)| *time);
        // The sort is stable, so reversing lets `dedup` keep the last write:
        points.reverse();
        points.dedup_by_key(|(time, _)| *time);
        points.reverse();
        Self { points }
    }

    /// Insert the value at the instant, overwriting an existing sample.
    pub fn upsert(&mut self, time: DateTime<Utc>, value: V) {
        match self.points.binary_search_by_key(&time, |(time, _)| *time) {
            Ok(index) => self.points[index].1 = value,
            Err(index) => self.points.insert(index, (time, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.points.first().map(|(time, _)| *time)
    }

    pub fn iter(&self) -> impl Iterator<Item = Point<V>> + '_ {
        self.points.iter().copied()
    }

    pub fn carry_forward(&self) -> CarryForward<'_, V> {
        CarryForward { points: &self.points, cursor: None }
    }
}

/// Last-observation-carried-forward cursor.
///
/// Queries must arrive in non-decreasing time order: the cursor is the tail of
/// a two-pointer merge and only ever moves forward.
pub struct CarryForward<'a, V> {
    points: &'a [Point<V>],
    cursor: Option<usize>,
}

impl<V: Copy> CarryForward<'_, V> {
    /// The most recent sample at or before the instant, if any.
    pub fn value_at(&mut self, time: DateTime<Utc>) -> Option<V> {
        loop {
            let next = self.cursor.map_or(0, |index| index + 1);
            match self.points.get(next) {
                Some((sample_time, _)) if *sample_time <= time => self.cursor = Some(next),
                _ => break,
            }
        }
        self.cursor.map(|index| self.points[index].1)
    }
}
