//! Sliding Window
//!
//! Bounded, ordered sequence of the most recent points. The index is built
//! from it, and it is cut back to the points of the new concept after a drift.
use crate::data::Point;
use std::collections::vec_deque::Iter;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct SlidingWindow {
    points: VecDeque<Point>,
    max_size: usize,
}

impl SlidingWindow {
    pub fn new(max_size: usize) -> Self {
        SlidingWindow {
            points: VecDeque::new(),
            max_size,
        }
    }

    /// Append at the tail. Returns the oldest point if the cap was exceeded.
    pub fn push(&mut self, point: Point) -> Option<Point> {
        self.points.push_back(point);
        if self.points.len() > self.max_size {
            self.points.pop_front()
        } else {
            None
        }
    }

    /// Keep only the `n` most recent points, returning how many were dropped.
    pub fn retain_recent(&mut self, n: usize) -> usize {
        let mut dropped = 0;
        while self.points.len() > n {
            self.points.pop_front();
            dropped += 1;
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn iter(&self) -> Iter<'_, Point> {
        self.points.iter()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.back()
    }

    /// Owned copy of the window, oldest first, for building an index.
    pub fn to_vec(&self) -> Vec<Point> {
        self.points.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl<'a> IntoIterator for &'a SlidingWindow {
    type Item = &'a Point;
    type IntoIter = Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(v: f64) -> Point {
        Point::new(vec![v], 0)
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut window = SlidingWindow::new(3);
        assert!(window.push(p(1.0)).is_none());
        assert!(window.push(p(2.0)).is_none());
        assert!(window.push(p(3.0)).is_none());
        let evicted = window.push(p(4.0)).unwrap();
        assert_eq!(evicted.value(0), 1.0);
        assert_eq!(window.len(), 3);
        assert_eq!(window.last().unwrap().value(0), 4.0);
    }

    #[test]
    fn test_retain_recent() {
        let mut window = SlidingWindow::new(100);
        for i in 0..10 {
            window.push(p(i as f64));
        }
        assert_eq!(window.retain_recent(4), 6);
        let values: Vec<f64> = window.iter().map(|q| q.value(0)).collect();
        assert_eq!(values, vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(window.retain_recent(10), 0);
        window.clear();
        assert!(window.is_empty());
    }
}
