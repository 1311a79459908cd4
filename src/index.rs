//! Adaptive Index
//!
//! Incremental k-d tree over the points of the sliding window. Points can be
//! inserted one at a time, removed (physically for leaves, by deactivation
//! otherwise) and searched for their k nearest neighbors. Because deletions
//! and unbalanced insertions degrade the tree, the index reports when a full
//! rebuild from the live points is due.
//!
//! Nodes live in an arena and refer to each other by slot, so a rebuild builds
//! a whole new arena and swaps it in one step.
use crate::constants::{REBUILD_DEACTIVATED_RATIO, REBUILD_GROWTH_FACTOR};
use crate::data::{check_dims, check_finite, Point};
use crate::errors::DesDriftError;
use crate::metric::{metric_callables, report_distance, Metric};
use crate::node::{IndexNode, NodeType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Capabilities the ensemble needs from a neighbor search structure.
pub trait NeighborIndex {
    /// Discard the current contents and build from `points`.
    fn build(&mut self, points: Vec<Point>) -> Result<(), DesDriftError>;
    fn insert(&mut self, point: Point) -> Result<(), DesDriftError>;
    fn remove(&mut self, point: &Point) -> Result<(), DesDriftError>;
    fn k_nearest(&self, target: &[f64], k: usize) -> Result<Neighborhood, DesDriftError>;
    fn is_to_rebuild(&self) -> bool;
    /// Number of searchable points.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Searchable points, in no particular order.
    fn points(&self) -> Vec<&Point>;
    fn clear(&mut self);
}

/// A point returned by a search, with its distance to the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub point: Point,
    pub distance: f64,
}

/// Result of a k-nearest search.
///
/// Neighbors are in the order the bounded scan left them, callers that
/// need them sorted should call `sorted`.
#[derive(Debug, Clone, Default)]
pub struct Neighborhood {
    pub neighbors: Vec<Neighbor>,
    /// Nodes entered during the search, active or not.
    pub nodes_visited: usize,
}

impl Neighborhood {
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.neighbors.iter().map(|n| &n.point)
    }

    /// Neighbors ordered by increasing distance.
    pub fn sorted(mut self) -> Self {
        self.neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        self
    }
}

enum Frame {
    /// Evaluate a node, then descend into its preferred child.
    Enter(usize),
    /// The preferred subtree is done, decide on the other child.
    Other(usize),
}

/// Incremental k-d tree with soft deletion and a rebuild heuristic.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct AdaptiveIndex {
    pub metric: Metric,
    /// Neighbor count used by `neighbors`.
    pub n_neighbors: usize,
    n_dims: usize,
    nodes: Vec<IndexNode>,
    free_slots: Vec<usize>,
    root: Option<usize>,
    n_points: usize,
    n_deactivated: usize,
    initial_size: usize,
}

impl Default for AdaptiveIndex {
    fn default() -> Self {
        Self::new(Metric::Euclidean, 5)
    }
}

impl AdaptiveIndex {
    /// Empty index. The dimensionality is taken from the first point stored.
    pub fn new(metric: Metric, n_neighbors: usize) -> Self {
        AdaptiveIndex {
            metric,
            n_neighbors,
            n_dims: 0,
            nodes: Vec::new(),
            free_slots: Vec::new(),
            root: None,
            n_points: 0,
            n_deactivated: 0,
            initial_size: 0,
        }
    }

    pub fn n_dims(&self) -> usize {
        self.n_dims
    }

    pub fn n_deactivated(&self) -> usize {
        self.n_deactivated
    }

    /// Population recorded at the last full build.
    pub fn initial_size(&self) -> usize {
        self.initial_size
    }

    /// Neighbors of `target` using the configured neighbor count.
    pub fn neighbors(&self, target: &[f64]) -> Result<Neighborhood, DesDriftError> {
        self.k_nearest(target, self.n_neighbors)
    }

    /// Closest active point to `target`.
    pub fn nearest(&self, target: &[f64]) -> Result<Option<Neighbor>, DesDriftError> {
        Ok(self.k_nearest(target, 1)?.neighbors.pop())
    }

    /// Number of levels on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, d)) = stack.pop() {
            depth = depth.max(d);
            let node = &self.nodes[idx];
            stack.extend(node.left_child.map(|c| (c, d + 1)));
            stack.extend(node.right_child.map(|c| (c, d + 1)));
        }
        depth
    }

    fn validate_point(&mut self, features: &[f64]) -> Result<(), DesDriftError> {
        if features.is_empty() {
            return Err(DesDriftError::DimensionMismatch(self.n_dims.max(1), 0));
        }
        check_finite(features)?;
        if self.root.is_none() && self.n_points == 0 {
            self.n_dims = features.len();
        }
        check_dims(features, self.n_dims)
    }

    fn alloc(&mut self, node: IndexNode) -> usize {
        match self.free_slots.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Insert sets in median-first order so the incremental tree starts balanced.
    ///
    /// Sibling subsets never share a subtree, so processing them from a work
    /// stack yields the same tree as a depth-first recursion.
    fn build_balanced(&mut self, points: Vec<Point>) {
        let mut work = vec![(points, 0_usize)];
        while let Some((mut points, dim)) = work.pop() {
            match points.len() {
                0 => continue,
                1 => {
                    if let Some(p) = points.pop() {
                        self.insert_unchecked(p);
                    }
                    continue;
                }
                2 => {
                    let (Some(second), Some(first)) = (points.pop(), points.pop()) else {
                        continue;
                    };
                    if first.value(dim) >= second.value(dim) {
                        self.insert_unchecked(first);
                        self.insert_unchecked(second);
                    } else {
                        self.insert_unchecked(second);
                        self.insert_unchecked(first);
                    }
                    continue;
                }
                _ => {}
            }

            let median = lower_median(&points, dim);
            let mut median_point = None;
            let mut left = Vec::new();
            let mut right = Vec::new();
            for p in points {
                let v = p.value(dim);
                if median_point.is_none() && v.total_cmp(&median) == Ordering::Equal {
                    median_point = Some(p);
                } else if v < median {
                    left.push(p);
                } else {
                    right.push(p);
                }
            }
            if let Some(p) = median_point {
                self.insert_unchecked(p);
            }
            let next = (dim + 1) % self.n_dims;
            work.push((right, next));
            work.push((left, next));
        }
    }

    fn insert_unchecked(&mut self, point: Point) {
        let mut parent = None;
        let mut node_type = NodeType::Root;
        let mut split_dim = 0;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            parent = Some(idx);
            if point.value(node.split_dim) < node.split_value() {
                node_type = NodeType::Left;
                current = node.left_child;
            } else {
                node_type = NodeType::Right;
                current = node.right_child;
            }
            split_dim = (node.split_dim + 1) % self.n_dims;
        }

        let slot = self.alloc(IndexNode::new(point, split_dim, parent, node_type));
        match parent {
            None => self.root = Some(slot),
            Some(p) => self.nodes[p].set_child(node_type, Some(slot)),
        }
        self.n_points += 1;
    }

    /// First active node holding exactly `point`, following split dimensions.
    fn search(&self, point: &Point) -> Option<usize> {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if node.active && node.point.same_as(point) {
                return Some(idx);
            }
            current = node.get_child_idx(point.value(node.split_dim));
        }
        None
    }

    /// Unlink a leaf from its parent and free its slot. A parent left
    /// childless and already deactivated goes with it.
    fn detach(&mut self, idx: usize) {
        let mut idx = idx;
        loop {
            let (parent, node_type) = {
                let node = &self.nodes[idx];
                (node.parent_node, node.node_type)
            };
            self.free_slots.push(idx);
            match parent {
                None => {
                    self.root = None;
                    break;
                }
                Some(p) => {
                    self.nodes[p].set_child(node_type, None);
                    let parent_node = &self.nodes[p];
                    if parent_node.active || !parent_node.is_leaf() {
                        break;
                    }
                    self.n_deactivated -= 1;
                    idx = p;
                }
            }
        }
    }

    fn reset_nodes(&mut self) {
        self.nodes = Vec::new();
        self.free_slots = Vec::new();
        self.root = None;
        self.n_points = 0;
        self.n_deactivated = 0;
    }
}

impl NeighborIndex for AdaptiveIndex {
    fn build(&mut self, points: Vec<Point>) -> Result<(), DesDriftError> {
        if let Some(first) = points.first() {
            if first.features.is_empty() {
                return Err(DesDriftError::DimensionMismatch(1, 0));
            }
            let n_dims = first.n_dims();
            for p in &points {
                p.check_dims(n_dims)?;
                p.check_finite()?;
            }
            self.n_dims = n_dims;
        }
        self.reset_nodes();
        self.nodes.reserve(points.len());
        self.build_balanced(points);
        self.initial_size = self.n_points;
        Ok(())
    }

    fn insert(&mut self, point: Point) -> Result<(), DesDriftError> {
        self.validate_point(&point.features)?;
        self.insert_unchecked(point);
        Ok(())
    }

    fn remove(&mut self, point: &Point) -> Result<(), DesDriftError> {
        if self.n_points == 0 {
            return Err(DesDriftError::NotInitialized(
                "the index holds no points to remove".to_string(),
            ));
        }
        point.check_dims(self.n_dims)?;
        let idx = self.search(point).ok_or(DesDriftError::NotFound)?;
        if self.nodes[idx].is_leaf() {
            self.detach(idx);
        } else {
            self.nodes[idx].active = false;
            self.n_deactivated += 1;
        }
        self.n_points -= 1;
        Ok(())
    }

    fn k_nearest(&self, target: &[f64], k: usize) -> Result<Neighborhood, DesDriftError> {
        if self.n_points == 0 {
            return Err(DesDriftError::NotInitialized(
                "the index was not built, train on at least one point first".to_string(),
            ));
        }
        check_dims(target, self.n_dims)?;
        check_finite(target)?;
        if k == 0 {
            return Ok(Neighborhood::default());
        }

        let (distance_fn, bound_fn) = metric_callables(&self.metric);
        // (search distance, slot), scanned linearly for its maximum.
        let mut best: Vec<(f64, usize)> = Vec::with_capacity(k);
        let mut nodes_visited = 0;
        let mut stack: Vec<Frame> = self.root.map(Frame::Enter).into_iter().collect();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(idx) => {
                    nodes_visited += 1;
                    let node = &self.nodes[idx];
                    if node.active {
                        let d = distance_fn(target, &node.point.features);
                        if best.len() < k {
                            best.push((d, idx));
                        } else {
                            let (max_pos, max_d) = worst(&best);
                            if d < max_d {
                                best[max_pos] = (d, idx);
                            }
                        }
                    }
                    let (preferred, _) = node.ordered_children(target[node.split_dim]);
                    stack.push(Frame::Other(idx));
                    if let Some(child) = preferred {
                        stack.push(Frame::Enter(child));
                    }
                }
                Frame::Other(idx) => {
                    let node = &self.nodes[idx];
                    let t = target[node.split_dim];
                    if let (_, Some(other)) = node.ordered_children(t) {
                        if best.len() < k || bound_fn(t, node.split_value()) <= worst(&best).1 {
                            stack.push(Frame::Enter(other));
                        }
                    }
                }
            }
        }

        let neighbors = best
            .into_iter()
            .map(|(d, idx)| Neighbor {
                point: self.nodes[idx].point.clone(),
                distance: report_distance(&self.metric, d),
            })
            .collect();
        Ok(Neighborhood {
            neighbors,
            nodes_visited,
        })
    }

    fn is_to_rebuild(&self) -> bool {
        if self.n_points == 0 {
            return self.n_deactivated > 0;
        }
        let deactivated_ratio = self.n_deactivated as f64 / self.n_points as f64;
        deactivated_ratio >= REBUILD_DEACTIVATED_RATIO || self.n_points > REBUILD_GROWTH_FACTOR * self.initial_size
    }

    fn len(&self) -> usize {
        self.n_points
    }

    fn points(&self) -> Vec<&Point> {
        let mut points = Vec::with_capacity(self.n_points);
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.active {
                points.push(&node.point);
            }
            stack.extend(node.right_child);
            stack.extend(node.left_child);
        }
        points
    }

    fn clear(&mut self) {
        self.reset_nodes();
        self.initial_size = 0;
        self.n_dims = 0;
    }
}

/// Position and value of the largest distance in a non-empty result set.
fn worst(best: &[(f64, usize)]) -> (usize, f64) {
    let mut max_pos = 0;
    let mut max_d = best[0].0;
    for (i, (d, _)) in best.iter().enumerate() {
        if *d > max_d {
            max_d = *d;
            max_pos = i;
        }
    }
    (max_pos, max_d)
}

/// The `((n + 1) / 2)`-th smallest value along `dim`.
fn lower_median(points: &[Point], dim: usize) -> f64 {
    let mut values: Vec<f64> = points.iter().map(|p| p.value(dim)).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values[(values.len() + 1) / 2 - 1]
}
