use crate::data::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which child slot of its parent a node occupies.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum NodeType {
    Root,
    Left,
    Right,
}

/// A k-d tree node stored in the index arena.
///
/// Children and parent are arena slots. The split dimension is fixed when
/// the node is created and never recomputed.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct IndexNode {
    pub point: Point,
    pub split_dim: usize,
    pub left_child: Option<usize>,
    pub right_child: Option<usize>,
    pub parent_node: Option<usize>,
    pub node_type: NodeType,
    /// Cleared on soft delete, the node keeps routing searches.
    pub active: bool,
}

impl IndexNode {
    pub fn new(point: Point, split_dim: usize, parent_node: Option<usize>, node_type: NodeType) -> Self {
        IndexNode {
            point,
            split_dim,
            left_child: None,
            right_child: None,
            parent_node,
            node_type,
            active: true,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left_child.is_none() && self.right_child.is_none()
    }

    /// Value of the stored point along this node's split dimension.
    #[inline]
    pub fn split_value(&self) -> f64 {
        self.point.value(self.split_dim)
    }

    /// The child a value should descend into: left if strictly less, else right.
    #[inline]
    pub fn get_child_idx(&self, v: f64) -> Option<usize> {
        if v < self.split_value() {
            self.left_child
        } else {
            self.right_child
        }
    }

    /// Preferred and other child for a target value, in search order.
    #[inline]
    pub fn ordered_children(&self, v: f64) -> (Option<usize>, Option<usize>) {
        if v >= self.split_value() {
            (self.right_child, self.left_child)
        } else {
            (self.left_child, self.right_child)
        }
    }

    pub fn set_child(&mut self, node_type: NodeType, child: Option<usize>) {
        match node_type {
            NodeType::Left => self.left_child = child,
            NodeType::Right => self.right_child = child,
            NodeType::Root => {}
        }
    }
}

impl fmt::Display for IndexNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}[dim={}{}] left={:?},right={:?}",
            self.point,
            self.split_dim,
            if self.active { "" } else { ",inactive" },
            self.left_child,
            self.right_child
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_routing() {
        let mut node = IndexNode::new(Point::new(vec![1.0, 5.0], 0), 1, None, NodeType::Root);
        node.set_child(NodeType::Left, Some(3));
        node.set_child(NodeType::Right, Some(4));
        assert!(!node.is_leaf());
        assert_eq!(node.split_value(), 5.0);
        assert_eq!(node.get_child_idx(4.9), Some(3));
        assert_eq!(node.get_child_idx(5.0), Some(4));
        assert_eq!(node.ordered_children(5.0), (Some(4), Some(3)));
        assert_eq!(node.ordered_children(-1.0), (Some(3), Some(4)));
        node.set_child(NodeType::Left, None);
        node.set_child(NodeType::Right, None);
        assert!(node.is_leaf());
    }
}
