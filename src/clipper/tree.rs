use crate::math::Point2;

use super::engine::Clipper;

/// Index of a node inside its [`PolyTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One contour of the clipping result.
#[derive(Debug, Clone, Default)]
pub struct PolyNode {
    contour: Vec<Point2>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    is_open: bool,
}

impl PolyNode {
    /// Vertices of the contour. Closed contours are implicitly closed and
    /// never repeat their first point.
    #[must_use]
    pub fn contour(&self) -> &[Point2] {
        &self.contour
    }

    /// Contours directly nested inside this one.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Enclosing contour, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// True for a polyline produced from an open subject path.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }
}

/// Result of a clipping run: contours arranged by containment.
///
/// Roots are outer contours and open paths. Children of an outer contour
/// are its holes, children of a hole are outers nested inside it, and so
/// on. Outer contours wind counter-clockwise (positive signed area) unless
/// the engine was configured with `reverse_solution`.
#[derive(Debug, Clone, Default)]
pub struct PolyTree {
    nodes: Vec<PolyNode>,
    roots: Vec<NodeId>,
}

impl PolyTree {
    /// Top-level contours: outers not nested in any hole, and open paths.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Looks up a node; `None` for an id from another tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&PolyNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the run produced no contours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &PolyNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }

    /// Number of contours, open or closed, held by the tree.
    #[must_use]
    pub fn total_contours(&self) -> usize {
        self.nodes.len()
    }

    /// True when the node is a hole, i.e. it sits at an odd depth below the
    /// roots. Open paths are never holes.
    #[must_use]
    pub fn is_hole(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if node.is_open {
            return false;
        }
        let mut hole = false;
        let mut parent = node.parent;
        while let Some(p) = parent {
            hole = !hole;
            parent = self.nodes[p.0].parent;
        }
        hole
    }

    fn push(&mut self, contour: Vec<Point2>, is_open: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PolyNode {
            contour,
            is_open,
            ..PolyNode::default()
        });
        id
    }

    fn attach(&mut self, child: NodeId, parent: Option<NodeId>) {
        match parent {
            Some(p) => {
                self.nodes[child.0].parent = Some(p);
                self.nodes[p.0].children.push(child);
            }
            None => self.roots.push(child),
        }
    }
}

impl Clipper {
    /// Converts the finished rings into a [`PolyTree`].
    pub(super) fn build_tree(&mut self) -> PolyTree {
        let mut tree = PolyTree::default();
        let mut node_of = vec![None; self.out_recs.len()];

        for idx in 0..self.out_recs.len() {
            let Some(pts) = self.out_recs[idx].pts else {
                continue;
            };
            let is_open = self.out_recs[idx].is_open;
            let count = self.ring_len(pts);
            if (is_open && count < 2) || (!is_open && count < 3) {
                continue;
            }
            self.fix_hole_linkage(idx);

            // Walk backwards so outer contours come out counter-clockwise.
            let mut contour = Vec::with_capacity(count);
            let mut op = self.out_pts[pts].prev;
            for _ in 0..count {
                contour.push(self.out_pts[op].pt);
                op = self.out_pts[op].prev;
            }
            node_of[idx] = Some(tree.push(contour, is_open));
        }

        for idx in 0..self.out_recs.len() {
            let Some(node) = node_of[idx] else {
                continue;
            };
            let rec = &self.out_recs[idx];
            let parent = if rec.is_open {
                None
            } else {
                rec.first_left.and_then(|fl| node_of[fl])
            };
            tree.attach(node, parent);
        }
        tree
    }

    /// Points `first_left` at the nearest live ring of opposite hole state.
    fn fix_hole_linkage(&mut self, idx: usize) {
        let rec = &self.out_recs[idx];
        let Some(fl) = rec.first_left else {
            return;
        };
        let is_hole = rec.is_hole;
        if is_hole != self.out_recs[fl].is_hole && self.out_recs[fl].pts.is_some() {
            return;
        }
        let mut orfl = Some(fl);
        while let Some(o) = orfl {
            let candidate = &self.out_recs[o];
            if candidate.is_hole != is_hole && candidate.pts.is_some() {
                break;
            }
            orfl = candidate.first_left;
        }
        self.out_recs[idx].first_left = orfl;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn hole_state_follows_depth() {
        let mut tree = PolyTree::default();
        let outer = tree.push(vec![pt(0.0, 0.0), pt(9.0, 0.0), pt(9.0, 9.0)], false);
        let hole = tree.push(vec![pt(1.0, 1.0), pt(2.0, 2.0), pt(3.0, 1.0)], false);
        let island = tree.push(vec![pt(1.5, 1.2), pt(1.8, 1.5), pt(2.1, 1.2)], false);
        let line = tree.push(vec![pt(0.0, 0.0), pt(1.0, 1.0)], true);
        tree.attach(outer, None);
        tree.attach(hole, Some(outer));
        tree.attach(island, Some(hole));
        tree.attach(line, None);

        assert_eq!(tree.roots(), &[outer, line]);
        assert!(!tree.is_hole(outer));
        assert!(tree.is_hole(hole));
        assert!(!tree.is_hole(island));
        assert!(!tree.is_hole(line));
        assert_eq!(tree.node(hole).unwrap().parent(), Some(outer));
        assert_eq!(tree.node(outer).unwrap().children(), &[hole]);
        assert_eq!(tree.total_contours(), 4);
        assert_eq!(tree.iter().filter(|(_, n)| n.is_open()).count(), 1);
    }

    #[test]
    fn unknown_node_is_not_a_hole() {
        let tree = PolyTree::default();
        assert!(tree.is_empty());
        assert!(tree.node(NodeId(3)).is_none());
        assert!(!tree.is_hole(NodeId(3)));
    }
}
