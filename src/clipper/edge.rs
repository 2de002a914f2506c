use crate::math::polygon_2d::{products_equal, pt2_is_between, slopes_equal3};
use crate::math::{Point2, Vector2, HORIZONTAL};

use super::engine::Clipper;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the clipper's edge arena.
    pub struct EdgeId;
}

/// Which operand of the boolean operation a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolyType {
    #[default]
    Subject,
    Clip,
}

/// Side of its local minimum an edge bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Side {
    #[default]
    Left,
    Right,
}

/// Output ring an edge is feeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum OutIdx {
    #[default]
    Unassigned,
    /// Marks the closing edge of an open path; never enters the AEL.
    Skip,
    Ring(usize),
}

impl OutIdx {
    pub(crate) fn ring(self) -> Option<usize> {
        match self {
            Self::Ring(idx) => Some(idx),
            _ => None,
        }
    }

    pub(crate) fn is_ring(self) -> bool {
        matches!(self, Self::Ring(_))
    }
}

/// One directed segment of an input contour.
///
/// `bot` always has the larger Y. `curr` tracks the edge's position on the
/// current scanline while the edge is active.
#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub bot: Point2,
    pub curr: Point2,
    pub top: Point2,
    pub delta: Vector2,
    pub dx: f64,
    pub poly_type: PolyType,
    pub side: Side,
    pub wind_delta: i32,
    pub wind_cnt: i32,
    pub wind_cnt2: i32,
    pub out_idx: OutIdx,
    pub next: EdgeId,
    pub prev: EdgeId,
    pub next_in_lml: Option<EdgeId>,
    pub next_in_ael: Option<EdgeId>,
    pub prev_in_ael: Option<EdgeId>,
    pub next_in_sel: Option<EdgeId>,
    pub prev_in_sel: Option<EdgeId>,
}

impl Edge {
    fn at(pt: Point2) -> Self {
        Self {
            bot: pt,
            curr: pt,
            top: pt,
            delta: Vector2::zeros(),
            dx: 0.0,
            poly_type: PolyType::Subject,
            side: Side::Left,
            wind_delta: 0,
            wind_cnt: 0,
            wind_cnt2: 0,
            out_idx: OutIdx::Unassigned,
            next: EdgeId::default(),
            prev: EdgeId::default(),
            next_in_lml: None,
            next_in_ael: None,
            prev_in_ael: None,
            next_in_sel: None,
            prev_in_sel: None,
        }
    }

    /// Orders the edge endpoints by Y and computes the inverse slope.
    fn init_bounds(&mut self, next_pt: Point2, poly_type: PolyType) {
        if self.curr.y >= next_pt.y {
            self.bot = self.curr;
            self.top = next_pt;
        } else {
            self.top = self.curr;
            self.bot = next_pt;
        }
        self.set_dx();
        self.poly_type = poly_type;
    }

    fn set_dx(&mut self) {
        self.delta = self.top - self.bot;
        self.dx = if self.delta.y == 0.0 {
            HORIZONTAL
        } else {
            self.delta.x / self.delta.y
        };
    }

    #[allow(clippy::float_cmp)]
    pub fn is_horizontal(&self) -> bool {
        self.delta.y == 0.0
    }

    /// X coordinate of the edge at scanline `y`.
    #[allow(clippy::float_cmp)]
    pub fn top_x(&self, y: f64) -> f64 {
        if y == self.top.y {
            self.top.x
        } else {
            self.bot.x + self.dx * (y - self.bot.y)
        }
    }

    /// Swaps the X ends of a horizontal so `bot` attaches to its neighbour.
    pub fn reverse_horizontal(&mut self) {
        std::mem::swap(&mut self.top.x, &mut self.bot.x);
    }
}

/// True when two edges are parallel.
pub(crate) fn edge_slopes_equal(e1: &Edge, e2: &Edge) -> bool {
    products_equal(e1.delta.y * e2.delta.x, e1.delta.x * e2.delta.y)
}

impl Clipper {
    /// Builds the edge ring for one input path.
    ///
    /// Returns the first retained edge and whether every vertex shares one Y,
    /// or `None` when the path degenerates.
    #[allow(clippy::float_cmp)]
    pub(super) fn build_edge_ring(
        &mut self,
        path: &[Point2],
        poly_type: PolyType,
        closed: bool,
    ) -> Option<(EdgeId, bool)> {
        if path.is_empty() {
            return None;
        }
        let mut high = path.len() - 1;
        if closed {
            while high > 0 && path[high] == path[0] {
                high -= 1;
            }
        }
        while high > 0 && path[high] == path[high - 1] {
            high -= 1;
        }
        if (closed && high < 2) || (!closed && high < 1) {
            return None;
        }

        let ids: Vec<EdgeId> = path[..=high]
            .iter()
            .map(|&pt| self.edges.insert(Edge::at(pt)))
            .collect();
        let n = ids.len();
        for (i, &id) in ids.iter().enumerate() {
            let edge = &mut self.edges[id];
            edge.next = ids[(i + 1) % n];
            edge.prev = ids[(i + n - 1) % n];
        }

        // Remove duplicate vertices and, for closed paths, collinear ones.
        let mut e_start = ids[0];
        let mut e = e_start;
        let mut loop_stop = e_start;
        loop {
            let next = self.edges[e].next;
            if self.edges[e].curr == self.edges[next].curr && (closed || next != e_start) {
                if e == next {
                    break;
                }
                if e == e_start {
                    e_start = next;
                }
                e = self.remove_edge(e);
                loop_stop = e;
                continue;
            }
            let prev = self.edges[e].prev;
            if prev == next {
                break;
            }
            let (pp, cp, np) = (
                self.edges[prev].curr,
                self.edges[e].curr,
                self.edges[next].curr,
            );
            if closed
                && slopes_equal3(&pp, &cp, &np)
                && (!self.options.preserve_collinear || !pt2_is_between(&pp, &cp, &np))
            {
                if e == e_start {
                    e_start = next;
                }
                e = self.remove_edge(e);
                e = self.edges[e].prev;
                loop_stop = e;
                continue;
            }
            e = next;
            if e == loop_stop || (!closed && self.edges[e].next == e_start) {
                break;
            }
        }

        let (next, prev) = (self.edges[e].next, self.edges[e].prev);
        if (!closed && e == next) || (closed && prev == next) {
            for id in ids {
                self.edges.remove(id);
            }
            return None;
        }

        if !closed {
            let last = self.edges[e_start].prev;
            self.edges[last].out_idx = OutIdx::Skip;
        }

        let start_y = self.edges[e_start].curr.y;
        let mut is_flat = true;
        let mut e = e_start;
        loop {
            let next = self.edges[e].next;
            let next_pt = self.edges[next].curr;
            self.edges[e].init_bounds(next_pt, poly_type);
            e = next;
            if is_flat && self.edges[e].curr.y != start_y {
                is_flat = false;
            }
            if e == e_start {
                break;
            }
        }
        Some((e_start, is_flat))
    }

    /// Unlinks `e` from its ring and returns its successor.
    fn remove_edge(&mut self, e: EdgeId) -> EdgeId {
        let (prev, next) = (self.edges[e].prev, self.edges[e].next);
        self.edges[prev].next = next;
        self.edges[next].prev = prev;
        self.edges.remove(e);
        next
    }

    /// Discards every edge belonging to the ring that contains `start`.
    pub(super) fn dispose_edge_ring(&mut self, start: EdgeId) {
        let mut e = start;
        loop {
            let next = self.edges[e].next;
            self.edges.remove(e);
            if next == start || !self.edges.contains_key(next) {
                break;
            }
            e = next;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn edge_bounds_order_by_y() {
        let mut e = Edge::at(Point2::new(0.0, 0.0));
        e.init_bounds(Point2::new(4.0, 8.0), PolyType::Subject);
        assert_eq!(e.bot, Point2::new(4.0, 8.0));
        assert_eq!(e.top, Point2::new(0.0, 0.0));
        assert_relative_eq!(e.dx, 0.5);
        assert!(!e.is_horizontal());
    }

    #[test]
    fn horizontal_edge_uses_sentinel() {
        let mut e = Edge::at(Point2::new(0.0, 3.0));
        e.init_bounds(Point2::new(5.0, 3.0), PolyType::Clip);
        assert!(e.is_horizontal());
        assert_relative_eq!(e.dx, HORIZONTAL);
        assert_eq!(e.poly_type, PolyType::Clip);
        e.reverse_horizontal();
        assert_relative_eq!(e.bot.x, 5.0);
        assert_relative_eq!(e.top.x, 0.0);
    }

    #[test]
    fn top_x_interpolates() {
        let mut e = Edge::at(Point2::new(0.0, 10.0));
        e.init_bounds(Point2::new(10.0, 0.0), PolyType::Subject);
        assert_relative_eq!(e.top_x(5.0), 5.0);
        assert_relative_eq!(e.top_x(0.0), 10.0);
    }

    #[test]
    fn ring_drops_duplicates_and_collinear_points() {
        let mut clipper = Clipper::new();
        let path = [
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
        ];
        let (start, flat) = clipper
            .build_edge_ring(&path, PolyType::Subject, true)
            .unwrap();
        assert!(!flat);
        let mut count = 0;
        let mut e = start;
        loop {
            count += 1;
            e = clipper.edges[e].next;
            if e == start {
                break;
            }
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn ring_rejects_two_distinct_vertices() {
        let mut clipper = Clipper::new();
        let path = [
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 5.0),
            Point2::new(10.0, 10.0),
        ];
        assert!(clipper
            .build_edge_ring(&path, PolyType::Subject, true)
            .is_none());
        assert!(clipper.edges.is_empty());
    }
}
