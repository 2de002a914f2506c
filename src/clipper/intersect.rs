use crate::error::{AlgorithmError, Result};
use crate::math::Point2;

use super::edge::{Edge, EdgeId, OutIdx, PolyType};
use super::engine::Clipper;

/// A crossing between two AEL edges inside the current scanbeam.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntersectNode {
    pub edge1: EdgeId,
    pub edge2: EdgeId,
    pub pt: Point2,
}

/// Crossing point of two non-parallel edges, clamped to the scanbeam.
///
/// The result never lies above either edge's top nor below `e1.curr.y`,
/// which is still the scanbeam bottom when this is called.
#[allow(clippy::float_cmp)]
pub(crate) fn intersect_point(e1: &Edge, e2: &Edge) -> Point2 {
    let mut ip = Point2::new(0.0, 0.0);
    if e1.dx == e2.dx {
        ip.y = e1.curr.y;
        ip.x = e1.top_x(ip.y);
        return ip;
    }
    if e1.delta.x == 0.0 {
        ip.x = e1.bot.x;
        ip.y = if e2.is_horizontal() {
            e2.bot.y
        } else {
            let b2 = e2.bot.y - e2.bot.x / e2.dx;
            ip.x / e2.dx + b2
        };
    } else if e2.delta.x == 0.0 {
        ip.x = e2.bot.x;
        ip.y = if e1.is_horizontal() {
            e1.bot.y
        } else {
            let b1 = e1.bot.y - e1.bot.x / e1.dx;
            ip.x / e1.dx + b1
        };
    } else {
        let b1 = e1.bot.x - e1.bot.y * e1.dx;
        let b2 = e2.bot.x - e2.bot.y * e2.dx;
        let q = (b2 - b1) / (e1.dx - e2.dx);
        ip.y = q;
        ip.x = if e1.dx.abs() < e2.dx.abs() {
            e1.dx * q + b1
        } else {
            e2.dx * q + b2
        };
    }

    if ip.y < e1.top.y || ip.y < e2.top.y {
        ip.y = e1.top.y.max(e2.top.y);
        ip.x = if e1.dx.abs() < e2.dx.abs() {
            e1.top_x(ip.y)
        } else {
            e2.top_x(ip.y)
        };
    }
    if ip.y > e1.curr.y {
        ip.y = e1.curr.y;
        // Derive X from the more vertical edge.
        ip.x = if e1.dx.abs() > e2.dx.abs() {
            e2.top_x(ip.y)
        } else {
            e1.top_x(ip.y)
        };
    }
    ip
}

impl Clipper {
    /// Computes `wind_cnt` and `wind_cnt2` for an edge just inserted into the
    /// AEL. Both operands are filled with the even-odd rule: `wind_cnt` is the
    /// edge's own direction and `wind_cnt2` is the parity of opposite-type
    /// closed edges to its left.
    pub(super) fn set_winding_count(&mut self, edge: EdgeId) {
        let poly_type = self.edges[edge].poly_type;
        let wind_delta = self.edges[edge].wind_delta;

        let mut e = self.edges[edge].prev_in_ael;
        while let Some(p) = e {
            if self.edges[p].poly_type == poly_type && self.edges[p].wind_delta != 0 {
                break;
            }
            e = self.edges[p].prev_in_ael;
        }

        // Open paths always start in their "on" state.
        let wind_cnt = if wind_delta == 0 { 1 } else { wind_delta };
        let (mut wc2, mut cursor) = match e {
            None => (0, self.active_edges),
            Some(p) => (self.edges[p].wind_cnt2, self.edges[p].next_in_ael),
        };
        while let Some(c) = cursor {
            if c == edge {
                break;
            }
            if self.edges[c].wind_delta != 0 {
                wc2 = i32::from(wc2 == 0);
            }
            cursor = self.edges[c].next_in_ael;
        }
        self.edges[edge].wind_cnt = wind_cnt;
        self.edges[edge].wind_cnt2 = wc2;
    }

    /// The fixed contribution rule: subject edges bound the output outside
    /// the clip region, clip edges bound it inside.
    pub(super) fn is_contributing(&self, edge: EdgeId) -> bool {
        let e = &self.edges[edge];
        if e.wind_delta == 0 && e.wind_cnt != 1 {
            return false;
        }
        match e.poly_type {
            PolyType::Subject => e.wind_cnt2 == 0,
            PolyType::Clip => e.wind_cnt2 != 0,
        }
    }

    fn swap_sides(&mut self, e1: EdgeId, e2: EdgeId) {
        let side = self.edges[e1].side;
        self.edges[e1].side = self.edges[e2].side;
        self.edges[e2].side = side;
    }

    fn swap_poly_indexes(&mut self, e1: EdgeId, e2: EdgeId) {
        let idx = self.edges[e1].out_idx;
        self.edges[e1].out_idx = self.edges[e2].out_idx;
        self.edges[e2].out_idx = idx;
    }

    /// Applies a crossing of `e1` and `e2` at `pt`: updates winding counts and
    /// emits output according to the contribution rule.
    ///
    /// `e1` must be the edge to the right of `e2` above the crossing.
    pub(super) fn intersect_edges(&mut self, e1: EdgeId, e2: EdgeId, pt: Point2) {
        let e1_contributing = self.edges[e1].out_idx.is_ring();
        let e2_contributing = self.edges[e2].out_idx.is_ring();

        if self.edges[e1].wind_delta == 0 || self.edges[e2].wind_delta == 0 {
            self.intersect_open_edges(e1, e2, pt, e1_contributing, e2_contributing);
            return;
        }

        if self.edges[e1].poly_type == self.edges[e2].poly_type {
            let wc = self.edges[e1].wind_cnt;
            self.edges[e1].wind_cnt = self.edges[e2].wind_cnt;
            self.edges[e2].wind_cnt = wc;
        } else {
            for e in [e1, e2] {
                let edge = &mut self.edges[e];
                edge.wind_cnt2 = i32::from(edge.wind_cnt2 == 0);
            }
        }

        let e1_wc = self.edges[e1].wind_cnt.abs();
        let e2_wc = self.edges[e2].wind_cnt.abs();
        let same_type = self.edges[e1].poly_type == self.edges[e2].poly_type;

        if e1_contributing && e2_contributing {
            if (e1_wc != 0 && e1_wc != 1) || (e2_wc != 0 && e2_wc != 1) || !same_type {
                self.add_local_max_poly(e1, e2, pt);
            } else {
                self.add_out_pt(e1, pt);
                self.add_out_pt(e2, pt);
                self.swap_sides(e1, e2);
                self.swap_poly_indexes(e1, e2);
            }
        } else if e1_contributing {
            if e2_wc == 0 || e2_wc == 1 {
                self.add_out_pt(e1, pt);
                self.swap_sides(e1, e2);
                self.swap_poly_indexes(e1, e2);
            }
        } else if e2_contributing {
            if e1_wc == 0 || e1_wc == 1 {
                self.add_out_pt(e2, pt);
                self.swap_sides(e1, e2);
                self.swap_poly_indexes(e1, e2);
            }
        } else if (e1_wc == 0 || e1_wc == 1) && (e2_wc == 0 || e2_wc == 1) {
            // Neither edge is contributing yet.
            let e1_wc2 = self.edges[e1].wind_cnt2.abs();
            let e2_wc2 = self.edges[e2].wind_cnt2.abs();
            if !same_type {
                self.add_local_min_poly(e1, e2, pt);
            } else if e1_wc == 1 && e2_wc == 1 {
                let starts_ring = match self.edges[e1].poly_type {
                    PolyType::Clip => e1_wc2 > 0 && e2_wc2 > 0,
                    PolyType::Subject => e1_wc2 <= 0 && e2_wc2 <= 0,
                };
                if starts_ring {
                    self.add_local_min_poly(e1, e2, pt);
                }
            } else {
                self.swap_sides(e1, e2);
            }
        }
    }

    /// Crossings involving an open path toggle the open edge's output where
    /// it enters or leaves a clip region.
    fn intersect_open_edges(
        &mut self,
        e1: EdgeId,
        e2: EdgeId,
        pt: Point2,
        e1_contributing: bool,
        e2_contributing: bool,
    ) {
        let (a, b) = (&self.edges[e1], &self.edges[e2]);
        if (a.wind_delta == 0 && b.wind_delta == 0) || a.poly_type == b.poly_type {
            return;
        }
        if a.wind_delta == 0 && b.wind_cnt.abs() == 1 {
            self.add_out_pt(e1, pt);
            if e1_contributing {
                self.edges[e1].out_idx = OutIdx::Unassigned;
            }
        } else if b.wind_delta == 0 && a.wind_cnt.abs() == 1 {
            self.add_out_pt(e2, pt);
            if e2_contributing {
                self.edges[e2].out_idx = OutIdx::Unassigned;
            }
        }
    }

    /// Finds and applies every crossing between the scanbeam bottom and
    /// `top_y`.
    pub(super) fn process_intersections(&mut self, top_y: f64) -> Result<()> {
        if self.active_edges.is_none() {
            return Ok(());
        }
        self.build_intersect_list(top_y);
        let outcome = if self.intersections.len() > 1 {
            self.fixup_intersection_order()
        } else {
            Ok(())
        };
        if outcome.is_ok() {
            self.process_intersect_list();
        }
        self.sorted_edges = None;
        self.intersections.clear();
        outcome
    }

    fn build_intersect_list(&mut self, top_y: f64) {
        let Some(head) = self.active_edges else {
            return;
        };
        self.sorted_edges = Some(head);
        let mut cur = Some(head);
        while let Some(e) = cur {
            let edge = &mut self.edges[e];
            edge.prev_in_sel = edge.prev_in_ael;
            edge.next_in_sel = edge.next_in_ael;
            edge.curr.x = edge.top_x(top_y);
            cur = edge.next_in_ael;
        }

        // Bubble sort: each swap of neighbours is one crossing.
        loop {
            let mut modified = false;
            let Some(mut e) = self.sorted_edges else {
                break;
            };
            while let Some(next) = self.edges[e].next_in_sel {
                if self.edges[e].curr.x > self.edges[next].curr.x {
                    let mut pt = intersect_point(&self.edges[e], &self.edges[next]);
                    if pt.y < top_y {
                        pt = Point2::new(self.edges[e].top_x(top_y), top_y);
                    }
                    self.intersections.push(IntersectNode {
                        edge1: e,
                        edge2: next,
                        pt,
                    });
                    self.swap_positions_in_sel(e, next);
                    modified = true;
                } else {
                    e = next;
                }
            }
            match self.edges[e].prev_in_sel {
                Some(prev) => self.edges[prev].next_in_sel = None,
                None => break,
            }
            if !modified {
                break;
            }
        }
        self.sorted_edges = None;
    }

    fn edges_adjacent(&self, node: &IntersectNode) -> bool {
        self.edges[node.edge1].next_in_sel == Some(node.edge2)
            || self.edges[node.edge1].prev_in_sel == Some(node.edge2)
    }

    /// Reorders the (bottom-most first) crossings so each one is applied
    /// between edges that are adjacent at that moment.
    fn fixup_intersection_order(&mut self) -> Result<()> {
        self.copy_ael_to_sel();
        self.intersections.sort_by(|a, b| b.pt.y.total_cmp(&a.pt.y));
        let count = self.intersections.len();
        for i in 0..count {
            if !self.edges_adjacent(&self.intersections[i]) {
                let mut j = i + 1;
                while j < count && !self.edges_adjacent(&self.intersections[j]) {
                    j += 1;
                }
                if j == count {
                    return Err(AlgorithmError::IntersectionOrder.into());
                }
                self.intersections.swap(i, j);
            }
            let node = self.intersections[i];
            self.swap_positions_in_sel(node.edge1, node.edge2);
        }
        Ok(())
    }

    fn process_intersect_list(&mut self) {
        let nodes = std::mem::take(&mut self.intersections);
        for node in &nodes {
            self.intersect_edges(node.edge1, node.edge2, node.pt);
            self.swap_positions_in_ael(node.edge1, node.edge2);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn edge(bot: (f64, f64), top: (f64, f64)) -> Edge {
        let mut clipper = Clipper::new();
        let path = [
            Point2::new(bot.0, bot.1),
            Point2::new(top.0, top.1),
            Point2::new(bot.0 + 100.0, bot.1 + 50.0),
        ];
        let (start, _) = clipper
            .build_edge_ring(&path, PolyType::Subject, true)
            .unwrap();
        clipper.edges[start].clone()
    }

    #[test]
    fn crossing_of_two_diagonals() {
        let a = edge((0.0, 10.0), (10.0, 0.0));
        let b = edge((10.0, 10.0), (0.0, 0.0));
        let ip = intersect_point(&a, &b);
        assert_relative_eq!(ip.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(ip.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn crossing_with_vertical_edge() {
        let v = edge((4.0, 10.0), (4.0, 0.0));
        let d = edge((0.0, 10.0), (10.0, 0.0));
        let ip = intersect_point(&v, &d);
        assert_relative_eq!(ip.x, 4.0, epsilon = 1e-9);
        assert_relative_eq!(ip.y, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn crossing_is_clamped_to_tops() {
        // The lines meet above both tops; the point is pulled down.
        let a = edge((0.0, 10.0), (1.0, 8.0));
        let b = edge((4.0, 10.0), (3.0, 8.0));
        let ip = intersect_point(&a, &b);
        assert!(ip.y >= 8.0);
        assert!(ip.y <= 10.0);
    }
}
