use crate::math::polygon_2d::slopes_equal3;
use crate::math::Point2;

use super::engine::Clipper;
use super::output::{OutPt, OutPtId};

/// Two output vertices whose rings share an edge ending at `off_pt`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Join {
    pub out_pt1: OutPtId,
    pub out_pt2: OutPtId,
    pub off_pt: Point2,
}

/// A horizontal output edge that may still meet a horizontal bound
/// starting in the next scanbeam.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GhostJoin {
    pub out_pt: OutPtId,
    pub off_pt: Point2,
}

/// Overlap of the X ranges `a1..a2` and `b1..b2`, if it has length.
fn get_overlap(a1: f64, a2: f64, b1: f64, b2: f64) -> Option<(f64, f64)> {
    let (a_lo, a_hi) = if a1 < a2 { (a1, a2) } else { (a2, a1) };
    let (b_lo, b_hi) = if b1 < b2 { (b1, b2) } else { (b2, b1) };
    let left = a_lo.max(b_lo);
    let right = a_hi.min(b_hi);
    (left < right).then_some((left, right))
}

impl Clipper {
    pub(super) fn add_join(&mut self, out_pt1: OutPtId, out_pt2: OutPtId, off_pt: Point2) {
        self.joins.push(Join {
            out_pt1,
            out_pt2,
            off_pt,
        });
    }

    pub(super) fn add_ghost_join(&mut self, out_pt: OutPtId, off_pt: Point2) {
        self.ghost_joins.push(GhostJoin { out_pt, off_pt });
    }

    /// Inserts a copy of `op` next to it and returns the copy.
    fn dup_out_pt(&mut self, op: OutPtId, insert_after: bool) -> OutPtId {
        let src = self.out_pts[op].clone();
        let (prev, next) = if insert_after {
            (op, src.next)
        } else {
            (src.prev, op)
        };
        let dup = self.out_pts.insert(OutPt {
            idx: src.idx,
            pt: src.pt,
            next,
            prev,
        });
        self.out_pts[prev].next = dup;
        self.out_pts[next].prev = dup;
        dup
    }

    /// Walks from `op` while the visited points equal `op`'s point.
    fn skip_same_pt(&self, op: OutPtId, forward: bool) -> OutPtId {
        let pt = self.out_pts[op].pt;
        let step = |p: OutPtId| {
            if forward {
                self.out_pts[p].next
            } else {
                self.out_pts[p].prev
            }
        };
        let mut p = step(op);
        while p != op && self.out_pts[p].pt == pt {
            p = step(p);
        }
        p
    }

    /// Links `op1` to `op2` and their duplicates to each other, either
    /// splitting one ring in two or fusing two rings.
    fn splice_at(&mut self, op1: OutPtId, op2: OutPtId, reverse: bool) -> OutPtId {
        if reverse {
            let op1b = self.dup_out_pt(op1, false);
            let op2b = self.dup_out_pt(op2, true);
            self.out_pts[op1].prev = op2;
            self.out_pts[op2].next = op1;
            self.out_pts[op1b].next = op2b;
            self.out_pts[op2b].prev = op1b;
            op1b
        } else {
            let op1b = self.dup_out_pt(op1, true);
            let op2b = self.dup_out_pt(op2, false);
            self.out_pts[op1].next = op2;
            self.out_pts[op2].prev = op1;
            self.out_pts[op1b].prev = op2b;
            self.out_pts[op2b].next = op1b;
            op1b
        }
    }

    /// Resolves one join, rewiring the rings so the shared edge disappears.
    ///
    /// On success `join.out_pt1` and `join.out_pt2` lie on the two resulting
    /// rings (or on the single fused ring).
    #[allow(clippy::float_cmp, clippy::too_many_lines)]
    fn join_points(&mut self, join: &mut Join, rec1: usize, rec2: usize) -> bool {
        let (mut op1, mut op2) = (join.out_pt1, join.out_pt2);
        let off = join.off_pt;
        let is_horizontal = self.out_pts[op1].pt.y == off.y;

        if is_horizontal && off == self.out_pts[op1].pt && off == self.out_pts[op2].pt {
            // Two rings touching at a single vertex.
            if rec1 != rec2 {
                return false;
            }
            let op1b = self.skip_same_pt(op1, true);
            let reverse1 = self.out_pts[op1b].pt.y > off.y;
            let op2b = self.skip_same_pt(op2, true);
            let reverse2 = self.out_pts[op2b].pt.y > off.y;
            if reverse1 == reverse2 {
                return false;
            }
            join.out_pt2 = self.splice_at(op1, op2, reverse1);
            return true;
        }

        if is_horizontal {
            // The shared part of two horizontal runs is not known yet.
            let mut op1b = op1;
            while self.out_pts[self.out_pts[op1].prev].pt.y == self.out_pts[op1].pt.y
                && self.out_pts[op1].prev != op1b
                && self.out_pts[op1].prev != op2
            {
                op1 = self.out_pts[op1].prev;
            }
            while self.out_pts[self.out_pts[op1b].next].pt.y == self.out_pts[op1b].pt.y
                && self.out_pts[op1b].next != op1
                && self.out_pts[op1b].next != op2
            {
                op1b = self.out_pts[op1b].next;
            }
            if self.out_pts[op1b].next == op1 || self.out_pts[op1b].next == op2 {
                return false;
            }
            let mut op2b = op2;
            while self.out_pts[self.out_pts[op2].prev].pt.y == self.out_pts[op2].pt.y
                && self.out_pts[op2].prev != op2b
                && self.out_pts[op2].prev != op1b
            {
                op2 = self.out_pts[op2].prev;
            }
            while self.out_pts[self.out_pts[op2b].next].pt.y == self.out_pts[op2b].pt.y
                && self.out_pts[op2b].next != op2
                && self.out_pts[op2b].next != op1
            {
                op2b = self.out_pts[op2b].next;
            }
            if self.out_pts[op2b].next == op2 || self.out_pts[op2b].next == op1 {
                return false;
            }

            let (x1, x1b, x2, x2b) = (
                self.out_pts[op1].pt.x,
                self.out_pts[op1b].pt.x,
                self.out_pts[op2].pt.x,
                self.out_pts[op2b].pt.x,
            );
            let Some((left, right)) = get_overlap(x1, x1b, x2, x2b) else {
                return false;
            };

            // Keep op1 and op2 off the discarded side; other joins may still
            // refer to them.
            let in_range = |x: f64| x >= left && x <= right;
            let (pt, discard_left) = if in_range(x1) {
                (self.out_pts[op1].pt, x1 > x1b)
            } else if in_range(x2) {
                (self.out_pts[op2].pt, x2 > x2b)
            } else if in_range(x1b) {
                (self.out_pts[op1b].pt, x1b > x1)
            } else {
                (self.out_pts[op2b].pt, x2b > x2)
            };
            join.out_pt1 = op1;
            join.out_pt2 = op2;
            return self.join_horz(op1, op1b, op2, op2b, pt, discard_left);
        }

        // General case: both vertices sit at the bottom of collinear edges
        // running up to `off`.
        let mut op1b = self.skip_same_pt(op1, true);
        let op1_pt = self.out_pts[op1].pt;
        let reverse1 = self.out_pts[op1b].pt.y > op1_pt.y
            || !slopes_equal3(&op1_pt, &self.out_pts[op1b].pt, &off);
        if reverse1 {
            op1b = self.skip_same_pt(op1, false);
            if self.out_pts[op1b].pt.y > op1_pt.y
                || !slopes_equal3(&op1_pt, &self.out_pts[op1b].pt, &off)
            {
                return false;
            }
        }
        let mut op2b = self.skip_same_pt(op2, true);
        let op2_pt = self.out_pts[op2].pt;
        let reverse2 = self.out_pts[op2b].pt.y > op2_pt.y
            || !slopes_equal3(&op2_pt, &self.out_pts[op2b].pt, &off);
        if reverse2 {
            op2b = self.skip_same_pt(op2, false);
            if self.out_pts[op2b].pt.y > op2_pt.y
                || !slopes_equal3(&op2_pt, &self.out_pts[op2b].pt, &off)
            {
                return false;
            }
        }

        if op1b == op1 || op2b == op2 || op1b == op2b || (rec1 == rec2 && reverse1 == reverse2) {
            return false;
        }
        join.out_pt1 = op1;
        join.out_pt2 = self.splice_at(op1, op2, reverse1);
        true
    }

    /// Moves `op` along its horizontal run toward `pt` and leaves a
    /// duplicate of `pt` beside it. Returns the vertex and its duplicate.
    #[allow(clippy::float_cmp)]
    fn prepare_horz_end(
        &mut self,
        mut op: OutPtId,
        op_b: OutPtId,
        pt: Point2,
        discard_left: bool,
    ) -> (OutPtId, OutPtId) {
        let left_to_right = self.out_pts[op].pt.x <= self.out_pts[op_b].pt.x;
        loop {
            let next = self.out_pts[op].next;
            let (npt, x) = (self.out_pts[next].pt, self.out_pts[op].pt.x);
            let (nx, ny) = (npt.x, npt.y);
            let advancing = if left_to_right {
                nx <= pt.x && nx >= x
            } else {
                nx >= pt.x && nx <= x
            };
            if !advancing || ny != pt.y {
                break;
            }
            op = next;
        }
        let insert_after = if left_to_right { !discard_left } else { discard_left };
        let step_past = if left_to_right { discard_left } else { !discard_left };
        if step_past && self.out_pts[op].pt.x != pt.x {
            op = self.out_pts[op].next;
        }
        let mut dup = self.dup_out_pt(op, insert_after);
        if self.out_pts[dup].pt != pt {
            op = dup;
            self.out_pts[op].pt = pt;
            dup = self.dup_out_pt(op, insert_after);
        }
        (op, dup)
    }

    /// Joins two overlapping horizontal runs travelling in opposite
    /// directions at `pt`.
    fn join_horz(
        &mut self,
        op1: OutPtId,
        op1b: OutPtId,
        op2: OutPtId,
        op2b: OutPtId,
        pt: Point2,
        discard_left: bool,
    ) -> bool {
        let dir1_ltr = self.out_pts[op1].pt.x <= self.out_pts[op1b].pt.x;
        let dir2_ltr = self.out_pts[op2].pt.x <= self.out_pts[op2b].pt.x;
        if dir1_ltr == dir2_ltr {
            return false;
        }
        let (op1, op1b) = self.prepare_horz_end(op1, op1b, pt, discard_left);
        let (op2, op2b) = self.prepare_horz_end(op2, op2b, pt, discard_left);
        if dir1_ltr == discard_left {
            self.out_pts[op1].prev = op2;
            self.out_pts[op2].next = op1;
            self.out_pts[op1b].next = op2b;
            self.out_pts[op2b].prev = op1b;
        } else {
            self.out_pts[op1].next = op2;
            self.out_pts[op2].prev = op1;
            self.out_pts[op1b].prev = op2b;
            self.out_pts[op2b].next = op1b;
        }
        true
    }

    fn update_out_pt_idxs(&mut self, rec: usize) {
        let Some(start) = self.out_recs[rec].pts else {
            return;
        };
        let mut op = start;
        loop {
            self.out_pts[op].idx = rec;
            op = self.out_pts[op].prev;
            if op == start {
                break;
            }
        }
    }

    /// Nearest ring to the left that still owns points.
    pub(super) fn parse_first_left(&self, mut first_left: Option<usize>) -> Option<usize> {
        while let Some(fl) = first_left {
            if self.out_recs[fl].pts.is_some() {
                break;
            }
            first_left = self.out_recs[fl].first_left;
        }
        first_left
    }

    /// After a split into separate rings, reparents rings that now lie
    /// inside `new_rec`.
    fn fixup_first_lefts1(&mut self, old_rec: usize, new_rec: usize) {
        let Some(new_pts) = self.out_recs[new_rec].pts else {
            return;
        };
        for i in 0..self.out_recs.len() {
            let Some(pts) = self.out_recs[i].pts else {
                continue;
            };
            let first_left = self.parse_first_left(self.out_recs[i].first_left);
            if first_left == Some(old_rec) && self.ring_contains_ring(pts, new_pts) {
                self.out_recs[i].first_left = Some(new_rec);
            }
        }
    }

    /// After a split where `inner` ended up inside `outer`, reparents the
    /// rings that used to share their container.
    fn fixup_first_lefts2(&mut self, inner: usize, outer: usize) {
        let inner_pts = self.out_recs[inner].pts;
        let outer_pts = self.out_recs[outer].pts;
        let (Some(inner_pts), Some(outer_pts)) = (inner_pts, outer_pts) else {
            return;
        };
        let orfl = self.out_recs[outer].first_left;
        for i in 0..self.out_recs.len() {
            let Some(pts) = self.out_recs[i].pts else {
                continue;
            };
            if i == outer || i == inner {
                continue;
            }
            let first_left = self.parse_first_left(self.out_recs[i].first_left);
            if first_left != orfl && first_left != Some(inner) && first_left != Some(outer) {
                continue;
            }
            if self.ring_contains_ring(pts, inner_pts) {
                self.out_recs[i].first_left = Some(inner);
            } else if self.ring_contains_ring(pts, outer_pts) {
                self.out_recs[i].first_left = Some(outer);
            } else if matches!(self.out_recs[i].first_left, Some(fl) if fl == inner || fl == outer)
            {
                self.out_recs[i].first_left = orfl;
            }
        }
    }

    /// After a merge, points everything that referred to `old_rec` at
    /// `new_rec`.
    fn fixup_first_lefts3(&mut self, old_rec: usize, new_rec: usize) {
        for i in 0..self.out_recs.len() {
            if self.out_recs[i].pts.is_none() {
                continue;
            }
            if self.parse_first_left(self.out_recs[i].first_left) == Some(old_rec) {
                self.out_recs[i].first_left = Some(new_rec);
            }
        }
    }

    /// Assigns hole state and parents after `rec` was split and `rec2`
    /// created from the detached part.
    fn classify_split(&mut self, rec: usize, rec2: usize, orient: bool) {
        let (Some(pts1), Some(pts2)) = (self.out_recs[rec].pts, self.out_recs[rec2].pts) else {
            return;
        };
        if self.ring_contains_ring(pts2, pts1) {
            self.out_recs[rec2].is_hole = !self.out_recs[rec].is_hole;
            self.out_recs[rec2].first_left = Some(rec);
            self.fixup_first_lefts2(rec2, rec);
            if orient {
                self.orient_ring(rec2);
            }
        } else if self.ring_contains_ring(pts1, pts2) {
            self.out_recs[rec2].is_hole = self.out_recs[rec].is_hole;
            self.out_recs[rec].is_hole = !self.out_recs[rec2].is_hole;
            self.out_recs[rec2].first_left = self.out_recs[rec].first_left;
            self.out_recs[rec].first_left = Some(rec2);
            self.fixup_first_lefts2(rec, rec2);
            if orient {
                self.orient_ring(rec);
            }
        } else {
            self.out_recs[rec2].is_hole = self.out_recs[rec].is_hole;
            self.out_recs[rec2].first_left = self.out_recs[rec].first_left;
            self.fixup_first_lefts1(rec, rec2);
        }
    }

    fn orient_ring(&mut self, rec: usize) {
        let Some(pts) = self.out_recs[rec].pts else {
            return;
        };
        let positive = self.ring_area(pts) > 0.0;
        if (self.out_recs[rec].is_hole ^ self.options.reverse_solution) == positive {
            self.reverse_ring_links(pts);
        }
    }

    /// Resolves every recorded join, merging or splitting rings.
    pub(super) fn join_common_edges(&mut self) {
        let mut joins = std::mem::take(&mut self.joins);
        for join in &mut joins {
            let idx1 = self.out_pts[join.out_pt1].idx;
            let idx2 = self.out_pts[join.out_pt2].idx;
            let rec1 = self.find_out_rec(idx1);
            let mut rec2 = self.find_out_rec(idx2);
            if self.out_recs[rec1].pts.is_none() || self.out_recs[rec2].pts.is_none() {
                continue;
            }
            if self.out_recs[rec1].is_open || self.out_recs[rec2].is_open {
                continue;
            }

            let hole_state_rec = if rec1 == rec2 {
                rec1
            } else if self.out_rec1_right_of_out_rec2(rec1, rec2) {
                rec2
            } else if self.out_rec1_right_of_out_rec2(rec2, rec1) {
                rec1
            } else {
                self.lowermost_rec(rec1, rec2)
            };

            if !self.join_points(join, rec1, rec2) {
                continue;
            }

            if rec1 == rec2 {
                // One ring was split into two.
                self.out_recs[rec1].pts = Some(join.out_pt1);
                self.out_recs[rec1].bottom_pt = None;
                rec2 = self.create_out_rec();
                self.out_recs[rec2].pts = Some(join.out_pt2);
                self.update_out_pt_idxs(rec2);
                self.classify_split(rec1, rec2, true);
            } else {
                // Two rings were fused.
                let rec2_entry = &mut self.out_recs[rec2];
                rec2_entry.pts = None;
                rec2_entry.bottom_pt = None;
                rec2_entry.idx = rec1;
                self.out_recs[rec1].is_hole = self.out_recs[hole_state_rec].is_hole;
                if hole_state_rec == rec2 {
                    self.out_recs[rec1].first_left = self.out_recs[rec2].first_left;
                }
                self.out_recs[rec2].first_left = Some(rec1);
                self.fixup_first_lefts3(rec2, rec1);
            }
        }
    }

    /// Splits rings at repeated vertices so every ring is simple.
    pub(super) fn do_simple_polygons(&mut self) {
        let mut i = 0;
        while i < self.out_recs.len() {
            let rec = i;
            i += 1;
            if self.out_recs[rec].is_open {
                continue;
            }
            let Some(mut op) = self.out_recs[rec].pts else {
                continue;
            };
            loop {
                let mut op2 = self.out_pts[op].next;
                while Some(op2) != self.out_recs[rec].pts {
                    if self.out_pts[op].pt == self.out_pts[op2].pt
                        && self.out_pts[op2].next != op
                        && self.out_pts[op2].prev != op
                    {
                        self.split_ring_at(rec, op, op2);
                        op2 = op;
                    }
                    op2 = self.out_pts[op2].next;
                }
                op = self.out_pts[op].next;
                if Some(op) == self.out_recs[rec].pts {
                    break;
                }
            }
        }
    }

    /// Cuts ring `rec` at the coincident vertices `op` and `op2`; the part
    /// starting at `op2` becomes a new ring.
    fn split_ring_at(&mut self, rec: usize, op: OutPtId, op2: OutPtId) {
        let op3 = self.out_pts[op].prev;
        let op4 = self.out_pts[op2].prev;
        self.out_pts[op].prev = op4;
        self.out_pts[op4].next = op;
        self.out_pts[op2].prev = op3;
        self.out_pts[op3].next = op2;

        self.out_recs[rec].pts = Some(op);
        let rec2 = self.create_out_rec();
        self.out_recs[rec2].pts = Some(op2);
        self.update_out_pt_idxs(rec2);
        self.classify_split(rec, rec2, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_of_horizontal_ranges() {
        assert_eq!(get_overlap(0.0, 10.0, 4.0, 12.0), Some((4.0, 10.0)));
        assert_eq!(get_overlap(10.0, 0.0, 12.0, 4.0), Some((4.0, 10.0)));
        assert_eq!(get_overlap(0.0, 4.0, 4.0, 8.0), None);
    }

    #[test]
    fn ghost_and_real_joins_are_recorded_separately() {
        let mut clipper = Clipper::new();
        let op = clipper.out_pts.insert(OutPt {
            idx: 0,
            pt: Point2::new(1.0, 1.0),
            next: OutPtId::default(),
            prev: OutPtId::default(),
        });
        clipper.add_ghost_join(op, Point2::new(3.0, 1.0));
        clipper.add_join(op, op, Point2::new(3.0, 1.0));
        assert_eq!(clipper.ghost_joins.len(), 1);
        assert_eq!(clipper.joins.len(), 1);
    }
}
