use crate::math::polygon_2d::{
    inverse_slope, point_in_polygon, pt2_is_between, slopes_equal3, slopes_equal4, PointLocation,
};
use crate::math::Point2;

use super::edge::{EdgeId, OutIdx, Side};
use super::engine::Clipper;

slotmap::new_key_type! {
    /// Unique identifier for a vertex of an output ring.
    pub struct OutPtId;
}

/// One vertex of an output ring.
#[derive(Debug, Clone)]
pub(crate) struct OutPt {
    /// Ring the vertex was created for; may be stale after merges.
    pub idx: usize,
    pub pt: Point2,
    pub next: OutPtId,
    pub prev: OutPtId,
}

/// An output ring under construction.
///
/// `pts` is the left-most vertex and `pts.prev` the right-most while the
/// ring is being built. A merged ring keeps its slot with `pts == None` and
/// `idx` pointing at the ring that absorbed it.
#[derive(Debug, Clone)]
pub(crate) struct OutRec {
    pub idx: usize,
    pub is_hole: bool,
    pub is_open: bool,
    pub first_left: Option<usize>,
    pub pts: Option<OutPtId>,
    pub bottom_pt: Option<OutPtId>,
}

impl OutRec {
    fn new(idx: usize) -> Self {
        Self {
            idx,
            is_hole: false,
            is_open: false,
            first_left: None,
            pts: None,
            bottom_pt: None,
        }
    }
}

impl Clipper {
    pub(super) fn create_out_rec(&mut self) -> usize {
        let idx = self.out_recs.len();
        self.out_recs.push(OutRec::new(idx));
        idx
    }

    /// Resolves a possibly merged ring index to the ring that owns it now.
    pub(super) fn find_out_rec(&mut self, idx: usize) -> usize {
        let mut root = idx;
        while self.out_recs[root].idx != root {
            root = self.out_recs[root].idx;
        }
        let mut cur = idx;
        while self.out_recs[cur].idx != root {
            let next = self.out_recs[cur].idx;
            self.out_recs[cur].idx = root;
            cur = next;
        }
        root
    }

    /// Appends `pt` to the ring fed by `e`, starting a new ring when `e`
    /// has none. Left-side edges add at the front, right-side ones at the
    /// back.
    pub(super) fn add_out_pt(&mut self, e: EdgeId, pt: Point2) -> OutPtId {
        let Some(idx) = self.edges[e].out_idx.ring() else {
            let idx = self.create_out_rec();
            let is_open = self.edges[e].wind_delta == 0;
            let op = self.out_pts.insert_with_key(|key| OutPt {
                idx,
                pt,
                next: key,
                prev: key,
            });
            let rec = &mut self.out_recs[idx];
            rec.is_open = is_open;
            rec.pts = Some(op);
            if !is_open {
                self.set_hole_state(e, idx);
            }
            self.edges[e].out_idx = OutIdx::Ring(idx);
            return op;
        };

        let Some(first) = self.out_recs[idx].pts else {
            // Rings fed by active edges are never empty.
            let op = self.out_pts.insert_with_key(|key| OutPt {
                idx,
                pt,
                next: key,
                prev: key,
            });
            self.out_recs[idx].pts = Some(op);
            return op;
        };
        let to_front = self.edges[e].side == Side::Left;
        let last = self.out_pts[first].prev;
        if to_front && pt == self.out_pts[first].pt {
            return first;
        }
        if !to_front && pt == self.out_pts[last].pt {
            return last;
        }
        let op = self.out_pts.insert(OutPt {
            idx,
            pt,
            next: first,
            prev: last,
        });
        self.out_pts[last].next = op;
        self.out_pts[first].prev = op;
        if to_front {
            self.out_recs[idx].pts = Some(op);
        }
        op
    }

    /// The vertex most recently added by `e`.
    pub(super) fn last_out_pt(&self, e: EdgeId) -> Option<OutPtId> {
        let idx = self.edges[e].out_idx.ring()?;
        let first = self.out_recs[idx].pts?;
        Some(match self.edges[e].side {
            Side::Left => first,
            Side::Right => self.out_pts[first].prev,
        })
    }

    /// Starts a ring at a local minimum formed by `e1` and `e2`.
    #[allow(clippy::float_cmp)]
    pub(super) fn add_local_min_poly(&mut self, e1: EdgeId, e2: EdgeId, pt: Point2) -> OutPtId {
        let (result, e, prev_e) =
            if self.edges[e2].is_horizontal() || self.edges[e1].dx > self.edges[e2].dx {
                let result = self.add_out_pt(e1, pt);
                self.edges[e2].out_idx = self.edges[e1].out_idx;
                self.edges[e1].side = Side::Left;
                self.edges[e2].side = Side::Right;
                let prev_e = if self.edges[e1].prev_in_ael == Some(e2) {
                    self.edges[e2].prev_in_ael
                } else {
                    self.edges[e1].prev_in_ael
                };
                (result, e1, prev_e)
            } else {
                let result = self.add_out_pt(e2, pt);
                self.edges[e1].out_idx = self.edges[e2].out_idx;
                self.edges[e1].side = Side::Right;
                self.edges[e2].side = Side::Left;
                let prev_e = if self.edges[e2].prev_in_ael == Some(e1) {
                    self.edges[e1].prev_in_ael
                } else {
                    self.edges[e2].prev_in_ael
                };
                (result, e2, prev_e)
            };

        // A contributing neighbour collinear with the new bound shares an
        // edge with this ring.
        if let Some(prev_e) = prev_e {
            let (p, c) = (&self.edges[prev_e], &self.edges[e]);
            if p.out_idx.is_ring() && p.top.y < pt.y && c.top.y < pt.y {
                let x_prev = p.top_x(pt.y);
                let x_e = c.top_x(pt.y);
                if x_prev == x_e
                    && c.wind_delta != 0
                    && p.wind_delta != 0
                    && slopes_equal4(
                        &Point2::new(x_prev, pt.y),
                        &p.top,
                        &Point2::new(x_e, pt.y),
                        &c.top,
                    )
                {
                    let top = c.top;
                    let op = self.add_out_pt(prev_e, pt);
                    self.add_join(result, op, top);
                }
            }
        }
        result
    }

    /// Closes the ring(s) of two bounds meeting at a local maximum.
    pub(super) fn add_local_max_poly(&mut self, e1: EdgeId, e2: EdgeId, pt: Point2) {
        self.add_out_pt(e1, pt);
        if self.edges[e2].wind_delta == 0 {
            self.add_out_pt(e2, pt);
        }
        let (i1, i2) = (self.edges[e1].out_idx, self.edges[e2].out_idx);
        match (i1.ring(), i2.ring()) {
            (Some(a), Some(b)) if a == b => {
                self.edges[e1].out_idx = OutIdx::Unassigned;
                self.edges[e2].out_idx = OutIdx::Unassigned;
            }
            (Some(a), Some(b)) if a < b => self.append_polygon(e1, e2),
            (Some(_), Some(_)) => self.append_polygon(e2, e1),
            _ => {
                self.edges[e1].out_idx = OutIdx::Unassigned;
                self.edges[e2].out_idx = OutIdx::Unassigned;
            }
        }
    }

    /// Decides whether a new ring is a hole from the contributing edges to
    /// its left.
    fn set_hole_state(&mut self, e: EdgeId, rec: usize) {
        let mut left_ring: Option<EdgeId> = None;
        let mut cursor = self.edges[e].prev_in_ael;
        while let Some(e2) = cursor {
            let edge = &self.edges[e2];
            if edge.out_idx.is_ring() && edge.wind_delta != 0 {
                left_ring = match left_ring {
                    None => Some(e2),
                    Some(t) if self.edges[t].out_idx == edge.out_idx => None,
                    keep => keep,
                };
            }
            cursor = edge.prev_in_ael;
        }
        match left_ring.and_then(|t| self.edges[t].out_idx.ring()) {
            None => {
                self.out_recs[rec].first_left = None;
                self.out_recs[rec].is_hole = false;
            }
            Some(parent) => {
                self.out_recs[rec].first_left = Some(parent);
                self.out_recs[rec].is_hole = !self.out_recs[parent].is_hole;
            }
        }
    }

    /// True when `rec2` is reachable from `rec1` through `first_left`.
    pub(super) fn out_rec1_right_of_out_rec2(&self, rec1: usize, rec2: usize) -> bool {
        let mut cur = self.out_recs[rec1].first_left;
        while let Some(c) = cur {
            if c == rec2 {
                return true;
            }
            cur = self.out_recs[c].first_left;
        }
        false
    }

    /// The ring whose bottom vertex is lowest; it carries the correct hole
    /// state when two rings merge.
    #[allow(clippy::float_cmp)]
    pub(super) fn lowermost_rec(&mut self, rec1: usize, rec2: usize) -> usize {
        let b1 = self.ensure_bottom_pt(rec1);
        let b2 = self.ensure_bottom_pt(rec2);
        let (Some(b1), Some(b2)) = (b1, b2) else {
            return if b1.is_some() { rec1 } else { rec2 };
        };
        let (p1, p2) = (self.out_pts[b1].pt, self.out_pts[b2].pt);
        if p1.y > p2.y {
            rec1
        } else if p1.y < p2.y {
            rec2
        } else if p1.x < p2.x {
            rec1
        } else if p1.x > p2.x {
            rec2
        } else if self.out_pts[b1].next == b1 {
            rec2
        } else if self.out_pts[b2].next == b2 || self.first_is_bottom_pt(b1, b2) {
            rec1
        } else {
            rec2
        }
    }

    fn ensure_bottom_pt(&mut self, rec: usize) -> Option<OutPtId> {
        if self.out_recs[rec].bottom_pt.is_none() {
            let pts = self.out_recs[rec].pts?;
            self.out_recs[rec].bottom_pt = Some(self.bottom_pt(pts));
        }
        self.out_recs[rec].bottom_pt
    }

    /// The vertex with the largest Y (then smallest X) of a ring.
    #[allow(clippy::float_cmp)]
    pub(super) fn bottom_pt(&self, start: OutPtId) -> OutPtId {
        let mut pp = start;
        let mut dups: Option<OutPtId> = None;
        let mut p = self.out_pts[pp].next;
        while p != pp {
            let (pt, best) = (self.out_pts[p].pt, self.out_pts[pp].pt);
            if pt.y > best.y {
                pp = p;
                dups = None;
            } else if pt.y == best.y && pt.x <= best.x {
                if pt.x < best.x {
                    dups = None;
                    pp = p;
                } else if self.out_pts[p].next != pp && self.out_pts[p].prev != pp {
                    dups = Some(p);
                }
            }
            p = self.out_pts[p].next;
        }
        if let Some(mut d) = dups {
            // Several vertices share the bottom point; pick by edge angles.
            while d != p {
                if !self.first_is_bottom_pt(p, d) {
                    pp = d;
                }
                d = self.out_pts[d].next;
                while self.out_pts[d].pt != self.out_pts[pp].pt {
                    d = self.out_pts[d].next;
                }
            }
        }
        pp
    }

    fn neighbour_slope(&self, op: OutPtId, forward: bool) -> f64 {
        let pt = self.out_pts[op].pt;
        let step = |p: OutPtId| {
            if forward {
                self.out_pts[p].next
            } else {
                self.out_pts[p].prev
            }
        };
        let mut p = step(op);
        while self.out_pts[p].pt == pt && p != op {
            p = step(p);
        }
        inverse_slope(&pt, &self.out_pts[p].pt).abs()
    }

    #[allow(clippy::float_cmp)]
    fn first_is_bottom_pt(&self, btm1: OutPtId, btm2: OutPtId) -> bool {
        let dx1p = self.neighbour_slope(btm1, false);
        let dx1n = self.neighbour_slope(btm1, true);
        let dx2p = self.neighbour_slope(btm2, false);
        let dx2n = self.neighbour_slope(btm2, true);
        if dx1p.max(dx1n) == dx2p.max(dx2n) && dx1p.min(dx1n) == dx2p.min(dx2n) {
            self.ring_area(btm1) > 0.0
        } else {
            (dx1p >= dx2p && dx1p >= dx2n) || (dx1n >= dx2p && dx1n >= dx2n)
        }
    }

    /// Signed area of the ring walked through `next` links.
    pub(super) fn ring_area(&self, start: OutPtId) -> f64 {
        let mut area = 0.0;
        let mut op = start;
        loop {
            let (cur, prev) = (&self.out_pts[op], &self.out_pts[self.out_pts[op].prev]);
            area += (prev.pt.x + cur.pt.x) * (prev.pt.y - cur.pt.y);
            op = cur.next;
            if op == start {
                break;
            }
        }
        area * 0.5
    }

    pub(super) fn reverse_ring_links(&mut self, start: OutPtId) {
        let mut op = start;
        loop {
            let p = &mut self.out_pts[op];
            std::mem::swap(&mut p.next, &mut p.prev);
            // The old `next` is now `prev`.
            op = p.prev;
            if op == start {
                break;
            }
        }
    }

    pub(super) fn ring_len(&self, start: OutPtId) -> usize {
        let mut count = 0;
        let mut op = start;
        loop {
            count += 1;
            op = self.out_pts[op].next;
            if op == start {
                break;
            }
        }
        count
    }

    pub(super) fn ring_points(&self, start: OutPtId) -> Vec<Point2> {
        let mut points = Vec::new();
        let mut op = start;
        loop {
            points.push(self.out_pts[op].pt);
            op = self.out_pts[op].next;
            if op == start {
                break;
            }
        }
        points
    }

    pub(super) fn dispose_out_pts(&mut self, start: OutPtId) {
        let mut op = start;
        loop {
            let Some(removed) = self.out_pts.remove(op) else {
                break;
            };
            op = removed.next;
            if op == start {
                break;
            }
        }
    }

    /// True when ring `inner` lies inside ring `outer`, judged by the first
    /// vertex of `inner` not on the boundary of `outer`.
    pub(super) fn ring_contains_ring(&self, inner: OutPtId, outer: OutPtId) -> bool {
        let outer_pts = self.ring_points(outer);
        let mut op = inner;
        loop {
            match point_in_polygon(&self.out_pts[op].pt, &outer_pts) {
                PointLocation::Inside => return true,
                PointLocation::Outside => return false,
                PointLocation::OnBoundary => {}
            }
            op = self.out_pts[op].next;
            if op == inner {
                return true;
            }
        }
    }

    /// Merges the ring of `e2` into the ring of `e1` where the two bounds
    /// meet at a local maximum.
    fn append_polygon(&mut self, e1: EdgeId, e2: EdgeId) {
        let (idx1, idx2) = (self.edges[e1].out_idx, self.edges[e2].out_idx);
        let (Some(rec1), Some(rec2)) = (idx1.ring(), idx2.ring()) else {
            return;
        };
        let hole_state_rec = if self.out_rec1_right_of_out_rec2(rec1, rec2) {
            rec2
        } else if self.out_rec1_right_of_out_rec2(rec2, rec1) {
            rec1
        } else {
            self.lowermost_rec(rec1, rec2)
        };

        let (Some(p1_lft), Some(p2_lft)) = (self.out_recs[rec1].pts, self.out_recs[rec2].pts) else {
            return;
        };
        let p1_rt = self.out_pts[p1_lft].prev;
        let p2_rt = self.out_pts[p2_lft].prev;

        let (side1, side2) = (self.edges[e1].side, self.edges[e2].side);
        match (side1, side2) {
            (Side::Left, Side::Left) => {
                // z y x a b c
                self.reverse_ring_links(p2_lft);
                self.out_pts[p2_lft].next = p1_lft;
                self.out_pts[p1_lft].prev = p2_lft;
                self.out_pts[p1_rt].next = p2_rt;
                self.out_pts[p2_rt].prev = p1_rt;
                self.out_recs[rec1].pts = Some(p2_rt);
            }
            (Side::Left, Side::Right) => {
                // x y z a b c
                self.out_pts[p2_rt].next = p1_lft;
                self.out_pts[p1_lft].prev = p2_rt;
                self.out_pts[p2_lft].prev = p1_rt;
                self.out_pts[p1_rt].next = p2_lft;
                self.out_recs[rec1].pts = Some(p2_lft);
            }
            (Side::Right, Side::Right) => {
                // a b c z y x
                self.reverse_ring_links(p2_lft);
                self.out_pts[p1_rt].next = p2_rt;
                self.out_pts[p2_rt].prev = p1_rt;
                self.out_pts[p2_lft].next = p1_lft;
                self.out_pts[p1_lft].prev = p2_lft;
            }
            (Side::Right, Side::Left) => {
                // a b c x y z
                self.out_pts[p1_rt].next = p2_lft;
                self.out_pts[p2_lft].prev = p1_rt;
                self.out_pts[p1_lft].prev = p2_rt;
                self.out_pts[p2_rt].next = p1_lft;
            }
        }

        self.out_recs[rec1].bottom_pt = None;
        if hole_state_rec == rec2 {
            if self.out_recs[rec2].first_left != Some(rec1) {
                self.out_recs[rec1].first_left = self.out_recs[rec2].first_left;
            }
            self.out_recs[rec1].is_hole = self.out_recs[rec2].is_hole;
        }
        let rec2_entry = &mut self.out_recs[rec2];
        rec2_entry.pts = None;
        rec2_entry.bottom_pt = None;
        rec2_entry.first_left = Some(rec1);

        self.edges[e1].out_idx = OutIdx::Unassigned;
        self.edges[e2].out_idx = OutIdx::Unassigned;

        // The bound still feeding the absorbed ring now feeds `rec1`.
        let mut cursor = self.active_edges;
        while let Some(e) = cursor {
            if self.edges[e].out_idx == OutIdx::Ring(rec2) {
                self.edges[e].out_idx = OutIdx::Ring(rec1);
                self.edges[e].side = side1;
                break;
            }
            cursor = self.edges[e].next_in_ael;
        }
        self.out_recs[rec2].idx = self.out_recs[rec1].idx;
    }

    /// Removes duplicate vertices and collinear midpoints from a closed
    /// ring, dropping it entirely if fewer than three vertices remain.
    pub(super) fn fixup_out_polygon(&mut self, rec: usize) {
        self.out_recs[rec].bottom_pt = None;
        let Some(mut pp) = self.out_recs[rec].pts else {
            return;
        };
        let preserve_col = self.options.preserve_collinear || self.options.strictly_simple;
        let mut last_ok: Option<OutPtId> = None;
        loop {
            let (prev, next) = (self.out_pts[pp].prev, self.out_pts[pp].next);
            if prev == pp || prev == next {
                self.dispose_out_pts(pp);
                self.out_recs[rec].pts = None;
                return;
            }
            let (pp_pt, prev_pt, next_pt) = (
                self.out_pts[pp].pt,
                self.out_pts[prev].pt,
                self.out_pts[next].pt,
            );
            if pp_pt == next_pt
                || pp_pt == prev_pt
                || (slopes_equal3(&prev_pt, &pp_pt, &next_pt)
                    && (!preserve_col || !pt2_is_between(&prev_pt, &pp_pt, &next_pt)))
            {
                last_ok = None;
                self.out_pts[prev].next = next;
                self.out_pts[next].prev = prev;
                self.out_pts.remove(pp);
                pp = prev;
            } else if Some(pp) == last_ok {
                break;
            } else {
                if last_ok.is_none() {
                    last_ok = Some(pp);
                }
                pp = next;
            }
        }
        self.out_recs[rec].pts = Some(pp);
    }

    /// Removes consecutive duplicate vertices from an open ring.
    pub(super) fn fixup_out_polyline(&mut self, rec: usize) {
        let Some(start) = self.out_recs[rec].pts else {
            return;
        };
        let mut pp = start;
        let mut last_pp = self.out_pts[start].prev;
        while pp != last_pp {
            pp = self.out_pts[pp].next;
            let prev = self.out_pts[pp].prev;
            if self.out_pts[pp].pt == self.out_pts[prev].pt {
                if pp == last_pp {
                    last_pp = prev;
                }
                let next = self.out_pts[pp].next;
                self.out_pts[prev].next = next;
                self.out_pts[next].prev = prev;
                self.out_pts.remove(pp);
                pp = prev;
            }
        }
        if pp == self.out_pts[pp].prev {
            self.dispose_out_pts(pp);
            self.out_recs[rec].pts = None;
        }
    }
}
