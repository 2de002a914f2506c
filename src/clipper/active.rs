use crate::error::{AlgorithmError, Result};

use super::edge::EdgeId;
use super::engine::Clipper;

impl Clipper {
    /// True when `e2` belongs before `e1` in the AEL at the current scanline.
    #[allow(clippy::float_cmp)]
    fn e2_inserts_before_e1(&self, e1: EdgeId, e2: EdgeId) -> bool {
        let (a, b) = (&self.edges[e1], &self.edges[e2]);
        if b.curr.x == a.curr.x {
            if b.top.y > a.top.y {
                b.top.x < a.top_x(b.top.y)
            } else {
                a.top.x > b.top_x(a.top.y)
            }
        } else {
            b.curr.x < a.curr.x
        }
    }

    /// Inserts `edge` into the AEL, scanning right from `start` when given.
    pub(super) fn insert_edge_into_ael(&mut self, edge: EdgeId, start: Option<EdgeId>) {
        let Some(head) = self.active_edges else {
            self.edges[edge].prev_in_ael = None;
            self.edges[edge].next_in_ael = None;
            self.active_edges = Some(edge);
            return;
        };
        if start.is_none() && self.e2_inserts_before_e1(head, edge) {
            self.edges[edge].prev_in_ael = None;
            self.edges[edge].next_in_ael = Some(head);
            self.edges[head].prev_in_ael = Some(edge);
            self.active_edges = Some(edge);
            return;
        }
        let mut at = start.unwrap_or(head);
        while let Some(next) = self.edges[at].next_in_ael {
            if self.e2_inserts_before_e1(next, edge) {
                break;
            }
            at = next;
        }
        let next = self.edges[at].next_in_ael;
        self.edges[edge].next_in_ael = next;
        if let Some(next) = next {
            self.edges[next].prev_in_ael = Some(edge);
        }
        self.edges[edge].prev_in_ael = Some(at);
        self.edges[at].next_in_ael = Some(edge);
    }

    pub(super) fn delete_from_ael(&mut self, e: EdgeId) {
        let prev = self.edges[e].prev_in_ael;
        let next = self.edges[e].next_in_ael;
        if prev.is_none() && next.is_none() && self.active_edges != Some(e) {
            return;
        }
        match prev {
            Some(p) => self.edges[p].next_in_ael = next,
            None => self.active_edges = next,
        }
        if let Some(n) = next {
            self.edges[n].prev_in_ael = prev;
        }
        self.edges[e].next_in_ael = None;
        self.edges[e].prev_in_ael = None;
    }

    pub(super) fn add_edge_to_sel(&mut self, e: EdgeId) {
        self.edges[e].prev_in_sel = None;
        self.edges[e].next_in_sel = self.sorted_edges;
        if let Some(head) = self.sorted_edges {
            self.edges[head].prev_in_sel = Some(e);
        }
        self.sorted_edges = Some(e);
    }

    pub(super) fn pop_edge_from_sel(&mut self) -> Option<EdgeId> {
        let e = self.sorted_edges?;
        self.delete_from_sel(e);
        Some(e)
    }

    pub(super) fn delete_from_sel(&mut self, e: EdgeId) {
        let prev = self.edges[e].prev_in_sel;
        let next = self.edges[e].next_in_sel;
        if prev.is_none() && next.is_none() && self.sorted_edges != Some(e) {
            return;
        }
        match prev {
            Some(p) => self.edges[p].next_in_sel = next,
            None => self.sorted_edges = next,
        }
        if let Some(n) = next {
            self.edges[n].prev_in_sel = prev;
        }
        self.edges[e].next_in_sel = None;
        self.edges[e].prev_in_sel = None;
    }

    /// Rebuilds the SEL as a copy of the AEL order.
    pub(super) fn copy_ael_to_sel(&mut self) {
        self.sorted_edges = self.active_edges;
        let mut cur = self.active_edges;
        while let Some(e) = cur {
            let edge = &mut self.edges[e];
            edge.prev_in_sel = edge.prev_in_ael;
            edge.next_in_sel = edge.next_in_ael;
            cur = edge.next_in_ael;
        }
    }

    pub(super) fn swap_positions_in_ael(&mut self, e1: EdgeId, e2: EdgeId) {
        // Either edge may already have left the AEL.
        if self.edges[e1].next_in_ael == self.edges[e1].prev_in_ael
            || self.edges[e2].next_in_ael == self.edges[e2].prev_in_ael
        {
            return;
        }
        if self.edges[e1].next_in_ael == Some(e2) {
            let next = self.edges[e2].next_in_ael;
            if let Some(n) = next {
                self.edges[n].prev_in_ael = Some(e1);
            }
            let prev = self.edges[e1].prev_in_ael;
            if let Some(p) = prev {
                self.edges[p].next_in_ael = Some(e2);
            }
            self.edges[e2].prev_in_ael = prev;
            self.edges[e2].next_in_ael = Some(e1);
            self.edges[e1].prev_in_ael = Some(e2);
            self.edges[e1].next_in_ael = next;
        } else if self.edges[e2].next_in_ael == Some(e1) {
            let next = self.edges[e1].next_in_ael;
            if let Some(n) = next {
                self.edges[n].prev_in_ael = Some(e2);
            }
            let prev = self.edges[e2].prev_in_ael;
            if let Some(p) = prev {
                self.edges[p].next_in_ael = Some(e1);
            }
            self.edges[e1].prev_in_ael = prev;
            self.edges[e1].next_in_ael = Some(e2);
            self.edges[e2].prev_in_ael = Some(e1);
            self.edges[e2].next_in_ael = next;
        } else {
            let next = self.edges[e1].next_in_ael;
            let prev = self.edges[e1].prev_in_ael;
            let e2_next = self.edges[e2].next_in_ael;
            let e2_prev = self.edges[e2].prev_in_ael;
            self.edges[e1].next_in_ael = e2_next;
            if let Some(n) = e2_next {
                self.edges[n].prev_in_ael = Some(e1);
            }
            self.edges[e1].prev_in_ael = e2_prev;
            if let Some(p) = e2_prev {
                self.edges[p].next_in_ael = Some(e1);
            }
            self.edges[e2].next_in_ael = next;
            if let Some(n) = next {
                self.edges[n].prev_in_ael = Some(e2);
            }
            self.edges[e2].prev_in_ael = prev;
            if let Some(p) = prev {
                self.edges[p].next_in_ael = Some(e2);
            }
        }

        if self.edges[e1].prev_in_ael.is_none() {
            self.active_edges = Some(e1);
        } else if self.edges[e2].prev_in_ael.is_none() {
            self.active_edges = Some(e2);
        }
    }

    pub(super) fn swap_positions_in_sel(&mut self, e1: EdgeId, e2: EdgeId) {
        if (self.edges[e1].next_in_sel.is_none() && self.edges[e1].prev_in_sel.is_none())
            || (self.edges[e2].next_in_sel.is_none() && self.edges[e2].prev_in_sel.is_none())
        {
            return;
        }
        if self.edges[e1].next_in_sel == Some(e2) {
            let next = self.edges[e2].next_in_sel;
            if let Some(n) = next {
                self.edges[n].prev_in_sel = Some(e1);
            }
            let prev = self.edges[e1].prev_in_sel;
            if let Some(p) = prev {
                self.edges[p].next_in_sel = Some(e2);
            }
            self.edges[e2].prev_in_sel = prev;
            self.edges[e2].next_in_sel = Some(e1);
            self.edges[e1].prev_in_sel = Some(e2);
            self.edges[e1].next_in_sel = next;
        } else if self.edges[e2].next_in_sel == Some(e1) {
            let next = self.edges[e1].next_in_sel;
            if let Some(n) = next {
                self.edges[n].prev_in_sel = Some(e2);
            }
            let prev = self.edges[e2].prev_in_sel;
            if let Some(p) = prev {
                self.edges[p].next_in_sel = Some(e1);
            }
            self.edges[e1].prev_in_sel = prev;
            self.edges[e1].next_in_sel = Some(e2);
            self.edges[e2].prev_in_sel = Some(e1);
            self.edges[e2].next_in_sel = next;
        } else {
            let next = self.edges[e1].next_in_sel;
            let prev = self.edges[e1].prev_in_sel;
            let e2_next = self.edges[e2].next_in_sel;
            let e2_prev = self.edges[e2].prev_in_sel;
            self.edges[e1].next_in_sel = e2_next;
            if let Some(n) = e2_next {
                self.edges[n].prev_in_sel = Some(e1);
            }
            self.edges[e1].prev_in_sel = e2_prev;
            if let Some(p) = e2_prev {
                self.edges[p].next_in_sel = Some(e1);
            }
            self.edges[e2].next_in_sel = next;
            if let Some(n) = next {
                self.edges[n].prev_in_sel = Some(e2);
            }
            self.edges[e2].prev_in_sel = prev;
            if let Some(p) = prev {
                self.edges[p].next_in_sel = Some(e2);
            }
        }

        if self.edges[e1].prev_in_sel.is_none() {
            self.sorted_edges = Some(e1);
        } else if self.edges[e2].prev_in_sel.is_none() {
            self.sorted_edges = Some(e2);
        }
    }

    /// Replaces `e` in the AEL with the next edge of its bound and returns it.
    pub(super) fn update_edge_into_ael(&mut self, e: EdgeId) -> Result<EdgeId> {
        let Some(next) = self.edges[e].next_in_lml else {
            return Err(AlgorithmError::MissingNextBound.into());
        };
        let prev_ael = self.edges[e].prev_in_ael;
        let next_ael = self.edges[e].next_in_ael;
        match prev_ael {
            Some(p) => self.edges[p].next_in_ael = Some(next),
            None => self.active_edges = Some(next),
        }
        if let Some(n) = next_ael {
            self.edges[n].prev_in_ael = Some(next);
        }

        let old = self.edges[e].clone();
        let edge = &mut self.edges[next];
        edge.out_idx = old.out_idx;
        edge.side = old.side;
        edge.wind_delta = old.wind_delta;
        edge.wind_cnt = old.wind_cnt;
        edge.wind_cnt2 = old.wind_cnt2;
        edge.curr = edge.bot;
        edge.prev_in_ael = prev_ael;
        edge.next_in_ael = next_ael;
        if !edge.is_horizontal() {
            let top_y = edge.top.y;
            self.scanbeam.insert(top_y);
        }
        Ok(next)
    }

    /// Next edge in the AEL in the given sweep direction.
    pub(super) fn next_in_ael(&self, e: EdgeId, left_to_right: bool) -> Option<EdgeId> {
        if left_to_right {
            self.edges[e].next_in_ael
        } else {
            self.edges[e].prev_in_ael
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::clipper::{Clipper, PolyType};
    use crate::math::Point2;

    fn ael_order(clipper: &Clipper) -> Vec<f64> {
        let mut xs = Vec::new();
        let mut cur = clipper.active_edges;
        while let Some(e) = cur {
            xs.push(clipper.edges[e].curr.x);
            cur = clipper.edges[e].next_in_ael;
        }
        xs
    }

    fn two_triangles() -> Clipper {
        let mut clipper = Clipper::new();
        let a = [
            Point2::new(0.0, 10.0),
            Point2::new(2.0, 0.0),
            Point2::new(4.0, 10.0),
        ];
        let b = [
            Point2::new(6.0, 10.0),
            Point2::new(8.0, 0.0),
            Point2::new(10.0, 10.0),
        ];
        assert!(clipper.add_path(&a, PolyType::Subject));
        assert!(clipper.add_path(&b, PolyType::Subject));
        clipper.reset();
        for lm in clipper.minima.clone() {
            clipper.insert_edge_into_ael(lm.left_bound.unwrap(), None);
            clipper.insert_edge_into_ael(lm.right_bound.unwrap(), lm.left_bound);
        }
        clipper
    }

    #[test]
    fn ael_stays_sorted_by_x() {
        let clipper = two_triangles();
        let xs = ael_order(&clipper);
        assert_eq!(xs.len(), 4);
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn swap_and_delete_keep_links_consistent() {
        let mut clipper = two_triangles();
        let first = clipper.active_edges.unwrap();
        let second = clipper.edges[first].next_in_ael.unwrap();
        clipper.swap_positions_in_ael(first, second);
        assert_eq!(clipper.active_edges, Some(second));
        assert_eq!(clipper.edges[second].next_in_ael, Some(first));
        clipper.delete_from_ael(second);
        assert_eq!(clipper.active_edges, Some(first));
        assert!(clipper.edges[first].prev_in_ael.is_none());
        assert_eq!(ael_order(&clipper).len(), 3);
    }

    #[test]
    fn sel_copy_and_pop() {
        let mut clipper = two_triangles();
        clipper.copy_ael_to_sel();
        let mut count = 0;
        while clipper.pop_edge_from_sel().is_some() {
            count += 1;
        }
        assert_eq!(count, 4);
        assert!(clipper.sorted_edges.is_none());
    }
}
