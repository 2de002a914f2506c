use super::edge::{EdgeId, OutIdx};
use super::engine::Clipper;

/// A vertex where two bounds start rising together.
///
/// Either bound may be absent when the minimum belongs to an open path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalMinimum {
    pub y: f64,
    pub left_bound: Option<EdgeId>,
    pub right_bound: Option<EdgeId>,
}

impl Clipper {
    /// Registers the local minima of the edge ring starting at `start`.
    ///
    /// Returns `false` (and discards the ring) for a totally flat closed path.
    #[allow(clippy::float_cmp)]
    pub(super) fn add_bounds(&mut self, start: EdgeId, is_flat: bool, closed: bool) -> bool {
        if is_flat {
            if closed {
                self.dispose_edge_ring(start);
                return false;
            }
            self.add_flat_open_bound(start);
            return true;
        }

        let mut e = start;
        let prev = self.edges[e].prev;
        // Open paths whose ends meet would otherwise never find a minimum.
        if self.edges[prev].bot == self.edges[prev].top {
            e = self.edges[e].next;
        }

        let mut e_min: Option<EdgeId> = None;
        loop {
            e = self.find_next_loc_min(e);
            if e_min == Some(e) {
                break;
            }
            if e_min.is_none() {
                e_min = Some(e);
            }

            let y = self.edges[e].bot.y;
            let prev = self.edges[e].prev;
            let (left, right, left_is_forward) = if self.edges[e].dx < self.edges[prev].dx {
                (prev, e, false)
            } else {
                (e, prev, true)
            };

            let wind_delta = if !closed {
                0
            } else if self.edges[left].next == right {
                -1
            } else {
                1
            };
            self.edges[left].wind_delta = wind_delta;
            self.edges[right].wind_delta = -wind_delta;

            let mut e_left = self.process_bound(left, left_is_forward);
            if self.edges[e_left].out_idx == OutIdx::Skip {
                e_left = self.process_bound(e_left, left_is_forward);
            }
            let mut e_right = self.process_bound(right, !left_is_forward);
            if self.edges[e_right].out_idx == OutIdx::Skip {
                e_right = self.process_bound(e_right, !left_is_forward);
            }

            let mut minimum = LocalMinimum {
                y,
                left_bound: Some(left),
                right_bound: Some(right),
            };
            if self.edges[left].out_idx == OutIdx::Skip {
                minimum.left_bound = None;
            } else if self.edges[right].out_idx == OutIdx::Skip {
                minimum.right_bound = None;
            }
            self.minima.push(minimum);

            e = if left_is_forward { e_left } else { e_right };
        }
        true
    }

    /// A flat open path becomes a single right bound of horizontals.
    #[allow(clippy::float_cmp)]
    fn add_flat_open_bound(&mut self, start: EdgeId) {
        let mut e = start;
        let prev = self.edges[e].prev;
        self.edges[prev].out_idx = OutIdx::Skip;
        let minimum = LocalMinimum {
            y: self.edges[e].bot.y,
            left_bound: None,
            right_bound: Some(e),
        };
        self.edges[e].side = super::edge::Side::Right;
        self.edges[e].wind_delta = 0;
        loop {
            let prev = self.edges[e].prev;
            if self.edges[e].bot.x != self.edges[prev].top.x {
                self.edges[e].reverse_horizontal();
            }
            let next = self.edges[e].next;
            if self.edges[next].out_idx == OutIdx::Skip {
                break;
            }
            self.edges[e].next_in_lml = Some(next);
            e = next;
        }
        self.minima.push(minimum);
    }

    fn is_horz(&self, e: EdgeId) -> bool {
        self.edges[e].is_horizontal()
    }

    /// Walks forward to the next local minimum, left-aligned when the
    /// minimum is a horizontal run.
    #[allow(clippy::float_cmp)]
    fn find_next_loc_min(&self, mut e: EdgeId) -> EdgeId {
        loop {
            while self.edges[e].bot != self.edges[self.edges[e].prev].bot
                || self.edges[e].curr == self.edges[e].top
            {
                e = self.edges[e].next;
            }
            if !self.is_horz(e) && !self.is_horz(self.edges[e].prev) {
                break;
            }
            while self.is_horz(self.edges[e].prev) {
                e = self.edges[e].prev;
            }
            let e2 = e;
            while self.is_horz(e) {
                e = self.edges[e].next;
            }
            if self.edges[e].top.y == self.edges[self.edges[e].prev].bot.y {
                // Just an intermediate horizontal.
                continue;
            }
            if self.edges[self.edges[e2].prev].bot.x < self.edges[e].bot.x {
                e = e2;
            }
            break;
        }
        e
    }

    /// Links one bound through `next_in_lml` and returns the edge just past
    /// its top.
    #[allow(clippy::float_cmp)]
    fn process_bound(&mut self, mut e: EdgeId, next_is_forward: bool) -> EdgeId {
        let mut result = e;

        if self.edges[e].out_idx == OutIdx::Skip {
            // Edges may remain beyond the skip edge; if so they form another
            // minimum with only a right bound.
            if next_is_forward {
                while self.edges[e].top.y == self.edges[self.edges[e].next].bot.y {
                    e = self.edges[e].next;
                }
                while e != result && self.is_horz(e) {
                    e = self.edges[e].prev;
                }
            } else {
                while self.edges[e].top.y == self.edges[self.edges[e].prev].bot.y {
                    e = self.edges[e].prev;
                }
                while e != result && self.is_horz(e) {
                    e = self.edges[e].next;
                }
            }

            if e == result {
                result = if next_is_forward {
                    self.edges[e].next
                } else {
                    self.edges[e].prev
                };
            } else {
                e = if next_is_forward {
                    self.edges[result].next
                } else {
                    self.edges[result].prev
                };
                let minimum = LocalMinimum {
                    y: self.edges[e].bot.y,
                    left_bound: None,
                    right_bound: Some(e),
                };
                self.edges[e].wind_delta = 0;
                result = self.process_bound(e, next_is_forward);
                self.minima.push(minimum);
            }
            return result;
        }

        if self.is_horz(e) {
            // Consecutive horizontals may head left before going right, and
            // after a skip edge this may not be a true minimum.
            let e_start = if next_is_forward {
                self.edges[e].prev
            } else {
                self.edges[e].next
            };
            let bot_x = self.edges[e].bot.x;
            if self.is_horz(e_start) {
                if self.edges[e_start].bot.x != bot_x && self.edges[e_start].top.x != bot_x {
                    self.edges[e].reverse_horizontal();
                }
            } else if self.edges[e_start].bot.x != bot_x {
                self.edges[e].reverse_horizontal();
            }
        }

        let e_start = e;
        if next_is_forward {
            while self.edges[result].top.y == self.edges[self.edges[result].next].bot.y
                && self.edges[self.edges[result].next].out_idx != OutIdx::Skip
            {
                result = self.edges[result].next;
            }
            if self.is_horz(result) && self.edges[self.edges[result].next].out_idx != OutIdx::Skip {
                // A top horizontal joins this bound only when the preceding
                // edge attaches to its left end.
                let mut horz = result;
                while self.is_horz(self.edges[horz].prev) {
                    horz = self.edges[horz].prev;
                }
                let horz_prev = self.edges[horz].prev;
                if self.edges[horz_prev].top.x > self.edges[self.edges[result].next].top.x {
                    result = horz_prev;
                }
            }
            while e != result {
                let next = self.edges[e].next;
                self.edges[e].next_in_lml = Some(next);
                self.normalize_bound_horizontal(e, e_start, true);
                e = next;
            }
            self.normalize_bound_horizontal(e, e_start, true);
            result = self.edges[result].next;
        } else {
            while self.edges[result].top.y == self.edges[self.edges[result].prev].bot.y
                && self.edges[self.edges[result].prev].out_idx != OutIdx::Skip
            {
                result = self.edges[result].prev;
            }
            if self.is_horz(result) && self.edges[self.edges[result].prev].out_idx != OutIdx::Skip {
                let mut horz = result;
                while self.is_horz(self.edges[horz].next) {
                    horz = self.edges[horz].next;
                }
                let horz_next = self.edges[horz].next;
                if self.edges[horz_next].top.x >= self.edges[self.edges[result].prev].top.x {
                    result = horz_next;
                }
            }
            while e != result {
                let prev = self.edges[e].prev;
                self.edges[e].next_in_lml = Some(prev);
                self.normalize_bound_horizontal(e, e_start, false);
                e = prev;
            }
            self.normalize_bound_horizontal(e, e_start, false);
            result = self.edges[result].prev;
        }
        result
    }

    /// Orients a horizontal inside a bound so its `bot` touches the previous
    /// edge of the bound.
    #[allow(clippy::float_cmp)]
    fn normalize_bound_horizontal(&mut self, e: EdgeId, e_start: EdgeId, forward: bool) {
        if e == e_start || !self.is_horz(e) {
            return;
        }
        let behind = if forward {
            self.edges[e].prev
        } else {
            self.edges[e].next
        };
        if self.edges[e].bot.x != self.edges[behind].top.x {
            self.edges[e].reverse_horizontal();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::clipper::{Clipper, PolyType};
    use crate::math::Point2;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn square_has_one_minimum() {
        let mut clipper = Clipper::new();
        let square = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(clipper.add_path(&square, PolyType::Subject));
        assert_eq!(clipper.minima.len(), 1);
        let lm = clipper.minima[0];
        assert!(lm.left_bound.is_some() && lm.right_bound.is_some());
        assert!((lm.y - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zigzag_has_two_minima() {
        let mut clipper = Clipper::new();
        let w = pts(&[(0.0, 0.0), (2.0, 10.0), (4.0, 2.0), (6.0, 10.0), (8.0, 0.0)]);
        assert!(clipper.add_path(&w, PolyType::Clip));
        assert_eq!(clipper.minima.len(), 2);
    }

    #[test]
    fn closed_bounds_carry_opposite_wind_deltas() {
        let mut clipper = Clipper::new();
        let tri = pts(&[(0.0, 0.0), (10.0, 5.0), (0.0, 10.0)]);
        assert!(clipper.add_path(&tri, PolyType::Subject));
        let lm = clipper.minima[0];
        let (Some(lb), Some(rb)) = (lm.left_bound, lm.right_bound) else {
            panic!("triangle minimum must have both bounds");
        };
        let (l, r) = (clipper.edges[lb].wind_delta, clipper.edges[rb].wind_delta);
        assert_eq!(l, -r);
        assert_eq!(l.abs(), 1);
    }

    #[test]
    fn open_path_minimum_has_zero_wind_delta() {
        let mut clipper = Clipper::new();
        let line = pts(&[(0.0, 0.0), (5.0, 10.0), (10.0, 0.0)]);
        assert!(clipper.add_open_path(&line));
        assert!(!clipper.minima.is_empty());
        for lm in &clipper.minima {
            for e in [lm.left_bound, lm.right_bound].into_iter().flatten() {
                assert_eq!(clipper.edges[e].wind_delta, 0);
            }
        }
    }

    #[test]
    fn flat_open_path_is_single_right_bound() {
        let mut clipper = Clipper::new();
        let line = pts(&[(0.0, 3.0), (5.0, 3.0), (9.0, 3.0)]);
        assert!(clipper.add_open_path(&line));
        assert_eq!(clipper.minima.len(), 1);
        assert!(clipper.minima[0].left_bound.is_none());
        assert!(clipper.minima[0].right_bound.is_some());
    }
}
