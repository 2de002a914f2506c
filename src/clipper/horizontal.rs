use crate::error::Result;
use crate::math::Point2;

use super::edge::{edge_slopes_equal, EdgeId};
use super::engine::Clipper;
use super::output::OutPtId;

/// True when the open X ranges `[a1, a2]` and `[b1, b2]` share some length.
pub(crate) fn horz_segments_overlap(mut a1: f64, mut a2: f64, mut b1: f64, mut b2: f64) -> bool {
    if a1 > a2 {
        std::mem::swap(&mut a1, &mut a2);
    }
    if b1 > b2 {
        std::mem::swap(&mut b1, &mut b2);
    }
    a1 < b2 && b1 < a2
}

/// Travel direction of a horizontal and its X extent.
#[derive(Debug, Clone, Copy)]
struct HorzSpan {
    left_to_right: bool,
    left: f64,
    right: f64,
}

impl HorzSpan {
    fn of(bot: Point2, top: Point2) -> Self {
        if bot.x < top.x {
            Self {
                left_to_right: true,
                left: bot.x,
                right: top.x,
            }
        } else {
            Self {
                left_to_right: false,
                left: top.x,
                right: bot.x,
            }
        }
    }
}

/// Cursor over the scanbeam's maxima in the horizontal's travel direction.
struct MaximaCursor {
    xs: Vec<f64>,
    pos: usize,
    left_to_right: bool,
}

impl MaximaCursor {
    /// Positions the cursor on the first maximum strictly inside the run of
    /// horizontals from `start_x` to `end_x`.
    #[allow(clippy::float_cmp)]
    fn new(sorted: &[f64], left_to_right: bool, start_x: f64, end_x: f64) -> Self {
        let xs: Vec<f64> = if left_to_right {
            sorted.to_vec()
        } else {
            sorted.iter().rev().copied().collect()
        };
        let mut pos = 0;
        if left_to_right {
            while pos < xs.len() && xs[pos] <= start_x {
                pos += 1;
            }
            if pos < xs.len() && xs[pos] >= end_x {
                pos = xs.len();
            }
        } else {
            while pos < xs.len() && xs[pos] >= start_x {
                pos += 1;
            }
            if pos < xs.len() && xs[pos] <= end_x {
                pos = xs.len();
            }
        }
        Self {
            xs,
            pos,
            left_to_right,
        }
    }

    /// Yields the maxima passed before reaching `x`.
    fn advance_to(&mut self, x: f64) -> Vec<f64> {
        let mut passed = Vec::new();
        while let Some(&m) = self.xs.get(self.pos) {
            let before = if self.left_to_right { m < x } else { m > x };
            if !before {
                break;
            }
            passed.push(m);
            self.pos += 1;
        }
        passed
    }
}

impl Clipper {
    /// Sweeps a horizontal edge (and any horizontals following it in its
    /// bound) across the AEL, crossing every edge it passes.
    #[allow(clippy::float_cmp, clippy::too_many_lines)]
    pub(super) fn process_horizontal(&mut self, horz: EdgeId) -> Result<()> {
        let mut horz = horz;
        let is_open = self.edges[horz].wind_delta == 0;
        let mut span = HorzSpan::of(self.edges[horz].bot, self.edges[horz].top);

        let mut last_horz = horz;
        while let Some(next) = self.edges[last_horz].next_in_lml {
            if !self.edges[next].is_horizontal() {
                break;
            }
            last_horz = next;
        }
        let max_pair = if self.edges[last_horz].next_in_lml.is_none() {
            self.maxima_pair(last_horz)
        } else {
            None
        };

        let mut maxima = (!self.maxima.is_empty()).then(|| {
            MaximaCursor::new(
                self.maxima.as_slice(),
                span.left_to_right,
                self.edges[horz].bot.x,
                self.edges[last_horz].top.x,
            )
        });

        let mut op1: Option<OutPtId> = None;
        loop {
            let is_last_horz = horz == last_horz;
            let mut cursor = self.next_in_ael(horz, span.left_to_right);
            while let Some(e) = cursor {
                // Maxima touching the horizontal become vertices on it.
                if let Some(m) = maxima.as_mut() {
                    if m.left_to_right == span.left_to_right {
                        let bot_y = self.edges[horz].bot.y;
                        for x in m.advance_to(self.edges[e].curr.x) {
                            if self.edges[horz].out_idx.is_ring() && !is_open {
                                self.add_out_pt(horz, Point2::new(x, bot_y));
                            }
                        }
                    }
                }

                let e_x = self.edges[e].curr.x;
                if (span.left_to_right && e_x > span.right)
                    || (!span.left_to_right && e_x < span.left)
                {
                    break;
                }

                // Stop at the end of an intermediate horizontal when the next
                // edge of the bound lies beyond `e`.
                if let Some(next) = self.edges[horz].next_in_lml {
                    if e_x == self.edges[horz].top.x && self.edges[e].dx < self.edges[next].dx {
                        break;
                    }
                }

                if self.edges[horz].out_idx.is_ring() && !is_open {
                    let pt = self.edges[e].curr;
                    let op = self.add_out_pt(horz, pt);
                    op1 = Some(op);
                    self.join_overlapping_horizontals(horz, op);
                    let bot = self.edges[horz].bot;
                    self.add_ghost_join(op, bot);
                }

                if Some(e) == max_pair && is_last_horz {
                    if self.edges[horz].out_idx.is_ring() {
                        let top = self.edges[horz].top;
                        self.add_local_max_poly(horz, e, top);
                    }
                    self.delete_from_ael(horz);
                    self.delete_from_ael(e);
                    return Ok(());
                }

                let pt = Point2::new(e_x, self.edges[horz].curr.y);
                if span.left_to_right {
                    self.intersect_edges(horz, e, pt);
                } else {
                    self.intersect_edges(e, horz, pt);
                }
                let next = self.next_in_ael(e, span.left_to_right);
                self.swap_positions_in_ael(horz, e);
                cursor = next;
            }

            let continues = self.edges[horz]
                .next_in_lml
                .is_some_and(|next| self.edges[next].is_horizontal());
            if !continues {
                break;
            }
            horz = self.update_edge_into_ael(horz)?;
            if self.edges[horz].out_idx.is_ring() {
                let bot = self.edges[horz].bot;
                self.add_out_pt(horz, bot);
            }
            span = HorzSpan::of(self.edges[horz].bot, self.edges[horz].top);
        }

        if self.edges[horz].out_idx.is_ring() && op1.is_none() {
            if let Some(op) = self.last_out_pt(horz) {
                self.join_overlapping_horizontals(horz, op);
                let top = self.edges[horz].top;
                self.add_ghost_join(op, top);
            }
        }

        if self.edges[horz].next_in_lml.is_none() {
            if self.edges[horz].out_idx.is_ring() {
                let top = self.edges[horz].top;
                self.add_out_pt(horz, top);
            }
            self.delete_from_ael(horz);
            return Ok(());
        }

        if !self.edges[horz].out_idx.is_ring() {
            self.update_edge_into_ael(horz)?;
            return Ok(());
        }

        let top = self.edges[horz].top;
        let op = self.add_out_pt(horz, top);
        let horz = self.update_edge_into_ael(horz)?;
        if self.edges[horz].wind_delta == 0 {
            return Ok(());
        }
        // `horz` is no longer horizontal here.
        let neighbours = [self.edges[horz].prev_in_ael, self.edges[horz].next_in_ael];
        for other in neighbours.into_iter().flatten() {
            let (h, n) = (&self.edges[horz], &self.edges[other]);
            if n.curr == h.bot
                && n.wind_delta != 0
                && n.out_idx.is_ring()
                && n.curr.y > n.top.y
                && edge_slopes_equal(h, n)
            {
                let (bot, top) = (h.bot, h.top);
                let op2 = self.add_out_pt(other, bot);
                self.add_join(op, op2, top);
                break;
            }
        }
        Ok(())
    }

    /// Joins `op` with every contributing horizontal still waiting in the SEL
    /// whose span overlaps `horz`.
    fn join_overlapping_horizontals(&mut self, horz: EdgeId, op: OutPtId) {
        let (bot_x, top_x) = (self.edges[horz].bot.x, self.edges[horz].top.x);
        let mut cursor = self.sorted_edges;
        while let Some(other) = cursor {
            let o = &self.edges[other];
            if o.out_idx.is_ring() && horz_segments_overlap(bot_x, top_x, o.bot.x, o.top.x) {
                let off = o.top;
                if let Some(op2) = self.last_out_pt(other) {
                    self.add_join(op2, op, off);
                }
            }
            cursor = self.edges[other].next_in_sel;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_ignores_orientation() {
        assert!(horz_segments_overlap(0.0, 5.0, 4.0, 10.0));
        assert!(horz_segments_overlap(5.0, 0.0, 10.0, 4.0));
        assert!(!horz_segments_overlap(0.0, 5.0, 5.0, 10.0));
        assert!(!horz_segments_overlap(0.0, 1.0, 2.0, 3.0));
    }

    #[test]
    fn span_direction_follows_bot() {
        let span = HorzSpan::of(Point2::new(8.0, 1.0), Point2::new(2.0, 1.0));
        assert!(!span.left_to_right);
        assert!((span.left - 2.0).abs() < f64::EPSILON);
        assert!((span.right - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn maxima_cursor_skips_out_of_range_values() {
        let sorted = [1.0, 3.0, 5.0, 9.0];
        let mut ltr = MaximaCursor::new(&sorted, true, 2.0, 8.0);
        assert_eq!(ltr.advance_to(6.0), vec![3.0, 5.0]);
        assert!(ltr.advance_to(100.0).contains(&9.0));

        let mut rtl = MaximaCursor::new(&sorted, false, 8.0, 2.0);
        assert_eq!(rtl.advance_to(4.0), vec![5.0]);

        let mut none = MaximaCursor::new(&sorted, true, 5.0, 9.0);
        assert!(none.advance_to(100.0).is_empty());
    }

    #[test]
    fn maxima_cursor_excludes_start_in_both_directions() {
        let sorted = [1.0, 3.0, 5.0, 9.0];
        let mut ltr = MaximaCursor::new(&sorted, true, 3.0, 9.5);
        assert_eq!(ltr.advance_to(9.5), vec![5.0, 9.0]);

        let mut rtl = MaximaCursor::new(&sorted, false, 5.0, 0.5);
        assert_eq!(rtl.advance_to(0.5), vec![3.0, 1.0]);
    }
}
