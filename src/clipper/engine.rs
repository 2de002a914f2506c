use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use crate::error::{AlgorithmError, ClipError, Result};
use crate::math::polygon_2d::slopes_equal4;
use crate::math::Point2;

use super::edge::{Edge, EdgeId, OutIdx, PolyType, Side};
use super::horizontal::horz_segments_overlap;
use super::intersect::IntersectNode;
use super::join::{GhostJoin, Join};
use super::local_minima::LocalMinimum;
use super::output::{OutPt, OutPtId, OutRec};
use super::scanbeam::{MaximaList, Scanbeam};
use super::tree::PolyTree;

/// Options controlling the shape of the clipping result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipperOptions {
    /// Split output rings wherever they touch themselves or each other, so
    /// every contour is a simple polygon.
    pub strictly_simple: bool,
    /// Keep vertices that lie on a straight line between their neighbours.
    pub preserve_collinear: bool,
    /// Emit outers clockwise and holes counter-clockwise.
    pub reverse_solution: bool,
}

impl Default for ClipperOptions {
    fn default() -> Self {
        Self {
            strictly_simple: true,
            preserve_collinear: false,
            reverse_solution: false,
        }
    }
}

/// Sweep-line polygon clipping engine.
///
/// Subject and clip paths are added first, then [`Clipper::execute`] sweeps
/// them and returns the resulting [`PolyTree`]. Both path kinds are filled
/// with the even-odd rule, and the region kept is the part of the subject
/// lying outside the clip region. Open subject paths keep the pieces outside
/// the clip region.
///
/// Paths stay registered after a run, so the same input can be executed
/// again until [`Clipper::clear`] is called.
#[derive(Debug, Default)]
pub struct Clipper {
    pub(super) options: ClipperOptions,
    pub(super) edges: SlotMap<EdgeId, Edge>,
    pub(super) minima: Vec<LocalMinimum>,
    pub(super) current_lm: usize,
    pub(super) scanbeam: Scanbeam,
    pub(super) maxima: MaximaList,
    pub(super) active_edges: Option<EdgeId>,
    pub(super) sorted_edges: Option<EdgeId>,
    pub(super) out_recs: Vec<OutRec>,
    pub(super) out_pts: SlotMap<OutPtId, OutPt>,
    pub(super) joins: Vec<Join>,
    pub(super) ghost_joins: Vec<GhostJoin>,
    pub(super) intersections: Vec<IntersectNode>,
    pub(super) has_open_paths: bool,
    pub(super) execute_locked: bool,
}

impl Clipper {
    /// Creates an engine with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine that uses `options` for every run.
    #[must_use]
    pub fn with_options(options: ClipperOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options used by the next run.
    #[must_use]
    pub fn options(&self) -> ClipperOptions {
        self.options
    }

    /// Replaces the options used by subsequent runs.
    ///
    /// `preserve_collinear` also affects how later paths are added, so set it
    /// before adding input.
    pub fn set_options(&mut self, options: ClipperOptions) {
        self.options = options;
    }

    /// Adds a closed path.
    ///
    /// Returns `false` when the path collapses to fewer than three distinct
    /// non-collinear vertices, or when all of its vertices share one Y.
    pub fn add_path(&mut self, path: &[Point2], poly_type: PolyType) -> bool {
        self.add_path_internal(path, poly_type, true)
    }

    /// Adds an open subject path (a polyline).
    ///
    /// Returns `false` when fewer than two distinct vertices remain.
    pub fn add_open_path(&mut self, path: &[Point2]) -> bool {
        self.add_path_internal(path, PolyType::Subject, false)
    }

    /// Adds several closed paths; returns `true` if any of them was accepted.
    pub fn add_paths(&mut self, paths: &[Vec<Point2>], poly_type: PolyType) -> bool {
        let mut any = false;
        for path in paths {
            any |= self.add_path(path, poly_type);
        }
        any
    }

    fn add_path_internal(&mut self, path: &[Point2], poly_type: PolyType, closed: bool) -> bool {
        let Some((start, is_flat)) = self.build_edge_ring(path, poly_type, closed) else {
            debug!(points = path.len(), closed, "rejected degenerate path");
            return false;
        };
        if !self.add_bounds(start, is_flat, closed) {
            debug!(points = path.len(), "rejected flat closed path");
            return false;
        }
        if !closed {
            self.has_open_paths = true;
        }
        true
    }

    /// Removes every registered path.
    pub fn clear(&mut self) {
        self.dispose_all_out_recs();
        self.edges.clear();
        self.minima.clear();
        self.current_lm = 0;
        self.scanbeam.clear();
        self.has_open_paths = false;
    }

    /// Runs the sweep and builds the polygon tree.
    ///
    /// Returns `None` when no path was added, when called while another run
    /// on this engine is in progress, or when the sweep fails internally.
    pub fn execute(&mut self) -> Option<PolyTree> {
        match self.try_execute() {
            Ok(tree) => Some(tree),
            Err(ClipError::NothingToClip) => {
                debug!("execute called without input paths");
                None
            }
            Err(err) => {
                warn!(%err, "clipping run failed");
                None
            }
        }
    }

    /// Like [`Clipper::execute`] but reports why no tree was produced.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::Locked`] for a reentrant call,
    /// [`ClipError::NothingToClip`] for an engine without paths, and
    /// [`ClipError::Algorithm`] when the sweep reaches an inconsistent state.
    /// All partial output is discarded in every error case.
    pub fn try_execute(&mut self) -> Result<PolyTree> {
        if self.execute_locked {
            return Err(ClipError::Locked);
        }
        self.execute_locked = true;
        let result = self.execute_internal().map(|()| self.build_tree());
        self.dispose_all_out_recs();
        self.execute_locked = false;
        if let Ok(tree) = &result {
            debug!(
                roots = tree.roots().len(),
                contours = tree.total_contours(),
                open_paths = self.has_open_paths,
                "clipping run finished"
            );
        }
        result
    }

    /// Rewinds the local minima cursor and reseeds the scanbeam.
    pub(super) fn reset(&mut self) {
        self.minima.sort_by(|a, b| b.y.total_cmp(&a.y));
        self.current_lm = 0;
        self.scanbeam.clear();
        for i in 0..self.minima.len() {
            let lm = self.minima[i];
            self.scanbeam.insert(lm.y);
            for (bound, side) in [(lm.left_bound, Side::Left), (lm.right_bound, Side::Right)] {
                if let Some(e) = bound {
                    let edge = &mut self.edges[e];
                    edge.curr = edge.bot;
                    edge.side = side;
                    edge.out_idx = OutIdx::Unassigned;
                }
            }
        }
        self.active_edges = None;
    }

    fn dispose_all_out_recs(&mut self) {
        self.out_recs.clear();
        self.out_pts.clear();
        self.joins.clear();
        self.ghost_joins.clear();
        self.intersections.clear();
        self.maxima.clear();
        self.active_edges = None;
        self.sorted_edges = None;
    }

    fn execute_internal(&mut self) -> Result<()> {
        self.reset();
        self.maxima.clear();
        self.sorted_edges = None;

        let Some(mut bot_y) = self.scanbeam.pop() else {
            return Err(ClipError::NothingToClip);
        };
        self.insert_local_minima_into_ael(bot_y);
        loop {
            let top_y = match self.scanbeam.pop() {
                Some(y) => y,
                None if self.local_minima_pending() => bot_y,
                None => break,
            };
            trace!(bot_y, top_y, "scanbeam");
            self.process_horizontals()?;
            self.ghost_joins.clear();
            self.process_intersections(top_y)?;
            self.process_edges_at_top_of_scanbeam(top_y)?;
            bot_y = top_y;
            self.insert_local_minima_into_ael(bot_y);
        }

        for idx in 0..self.out_recs.len() {
            let rec = &self.out_recs[idx];
            let Some(pts) = rec.pts else {
                continue;
            };
            if rec.is_open {
                continue;
            }
            let positive = self.ring_area(pts) > 0.0;
            if (rec.is_hole ^ self.options.reverse_solution) == positive {
                self.reverse_ring_links(pts);
            }
        }

        if !self.joins.is_empty() {
            self.join_common_edges();
        }

        for idx in 0..self.out_recs.len() {
            if self.out_recs[idx].pts.is_none() {
                continue;
            }
            if self.out_recs[idx].is_open {
                self.fixup_out_polyline(idx);
            } else {
                self.fixup_out_polygon(idx);
            }
        }

        if self.options.strictly_simple {
            self.do_simple_polygons();
        }
        trace!(rings = self.out_recs.len(), "sweep complete");
        Ok(())
    }

    fn local_minima_pending(&self) -> bool {
        self.current_lm < self.minima.len()
    }

    #[allow(clippy::float_cmp)]
    fn pop_local_minimum(&mut self, y: f64) -> Option<LocalMinimum> {
        let lm = *self.minima.get(self.current_lm)?;
        if lm.y != y {
            return None;
        }
        self.current_lm += 1;
        Some(lm)
    }

    #[allow(clippy::float_cmp, clippy::too_many_lines)]
    fn insert_local_minima_into_ael(&mut self, bot_y: f64) {
        while let Some(lm) = self.pop_local_minimum(bot_y) {
            let (lb, rb) = (lm.left_bound, lm.right_bound);
            let mut op1 = None;
            match (lb, rb) {
                (None, Some(rb)) => {
                    self.insert_edge_into_ael(rb, None);
                    self.set_winding_count(rb);
                    if self.is_contributing(rb) {
                        let pt = self.edges[rb].bot;
                        op1 = Some(self.add_out_pt(rb, pt));
                    }
                }
                (Some(lb), None) => {
                    self.insert_edge_into_ael(lb, None);
                    self.set_winding_count(lb);
                    if self.is_contributing(lb) {
                        let pt = self.edges[lb].bot;
                        op1 = Some(self.add_out_pt(lb, pt));
                    }
                    self.scanbeam.insert(self.edges[lb].top.y);
                }
                (Some(lb), Some(rb)) => {
                    self.insert_edge_into_ael(lb, None);
                    self.insert_edge_into_ael(rb, Some(lb));
                    self.set_winding_count(lb);
                    self.edges[rb].wind_cnt = self.edges[lb].wind_cnt;
                    self.edges[rb].wind_cnt2 = self.edges[lb].wind_cnt2;
                    if self.is_contributing(lb) {
                        let pt = self.edges[lb].bot;
                        op1 = Some(self.add_local_min_poly(lb, rb, pt));
                    }
                    self.scanbeam.insert(self.edges[lb].top.y);
                }
                (None, None) => continue,
            }

            if let Some(rb) = rb {
                if self.edges[rb].is_horizontal() {
                    self.add_edge_to_sel(rb);
                    if let Some(next) = self.edges[rb].next_in_lml {
                        self.scanbeam.insert(self.edges[next].top.y);
                    }
                } else {
                    self.scanbeam.insert(self.edges[rb].top.y);
                }
            }

            let (Some(lb), Some(rb)) = (lb, rb) else {
                continue;
            };
            let Some(op1) = op1 else {
                self.intersect_edges_between_bounds(lb, rb);
                continue;
            };

            // A horizontal right bound overlapping a ghost join turns it into
            // a real join.
            if self.edges[rb].is_horizontal() && self.edges[rb].wind_delta != 0 {
                let (rb_bot, rb_top) = (self.edges[rb].bot.x, self.edges[rb].top.x);
                let ghosts = self.ghost_joins.clone();
                for ghost in ghosts {
                    let ghost_x = self.out_pts[ghost.out_pt].pt.x;
                    if horz_segments_overlap(ghost_x, ghost.off_pt.x, rb_bot, rb_top) {
                        self.add_join(ghost.out_pt, op1, ghost.off_pt);
                    }
                }
            }

            if let Some(prev) = self.edges[lb].prev_in_ael {
                let (l, p) = (&self.edges[lb], &self.edges[prev]);
                if l.out_idx.is_ring()
                    && p.curr.x == l.bot.x
                    && p.out_idx.is_ring()
                    && slopes_equal4(&p.bot, &p.top, &l.curr, &l.top)
                    && l.wind_delta != 0
                    && p.wind_delta != 0
                {
                    let (bot, top) = (l.bot, l.top);
                    let op2 = self.add_out_pt(prev, bot);
                    self.add_join(op1, op2, top);
                }
            }

            if self.edges[lb].next_in_ael != Some(rb) {
                if let Some(prev) = self.edges[rb].prev_in_ael {
                    let (r, p) = (&self.edges[rb], &self.edges[prev]);
                    if r.out_idx.is_ring()
                        && p.out_idx.is_ring()
                        && slopes_equal4(&p.curr, &p.top, &r.curr, &r.top)
                        && r.wind_delta != 0
                        && p.wind_delta != 0
                    {
                        let (bot, top) = (r.bot, r.top);
                        let op2 = self.add_out_pt(prev, bot);
                        self.add_join(op1, op2, top);
                    }
                }
                self.intersect_edges_between_bounds(lb, rb);
            }
        }
    }

    /// Crosses `rb` over every edge lying between the two new bounds.
    fn intersect_edges_between_bounds(&mut self, lb: EdgeId, rb: EdgeId) {
        let pt = self.edges[lb].curr;
        let mut e = self.edges[lb].next_in_ael;
        while let Some(cur) = e {
            if cur == rb {
                break;
            }
            // `rb` lies right of `cur` above the crossing.
            self.intersect_edges(rb, cur, pt);
            e = self.edges[cur].next_in_ael;
        }
    }

    pub(super) fn process_horizontals(&mut self) -> Result<()> {
        while let Some(horz) = self.pop_edge_from_sel() {
            self.process_horizontal(horz)?;
        }
        Ok(())
    }

    #[allow(clippy::float_cmp)]
    fn process_edges_at_top_of_scanbeam(&mut self, top_y: f64) -> Result<()> {
        let mut cursor = self.active_edges;
        while let Some(mut e) = cursor {
            // Maxima are treated like bent horizontals, unless they end on a
            // real horizontal.
            let mut is_maxima_edge = self.is_maxima(e, top_y);
            if is_maxima_edge {
                if let Some(pair) = self.maxima_pair_ex(e) {
                    is_maxima_edge = !self.edges[pair].is_horizontal();
                }
            }

            if is_maxima_edge {
                if self.options.strictly_simple {
                    self.maxima.push(self.edges[e].top.x);
                }
                let prev = self.edges[e].prev_in_ael;
                self.do_maxima(e)?;
                cursor = match prev {
                    Some(p) => self.edges[p].next_in_ael,
                    None => self.active_edges,
                };
                continue;
            }

            let next_is_horizontal = self.edges[e]
                .next_in_lml
                .is_some_and(|next| self.edges[next].is_horizontal());
            if self.is_intermediate(e, top_y) && next_is_horizontal {
                e = self.update_edge_into_ael(e)?;
                if self.edges[e].out_idx.is_ring() {
                    let bot = self.edges[e].bot;
                    self.add_out_pt(e, bot);
                }
                self.add_edge_to_sel(e);
            } else {
                let edge = &mut self.edges[e];
                edge.curr = Point2::new(edge.top_x(top_y), top_y);
            }

            // Touching edges both get a vertex here so the rings can be
            // split apart later.
            if self.options.strictly_simple {
                if let Some(prev) = self.edges[e].prev_in_ael {
                    let (c, p) = (&self.edges[e], &self.edges[prev]);
                    if c.out_idx.is_ring()
                        && c.wind_delta != 0
                        && p.out_idx.is_ring()
                        && p.curr.x == c.curr.x
                        && p.wind_delta != 0
                    {
                        let pt = c.curr;
                        let op = self.add_out_pt(prev, pt);
                        let op2 = self.add_out_pt(e, pt);
                        self.add_join(op, op2, pt);
                    }
                }
            }
            cursor = self.edges[e].next_in_ael;
        }

        self.maxima.sort();
        self.process_horizontals()?;
        self.maxima.clear();

        let mut cursor = self.active_edges;
        while let Some(mut e) = cursor {
            if self.is_intermediate(e, top_y) {
                let op = if self.edges[e].out_idx.is_ring() {
                    let top = self.edges[e].top;
                    Some(self.add_out_pt(e, top))
                } else {
                    None
                };
                e = self.update_edge_into_ael(e)?;
                if let Some(op) = op {
                    self.join_promoted_edge(e, op);
                }
            }
            cursor = self.edges[e].next_in_ael;
        }
        Ok(())
    }

    /// After promoting `e`, joins it to a collinear contributing neighbour
    /// that starts at the same vertex.
    #[allow(clippy::float_cmp)]
    fn join_promoted_edge(&mut self, e: EdgeId, op: OutPtId) {
        let neighbours = [self.edges[e].prev_in_ael, self.edges[e].next_in_ael];
        for other in neighbours.into_iter().flatten() {
            let (c, n) = (&self.edges[e], &self.edges[other]);
            if n.curr == c.bot
                && n.out_idx.is_ring()
                && n.curr.y > n.top.y
                && slopes_equal4(&c.curr, &c.top, &n.curr, &n.top)
                && c.wind_delta != 0
                && n.wind_delta != 0
            {
                let (bot, top) = (c.bot, c.top);
                let op2 = self.add_out_pt(other, bot);
                self.add_join(op, op2, top);
                return;
            }
        }
    }

    fn do_maxima(&mut self, e: EdgeId) -> Result<()> {
        let Some(max_pair) = self.maxima_pair_ex(e) else {
            if self.edges[e].out_idx.is_ring() {
                let top = self.edges[e].top;
                self.add_out_pt(e, top);
            }
            self.delete_from_ael(e);
            return Ok(());
        };

        let top = self.edges[e].top;
        let mut next = self.edges[e].next_in_ael;
        while let Some(n) = next {
            if n == max_pair {
                break;
            }
            self.intersect_edges(e, n, top);
            self.swap_positions_in_ael(e, n);
            next = self.edges[e].next_in_ael;
        }

        let (e_idx, pair_idx) = (self.edges[e].out_idx, self.edges[max_pair].out_idx);
        if e_idx == OutIdx::Unassigned && pair_idx == OutIdx::Unassigned {
            self.delete_from_ael(e);
            self.delete_from_ael(max_pair);
        } else if e_idx.is_ring() && pair_idx.is_ring() {
            self.add_local_max_poly(e, max_pair, top);
            self.delete_from_ael(e);
            self.delete_from_ael(max_pair);
        } else if self.edges[e].wind_delta == 0 {
            for edge in [e, max_pair] {
                if self.edges[edge].out_idx.is_ring() {
                    self.add_out_pt(edge, top);
                    self.edges[edge].out_idx = OutIdx::Unassigned;
                }
                self.delete_from_ael(edge);
            }
        } else {
            return Err(AlgorithmError::MaximaPairing.into());
        }
        Ok(())
    }

    #[allow(clippy::float_cmp)]
    pub(super) fn is_maxima(&self, e: EdgeId, y: f64) -> bool {
        self.edges[e].top.y == y && self.edges[e].next_in_lml.is_none()
    }

    #[allow(clippy::float_cmp)]
    pub(super) fn is_intermediate(&self, e: EdgeId, y: f64) -> bool {
        self.edges[e].top.y == y && self.edges[e].next_in_lml.is_some()
    }

    /// The edge sharing `e`'s top vertex where both bounds end.
    pub(super) fn maxima_pair(&self, e: EdgeId) -> Option<EdgeId> {
        let edge = &self.edges[e];
        [edge.next, edge.prev].into_iter().find(|&other| {
            let o = &self.edges[other];
            o.top == edge.top && o.next_in_lml.is_none()
        })
    }

    /// Like [`Clipper::maxima_pair`] but ignores pairs that are not in the
    /// AEL or are skip edges.
    pub(super) fn maxima_pair_ex(&self, e: EdgeId) -> Option<EdgeId> {
        let pair = self.maxima_pair(e)?;
        let p = &self.edges[pair];
        let detached = p.next_in_ael == p.prev_in_ael && !p.is_horizontal();
        if p.out_idx == OutIdx::Skip || detached {
            None
        } else {
            Some(pair)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ]
    }

    #[test]
    fn empty_engine_reports_nothing_to_clip() {
        let mut clipper = Clipper::new();
        assert_eq!(clipper.try_execute().unwrap_err(), ClipError::NothingToClip);
        assert!(clipper.execute().is_none());
    }

    #[test]
    fn locked_engine_returns_none() {
        let mut clipper = Clipper::new();
        assert!(clipper.add_path(&square(0.0, 0.0, 10.0), PolyType::Subject));
        clipper.execute_locked = true;
        assert!(clipper.execute().is_none());
        assert_eq!(clipper.try_execute().unwrap_err(), ClipError::Locked);
        clipper.execute_locked = false;
        assert!(clipper.execute().is_some());
    }

    #[test]
    fn add_paths_reports_any_accepted() {
        let mut clipper = Clipper::new();
        let degenerate = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        assert!(!clipper.add_paths(&[degenerate.clone()], PolyType::Subject));
        assert!(clipper.add_paths(&[degenerate, square(0.0, 0.0, 1.0)], PolyType::Clip));
        assert_eq!(clipper.minima.len(), 1);
    }

    #[test]
    fn clear_forgets_paths() {
        let mut clipper = Clipper::new();
        assert!(clipper.add_path(&square(0.0, 0.0, 10.0), PolyType::Subject));
        clipper.clear();
        assert!(clipper.edges.is_empty());
        assert!(clipper.minima.is_empty());
        assert!(clipper.execute().is_none());
    }

    #[test]
    fn reset_orders_minima_by_descending_y() {
        let mut clipper = Clipper::new();
        assert!(clipper.add_path(&square(0.0, 0.0, 1.0), PolyType::Subject));
        assert!(clipper.add_path(&square(0.0, 5.0, 1.0), PolyType::Subject));
        assert!(clipper.add_path(&square(0.0, 2.0, 1.0), PolyType::Clip));
        clipper.reset();
        let ys: Vec<f64> = clipper.minima.iter().map(|lm| lm.y).collect();
        assert_eq!(ys, vec![6.0, 3.0, 1.0]);
        assert_eq!(clipper.scanbeam.pop(), Some(6.0));
    }

    #[test]
    fn failed_run_discards_partial_output() {
        // Two minima at (12, 12) and (6, 7) whose bounds meet at (3, 0).
        let ring = [
            Point2::new(0.0, 10.0),
            Point2::new(3.0, 0.0),
            Point2::new(6.0, 7.0),
            Point2::new(9.0, 0.0),
            Point2::new(12.0, 12.0),
        ];
        let mut clipper = Clipper::new();
        assert!(clipper.add_path(&ring, PolyType::Subject));

        // Retag the first minimum's bounds so only the second one opens a
        // ring, leaving the maximum at (3, 0) with an unpaired output.
        let corner = Point2::new(12.0, 12.0);
        let retag = |clipper: &mut Clipper, poly_type: PolyType| {
            for edge in clipper.edges.values_mut().filter(|e| e.bot == corner) {
                edge.poly_type = poly_type;
            }
        };
        retag(&mut clipper, PolyType::Clip);

        assert!(clipper.execute().is_none());
        assert_eq!(
            clipper.try_execute().unwrap_err(),
            ClipError::Algorithm(AlgorithmError::MaximaPairing)
        );
        assert!(clipper.out_recs.is_empty());
        assert!(clipper.out_pts.is_empty());
        assert!(clipper.joins.is_empty());
        assert!(clipper.ghost_joins.is_empty());
        assert!(clipper.active_edges.is_none());
        assert!(!clipper.execute_locked);

        retag(&mut clipper, PolyType::Subject);
        let tree = clipper.execute().unwrap();
        assert_eq!(tree.roots().len(), 1);
        let contour = tree.node(tree.roots()[0]).unwrap().contour();
        let area = crate::math::polygon_2d::signed_area_2d(contour);
        assert!((area - 78.0).abs() < 1e-9);
    }

    #[test]
    fn options_round_trip() {
        let mut clipper = Clipper::with_options(ClipperOptions {
            strictly_simple: false,
            ..ClipperOptions::default()
        });
        assert!(!clipper.options().strictly_simple);
        clipper.set_options(ClipperOptions::default());
        assert!(clipper.options().strictly_simple);
    }
}
