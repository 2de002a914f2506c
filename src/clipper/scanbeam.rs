/// Duplicate-free set of scanline Y values, popped largest first.
///
/// The sweep advances from large Y toward small Y, so the next scanbeam is
/// always the greatest value still queued.
#[derive(Debug, Default, Clone)]
pub(crate) struct Scanbeam {
    // Ascending; the next scanline sits at the end.
    ys: Vec<f64>,
}

impl Scanbeam {
    pub fn insert(&mut self, y: f64) {
        // Folds -0.0 into 0.0 so total ordering cannot split one scanline.
        let y = y + 0.0;
        if let Err(pos) = self.ys.binary_search_by(|probe| probe.total_cmp(&y)) {
            self.ys.insert(pos, y);
        }
    }

    pub fn pop(&mut self) -> Option<f64> {
        self.ys.pop()
    }

    pub fn clear(&mut self) {
        self.ys.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ys.len()
    }
}

/// X positions of maxima met while advancing the current scanbeam.
#[derive(Debug, Default, Clone)]
pub(crate) struct MaximaList {
    xs: Vec<f64>,
}

impl MaximaList {
    pub fn push(&mut self, x: f64) {
        self.xs.push(x);
    }

    pub fn sort(&mut self) {
        self.xs.sort_by(f64::total_cmp);
    }

    pub fn clear(&mut self) {
        self.xs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Sorted view; valid after [`MaximaList::sort`].
    pub fn as_slice(&self) -> &[f64] {
        &self.xs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanbeam_pops_descending_without_duplicates() {
        let mut sb = Scanbeam::default();
        for y in [3.0, 10.0, 3.0, -1.0, 10.0, 7.5] {
            sb.insert(y);
        }
        assert_eq!(sb.len(), 4);
        let popped: Vec<f64> = std::iter::from_fn(|| sb.pop()).collect();
        assert_eq!(popped, vec![10.0, 7.5, 3.0, -1.0]);
    }

    #[test]
    fn scanbeam_accepts_values_after_pop() {
        let mut sb = Scanbeam::default();
        sb.insert(5.0);
        assert_eq!(sb.pop(), Some(5.0));
        sb.insert(2.0);
        sb.insert(4.0);
        assert_eq!(sb.pop(), Some(4.0));
        sb.clear();
        assert_eq!(sb.pop(), None);
    }

    #[test]
    fn maxima_sorted_ascending() {
        let mut m = MaximaList::default();
        m.push(4.0);
        m.push(-2.0);
        m.push(1.0);
        m.sort();
        assert_eq!(m.as_slice(), &[-2.0, 1.0, 4.0]);
        m.clear();
        assert!(m.is_empty());
    }
}
