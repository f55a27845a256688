use std::time::Instant;

use tracing::debug;

use super::common::char_offset;
use super::{Bisect, Differ};
use crate::TextDiffer;

/// Sentinel for diagonals the search has not reached yet
const UNREACHED: isize = -1;

/// Myers' O(ND) bisection: walks the edit graph from both ends until the two
/// frontiers overlap, then diffs the halves on either side of that middle
/// snake independently.
pub(crate) struct MyersDiffer<'a> {
    differ: &'a Differ,
}

impl<'a> MyersDiffer<'a> {
    /// Create a new MyersDiffer from a base Differ instance
    pub(crate) fn new(differ: &'a Differ) -> Self {
        Self { differ }
    }

    /// Diff both halves around the split point `(x, y)`, given in chars
    fn split(
        &self,
        old: &str,
        new: &str,
        x: usize,
        y: usize,
        deadline: Option<Instant>,
    ) -> Vec<TextDiffer> {
        let x = char_offset(old, x).unwrap_or(old.len());
        let y = char_offset(new, y).unwrap_or(new.len());

        let mut diffs = self
            .differ
            .diff_main(&old[..x], &new[..y], false, deadline);
        diffs.extend(
            self.differ
                .diff_main(&old[x..], &new[y..], false, deadline),
        );
        diffs
    }
}

impl Bisect for MyersDiffer<'_> {
    fn bisect(&self, old: &str, new: &str, deadline: Option<Instant>) -> Vec<TextDiffer> {
        let a: Vec<char> = old.chars().collect();
        let b: Vec<char> = new.chars().collect();
        let n = a.len() as isize;
        let m = b.len() as isize;

        let max_d = (n + m + 1) / 2;
        let v_offset = max_d;
        // one spare slot on each side so `k ± 1` never leaves the vector
        let v_length = 2 * max_d + 2;
        let mut v1 = vec![UNREACHED; v_length as usize];
        let mut v2 = vec![UNREACHED; v_length as usize];
        v1[(v_offset + 1) as usize] = 0;
        v2[(v_offset + 1) as usize] = 0;

        let delta = n - m;
        // With an odd delta the forward path will collide with the reverse path
        let front = delta % 2 != 0;

        // Offsets for the start and end of the k loops; they prune diagonals
        // that have run off the edge of the graph.
        let mut k1_start = 0;
        let mut k1_end = 0;
        let mut k2_start = 0;
        let mut k2_end = 0;

        for d in 0..max_d {
            if deadline.is_some_and(|deadline| Instant::now() > deadline) {
                debug!(d, "bisection deadline reached, falling back to replace");
                break;
            }

            // forward path
            let mut k1 = -d + k1_start;
            while k1 <= d - k1_end {
                let k1_offset = v_offset + k1;
                let mut x1 = if k1 == -d
                    || (k1 != d && v1[(k1_offset - 1) as usize] < v1[(k1_offset + 1) as usize])
                {
                    v1[(k1_offset + 1) as usize]
                } else {
                    v1[(k1_offset - 1) as usize] + 1
                };
                let mut y1 = x1 - k1;
                while x1 < n && y1 < m && a[x1 as usize] == b[y1 as usize] {
                    x1 += 1;
                    y1 += 1;
                }
                v1[k1_offset as usize] = x1;

                if x1 > n {
                    // ran off the right of the graph
                    k1_end += 2;
                } else if y1 > m {
                    // ran off the bottom of the graph
                    k1_start += 2;
                } else if front {
                    let k2_offset = v_offset + delta - k1;
                    if (0..v_length).contains(&k2_offset) && v2[k2_offset as usize] != UNREACHED
                    {
                        // mirror x2 onto the top-left coordinate system
                        let x2 = n - v2[k2_offset as usize];
                        if x1 >= x2 {
                            return self.split(old, new, x1 as usize, y1 as usize, deadline);
                        }
                    }
                }
                k1 += 2;
            }

            // reverse path
            let mut k2 = -d + k2_start;
            while k2 <= d - k2_end {
                let k2_offset = v_offset + k2;
                let mut x2 = if k2 == -d
                    || (k2 != d && v2[(k2_offset - 1) as usize] < v2[(k2_offset + 1) as usize])
                {
                    v2[(k2_offset + 1) as usize]
                } else {
                    v2[(k2_offset - 1) as usize] + 1
                };
                let mut y2 = x2 - k2;
                while x2 < n
                    && y2 < m
                    && a[(n - x2 - 1) as usize] == b[(m - y2 - 1) as usize]
                {
                    x2 += 1;
                    y2 += 1;
                }
                v2[k2_offset as usize] = x2;

                if x2 > n {
                    k2_end += 2;
                } else if y2 > m {
                    k2_start += 2;
                } else if !front {
                    let k1_offset = v_offset + delta - k2;
                    if (0..v_length).contains(&k1_offset) && v1[k1_offset as usize] != UNREACHED
                    {
                        let x1 = v1[k1_offset as usize];
                        let y1 = v_offset + x1 - k1_offset;
                        if x1 >= n - x2 {
                            return self.split(old, new, x1 as usize, y1 as usize, deadline);
                        }
                    }
                }
                k2 += 2;
            }
        }

        // Out of time, or the texts share nothing
        vec![TextDiffer::delete(old), TextDiffer::insert(new)]
    }
}
