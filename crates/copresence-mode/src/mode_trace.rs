//! [`ModeTrace`]: an ordered sequence of modes with per-entry likelihoods,
//! describing an executed or predicted trajectory through the mode space.

use std::collections::HashMap;

use crate::error::ModeError;
use crate::mode::Mode;

/// One entry of a [`ModeTrace`]: a mode and the likelihood assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeTraceEntry {
    pub mode: Mode,
    pub likelihood: f64,
}

/// An ordered sequence of `(mode, likelihood)` entries.
///
/// The trace's overall likelihood is, by default, the product of its entry
/// likelihoods; [`merge`] is the one operation that assigns an overall
/// likelihood that is not simply that product (see its documentation).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeTrace {
    entries: Vec<ModeTraceEntry>,
    overall_likelihood: Option<f64>,
}

impl ModeTrace {
    /// An empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// True when the trace has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `mode` at the end with likelihood `1.0`.
    pub fn push_back(self, mode: Mode) -> Self {
        self.push_back_with(mode, 1.0)
    }

    /// Append `mode` at the end with the given likelihood.
    pub fn push_back_with(mut self, mode: Mode, likelihood: f64) -> Self {
        self.entries.push(ModeTraceEntry { mode, likelihood });
        self.overall_likelihood = None;
        self
    }

    /// Prepend `mode` at the start with likelihood `1.0`.
    pub fn push_front(self, mode: Mode) -> Self {
        self.push_front_with(mode, 1.0)
    }

    /// Prepend `mode` at the start with the given likelihood.
    pub fn push_front_with(mut self, mode: Mode, likelihood: f64) -> Self {
        self.entries.insert(0, ModeTraceEntry { mode, likelihood });
        self.overall_likelihood = None;
        self
    }

    /// The entry at `index`.
    pub fn at(&self, index: usize) -> &ModeTraceEntry {
        &self.entries[index]
    }

    /// The first mode of the trace, if any.
    pub fn starting_mode(&self) -> Option<&Mode> {
        self.entries.first().map(|e| &e.mode)
    }

    /// The last mode of the trace, if any.
    pub fn ending_mode(&self) -> Option<&Mode> {
        self.entries.last().map(|e| &e.mode)
    }

    /// The overall trace likelihood: the product of entry likelihoods,
    /// unless [`merge`] has assigned a different value.
    pub fn likelihood(&self) -> f64 {
        self.overall_likelihood.unwrap_or_else(|| self.entries.iter().map(|e| e.likelihood).product())
    }

    /// True when `mode` appears anywhere in the trace.
    pub fn contains(&self, mode: &Mode) -> bool {
        self.entries.iter().any(|e| &e.mode == mode)
    }

    /// True when any mode appears more than once.
    pub fn has_looped(&self) -> bool {
        for i in 0..self.entries.len() {
            for j in (i + 1)..self.entries.len() {
                if self.entries[i].mode == self.entries[j].mode {
                    return true;
                }
            }
        }
        false
    }

    /// The index of the first occurrence of `mode`, or `-1` if absent.
    pub fn forward_index(&self, mode: &Mode) -> isize {
        self.entries.iter().position(|e| &e.mode == mode).map(|i| i as isize).unwrap_or(-1)
    }

    /// The index of the last occurrence of `mode`, or `-1` if absent.
    pub fn backward_index(&self, mode: &Mode) -> isize {
        self.entries.iter().rposition(|e| &e.mode == mode).map(|i| i as isize).unwrap_or(-1)
    }

    /// Truncate the trace to the sub-trace running from the first
    /// occurrence of `a` to the last occurrence of `b`.
    pub fn reduce_between(&mut self, a: &Mode, b: &Mode) -> Result<(), ModeError> {
        let start = self.forward_index(a);
        if start < 0 {
            return Err(ModeError::ModeNotInTrace);
        }
        let end = self.backward_index(b);
        if end < 0 {
            return Err(ModeError::ModeNotInTrace);
        }
        if start > end {
            return Err(ModeError::UnorderedRange);
        }
        self.entries = self.entries[start as usize..=end as usize].to_vec();
        self.overall_likelihood = None;
        Ok(())
    }

    /// Predict the distribution of the mode most likely to follow this
    /// trace, by pattern matching against its own history.
    ///
    /// For each suffix length `k` from the longest feasible down to `1`,
    /// find every earlier position whose length-`k` window equals the
    /// trace's own trailing `k` modes, and collect the mode that followed
    /// each such window as a candidate. The first `k` with at least one
    /// candidate defines the prediction: probabilities are the candidates'
    /// relative frequencies. Returns an empty map when no match exists at
    /// any suffix length.
    pub fn next_modes(&self) -> HashMap<Mode, f64> {
        let n = self.entries.len();
        if n < 2 {
            return HashMap::new();
        }
        let modes: Vec<&Mode> = self.entries.iter().map(|e| &e.mode).collect();

        for k in (1..n).rev() {
            let suffix = &modes[n - k..n];
            let mut candidates: Vec<&Mode> = Vec::new();
            for i in 0..=(n - 1 - k) {
                if &modes[i..i + k] == suffix {
                    candidates.push(modes[i + k]);
                }
            }
            if !candidates.is_empty() {
                let mut counts: HashMap<Mode, usize> = HashMap::new();
                for c in &candidates {
                    *counts.entry((*c).clone()).or_insert(0) += 1;
                }
                let total = candidates.len() as f64;
                return counts.into_iter().map(|(m, c)| (m, c as f64 / total)).collect();
            }
        }
        HashMap::new()
    }
}

/// The length of the longest suffix of `a` that equals a prefix of `b`,
/// comparing modes only (ignoring likelihoods).
fn overlap_length(a: &ModeTrace, b: &ModeTrace) -> usize {
    let max_k = a.entries.len().min(b.entries.len());
    for k in (1..=max_k).rev() {
        let a_suffix = &a.entries[a.entries.len() - k..];
        let b_prefix = &b.entries[..k];
        if a_suffix.iter().map(|e| &e.mode).eq(b_prefix.iter().map(|e| &e.mode)) {
            return k;
        }
    }
    0
}

/// Align `a` and `b` on the longest overlap where the suffix of `a` equals
/// the prefix of `b`, falling back to concatenation when there is no
/// overlap.
///
/// The overlapping entries (if any) take the minimum of the two traces'
/// likelihoods at each aligned position. When there is no overlap, the
/// merged trace's overall likelihood is `b`'s own likelihood: `a` is
/// historical context that the merge treats as already resolved, while `b`
/// is the continuation whose uncertainty still applies.
pub fn merge(a: &ModeTrace, b: &ModeTrace) -> ModeTrace {
    let k = overlap_length(a, b);

    let mut entries: Vec<ModeTraceEntry> = a.entries[..a.entries.len() - k].to_vec();
    for i in 0..k {
        let a_entry = &a.entries[a.entries.len() - k + i];
        let b_entry = &b.entries[i];
        entries.push(ModeTraceEntry { mode: b_entry.mode.clone(), likelihood: a_entry.likelihood.min(b_entry.likelihood) });
    }
    entries.extend(b.entries[k..].iter().cloned());

    let overall_likelihood = if k == 0 { b.likelihood() } else { entries.iter().map(|e| e.likelihood).product() };

    ModeTrace { entries, overall_likelihood: Some(overall_likelihood) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robot_mode(value: &str) -> Mode {
        Mode::single("robot", value)
    }

    #[test]
    fn creation() {
        let (first, second, third) = (robot_mode("first"), robot_mode("second"), robot_mode("third"));

        let trace = ModeTrace::new().push_front(second.clone()).push_back_with(first.clone(), 1.0).push_back_with(second.clone(), 1.0).push_front(third.clone());
        assert_eq!(trace.size(), 4);

        assert!(trace.contains(&first));
        assert!(trace.contains(&second));
        assert!(trace.contains(&third));
        assert!(!trace.contains(&robot_mode("fourth")));
        assert_eq!(trace.at(0).mode, third);
        assert_eq!(trace.at(1).mode, second);
        assert_eq!(trace.at(2).mode, first);
        assert_eq!(trace.at(3).mode, second);
        assert_eq!(trace.likelihood(), 1.0);

        let trace2 = trace.clone();
        assert_eq!(trace2, trace);
    }

    #[test]
    fn compare() {
        let (first, second, third) = (robot_mode("first"), robot_mode("second"), robot_mode("third"));

        let trace1 = ModeTrace::new().push_back_with(first.clone(), 1.0).push_back_with(second.clone(), 1.0).push_back_with(third.clone(), 0.5);
        let trace2 = ModeTrace::new().push_back_with(first.clone(), 1.0).push_back_with(second.clone(), 1.0).push_back_with(third.clone(), 1.0);
        let trace3 = ModeTrace::new().push_back_with(first.clone(), 1.0).push_back_with(second.clone(), 1.0).push_back_with(third.clone(), 1.0);
        let trace4 = ModeTrace::new().push_back_with(second.clone(), 1.0).push_back_with(first.clone(), 1.0).push_back_with(third.clone(), 0.5);

        assert_ne!(trace1, trace2);
        assert_ne!(trace1, trace4);
        assert_eq!(trace2, trace3);
    }

    #[test]
    fn has_looped() {
        let (first, second, third) = (robot_mode("first"), robot_mode("second"), robot_mode("third"));

        assert!(!ModeTrace::new().has_looped());
        assert!(!ModeTrace::new().push_back(first.clone()).has_looped());
        assert!(!ModeTrace::new().push_back(first.clone()).push_back(second.clone()).has_looped());
        assert!(ModeTrace::new().push_back(first.clone()).push_back(first.clone()).has_looped());
        assert!(ModeTrace::new().push_back(first.clone()).push_back(second.clone()).push_back(first.clone()).has_looped());
        assert!(ModeTrace::new().push_back(first.clone()).push_back(second.clone()).push_back(third.clone()).push_back(second.clone()).has_looped());
        assert!(!ModeTrace::new().push_back(first.clone()).push_back(second).push_back(first.clone()).push_back(third).has_looped());
    }

    #[test]
    fn merge_with_no_overlap() {
        let (first, second, third, fourth) = (robot_mode("first"), robot_mode("second"), robot_mode("third"), robot_mode("fourth"));

        let trace1 = ModeTrace::new().push_back_with(first, 1.0).push_back_with(second.clone(), 1.0).push_back_with(third, 0.5);
        let trace2 = ModeTrace::new().push_back_with(second, 1.0).push_back_with(fourth, 0.8);

        let merge12 = merge(&trace1, &trace2);
        assert_eq!(merge12.likelihood(), 0.8);
        assert_eq!(merge12.size(), 5);

        let merge21 = merge(&trace2, &trace1);
        assert_eq!(merge21.likelihood(), 0.5);
        assert_eq!(merge21.size(), 5);
    }

    #[test]
    fn indexes() {
        let (first, second, third, fourth, fifth) = (robot_mode("first"), robot_mode("second"), robot_mode("third"), robot_mode("fourth"), robot_mode("fifth"));

        let trace = ModeTrace::new().push_back(first.clone()).push_back(second.clone()).push_back(third.clone()).push_back(second.clone()).push_back(fifth);

        assert_eq!(trace.forward_index(&fourth), -1);
        assert_eq!(trace.backward_index(&fourth), -1);
        assert_eq!(trace.forward_index(&third), 2);
        assert_eq!(trace.backward_index(&third), 2);
        assert_eq!(trace.forward_index(&first), 0);
        assert_eq!(trace.backward_index(&first), 0);
        assert_eq!(trace.forward_index(&second), 1);
        assert_eq!(trace.backward_index(&second), 3);
    }

    #[test]
    fn reduce_between() {
        let (first, second, third, fourth) = (robot_mode("first"), robot_mode("second"), robot_mode("third"), robot_mode("fourth"));

        let base = ModeTrace::new().push_back(first.clone()).push_back(second.clone()).push_back(third.clone());

        let mut trace1 = base.clone();
        assert!(trace1.reduce_between(&first, &fourth).is_err());
        assert!(trace1.reduce_between(&fourth, &third).is_err());
        assert!(trace1.reduce_between(&second, &first).is_err());

        trace1.reduce_between(&first, &third).unwrap();
        assert_eq!(trace1.size(), 3);
        trace1.reduce_between(&first, &first).unwrap();
        assert_eq!(trace1.size(), 1);
        assert_eq!(trace1.ending_mode(), Some(&first));

        let mut trace2 = base.clone();
        trace2.reduce_between(&first, &second).unwrap();
        assert_eq!(trace2.size(), 2);
        assert_eq!(trace2.starting_mode(), Some(&first));
        assert_eq!(trace2.ending_mode(), Some(&second));

        let mut trace3 = base;
        trace3.reduce_between(&second, &third).unwrap();
        assert_eq!(trace3.starting_mode(), Some(&second));
        assert_eq!(trace3.ending_mode(), Some(&third));
        assert_eq!(trace3.size(), 2);
    }

    #[test]
    fn next_modes_with_no_predecessor_match() {
        let (a, b, c, d) = (robot_mode("a"), robot_mode("b"), robot_mode("c"), robot_mode("d"));
        let next1 = ModeTrace::new().push_back(a).push_back(b).push_back(c).push_back(robot_mode("a")).push_back(robot_mode("b")).push_back(d).next_modes();
        assert_eq!(next1.len(), 0);
    }

    #[test]
    fn next_modes_single_candidate() {
        let (a, b, c, d) = (robot_mode("a"), robot_mode("b"), robot_mode("c"), robot_mode("d"));
        let next2 = ModeTrace::new()
            .push_back(a.clone()).push_back(b.clone()).push_back(c.clone()).push_back(a.clone()).push_back(b.clone())
            .push_back(d.clone()).push_back(a.clone()).push_back(c.clone()).push_back(b.clone()).push_back(c.clone())
            .push_back(a.clone()).push_back(b.clone()).push_back(c.clone()).push_back(d).push_back(a).push_back(c)
            .next_modes();
        assert_eq!(next2.len(), 1);
        assert_eq!(next2.get(&b), Some(&1.0));
    }

    #[test]
    fn next_modes_two_candidates() {
        let (a, b, c, d) = (robot_mode("a"), robot_mode("b"), robot_mode("c"), robot_mode("d"));
        let next4 = ModeTrace::new()
            .push_back(a.clone()).push_back(b.clone()).push_back(d.clone()).push_back(a.clone()).push_back(b.clone())
            .push_back(c.clone()).push_back(a.clone()).push_back(b.clone()).push_back(c.clone()).push_back(d.clone())
            .push_back(a.clone()).push_back(b.clone()).push_back(a.clone()).push_back(d.clone()).push_back(b).push_back(c)
            .next_modes();
        assert_eq!(next4.len(), 2);
        assert_eq!(next4.get(&a), Some(&0.5));
        assert_eq!(next4.get(&d), Some(&0.5));
    }

    #[test]
    fn next_modes_three_way_split() {
        let (a, b, c, d) = (robot_mode("a"), robot_mode("b"), robot_mode("c"), robot_mode("d"));
        let trace5 = ModeTrace::new()
            .push_back(d.clone()).push_back(c.clone()).push_back(b.clone()).push_back(a.clone()).push_back(d.clone())
            .push_back(c.clone()).push_back(b.clone()).push_back(d.clone()).push_back(c.clone()).push_back(b.clone())
            .push_back(d.clone()).push_back(c.clone()).push_back(b.clone()).push_back(c.clone()).push_back(d.clone())
            .push_back(c.clone()).push_back(b.clone());
        let next5 = trace5.next_modes();
        assert_eq!(next5.len(), 3);
        assert_eq!(next5.get(&a), Some(&0.25));
        assert_eq!(next5.get(&c), Some(&0.25));
        assert_eq!(next5.get(&d), Some(&0.5));
    }
}
