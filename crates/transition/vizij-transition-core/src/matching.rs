//! Pluggable assignment of start classes to end classes.
//!
//! The linker scores every type-compatible pair and hands the candidates to a
//! [`MatchingStrategy`]. [`GreedyMatching`] is the product behavior: walk the
//! pairs by descending `COMPARE_SUM` (ties in enumeration order) and take a
//! pair when both sides are still free. [`MaxWeightMatching`] maximizes the
//! total sum instead and exists so both can be run against the same fixtures.

use serde::{Deserialize, Serialize};

/// A scored (start class, end class) pair, by index into the templates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub start: usize,
    pub end: usize,
    pub sum: f64,
}

pub trait MatchingStrategy {
    /// Indices into `candidates` of the accepted pairs. Accepted pairs never
    /// share a start or an end, and all have `sum >= threshold`.
    fn assign(&self, candidates: &[Candidate], threshold: f64) -> Vec<usize>;
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchingKind {
    #[default]
    Greedy,
    MaxWeight,
}

impl MatchingKind {
    pub fn strategy(self) -> Box<dyn MatchingStrategy> {
        match self {
            MatchingKind::Greedy => Box::new(GreedyMatching),
            MatchingKind::MaxWeight => Box::new(MaxWeightMatching),
        }
    }
}

/// Candidate indices by descending sum; the sort is stable so ties keep enumeration order.
pub fn rank(candidates: &[Candidate]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| candidates[b].sum.total_cmp(&candidates[a].sum));
    order
}

#[derive(Copy, Clone, Debug, Default)]
pub struct GreedyMatching;

impl MatchingStrategy for GreedyMatching {
    fn assign(&self, candidates: &[Candidate], threshold: f64) -> Vec<usize> {
        let mut used_start: Vec<usize> = Vec::new();
        let mut used_end: Vec<usize> = Vec::new();
        let mut accepted = Vec::new();
        for idx in rank(candidates) {
            let c = candidates[idx];
            if used_start.contains(&c.start) || used_end.contains(&c.end) {
                continue;
            }
            if c.sum < threshold {
                // Ranked: nothing after this can pass either.
                break;
            }
            used_start.push(c.start);
            used_end.push(c.end);
            accepted.push(idx);
        }
        accepted
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct MaxWeightMatching;

impl MatchingStrategy for MaxWeightMatching {
    fn assign(&self, candidates: &[Candidate], threshold: f64) -> Vec<usize> {
        let eligible: Vec<usize> = rank(candidates)
            .into_iter()
            .filter(|&i| candidates[i].sum >= threshold && candidates[i].sum > 0.0)
            .collect();
        if eligible.is_empty() {
            return Vec::new();
        }

        let mut rows: Vec<usize> = Vec::new();
        let mut cols: Vec<usize> = Vec::new();
        for &i in &eligible {
            if !rows.contains(&candidates[i].start) {
                rows.push(candidates[i].start);
            }
            if !cols.contains(&candidates[i].end) {
                cols.push(candidates[i].end);
            }
        }
        let n = rows.len().max(cols.len());
        let max_w = eligible
            .iter()
            .map(|&i| candidates[i].sum)
            .fold(0.0f64, f64::max);

        // Cost max_w stands for "no pair" (weight 0).
        let mut cost = vec![vec![max_w; n]; n];
        let mut cell: Vec<Vec<Option<usize>>> = vec![vec![None; n]; n];
        for &i in &eligible {
            let r = rows.iter().position(|&s| s == candidates[i].start);
            let c = cols.iter().position(|&e| e == candidates[i].end);
            let (Some(r), Some(c)) = (r, c) else {
                continue;
            };
            if cell[r][c].is_none() {
                cost[r][c] = max_w - candidates[i].sum;
                cell[r][c] = Some(i);
            }
        }

        let assignment = hungarian(&cost);
        let mut accepted: Vec<usize> = assignment
            .iter()
            .enumerate()
            .filter_map(|(r, &c)| cell[r][c])
            .collect();
        accepted.sort_by(|&a, &b| candidates[b].sum.total_cmp(&candidates[a].sum));
        accepted
    }
}

/// Minimum-cost perfect assignment on a square matrix (Kuhn-Munkres with
/// potentials). Returns the column assigned to each row.
fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let inf = f64::INFINITY;
    // 1-based; column 0 is the virtual start.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![inf; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            row_to_col[p[j] - 1] = j - 1;
        }
    }
    row_to_col
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(start: usize, end: usize, sum: f64) -> Candidate {
        Candidate { start, end, sum }
    }

    #[test]
    fn greedy_takes_best_pair_first_and_breaks_ties_by_order() {
        let cands = [c(0, 0, 6.0), c(0, 1, 9.0), c(1, 1, 8.0), c(1, 0, 6.0)];
        let accepted = GreedyMatching.assign(&cands, 5.0);
        assert_eq!(accepted, vec![1, 3]);
    }

    #[test]
    fn greedy_respects_threshold() {
        let cands = [c(0, 0, 4.9)];
        assert!(GreedyMatching.assign(&cands, 5.0).is_empty());
    }

    #[test]
    fn max_weight_beats_greedy_on_total() {
        // Greedy takes (0,1)=9 and is left with nothing; optimal is 8 + 8.
        let cands = [c(0, 1, 9.0), c(0, 0, 8.0), c(1, 1, 8.0)];
        assert_eq!(GreedyMatching.assign(&cands, 5.0), vec![0]);
        let mut optimal = MaxWeightMatching.assign(&cands, 5.0);
        optimal.sort();
        assert_eq!(optimal, vec![1, 2]);
    }

    #[test]
    fn max_weight_handles_rectangular_inputs() {
        let cands = [c(0, 0, 6.0), c(1, 0, 7.0), c(2, 0, 5.5)];
        assert_eq!(MaxWeightMatching.assign(&cands, 5.0), vec![1]);
    }
}
