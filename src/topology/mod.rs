//! Topology exploration: which tab pairs to connect.
//!
//! A topology is a spanning tree over the tab identifiers: N−1 unordered
//! pairs forming a connected acyclic graph. Enumeration walks all
//! candidate pair subsets, keeps the connected ones, scores them with a
//! configurable heuristic and returns the top K. Pairs of sibling tabs
//! (split from the same surface) are forbidden outright.

pub mod separation;

use std::collections::{BTreeSet, HashSet};

use crate::config::{TopologyConfig, TopologyMode, TopologyScoring};
use crate::part::TabId;

pub type Pair = (TabId, TabId);

fn ordered(a: &TabId, b: &TabId) -> Pair {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Generate candidate pair sequences for the given tabs.
#[must_use]
pub fn sequences(
    ids: &[TabId],
    forbidden: &[Pair],
    cfg: &TopologyConfig,
) -> Vec<Vec<Pair>> {
    if ids.len() < 2 {
        return Vec::new();
    }

    let forbidden: HashSet<Pair> = forbidden
        .iter()
        .map(|(a, b)| ordered(a, b))
        .collect();

    match cfg.mode {
        TopologyMode::Chain => {
            let chain: Vec<Pair> = ids
                .windows(2)
                .map(|w| (w[0].clone(), w[1].clone()))
                .collect();
            let has_forbidden = chain
                .iter()
                .any(|(a, b)| forbidden.contains(&ordered(a, b)));
            if has_forbidden {
                // Sibling tabs may not connect directly; fall back to tree
                // enumeration to route around them.
                log::debug!("chain topology hits a forbidden pair; enumerating trees instead");
                spanning_trees(ids, &forbidden, cfg.scoring, cfg.max_topologies)
            } else {
                vec![chain]
            }
        }
        TopologyMode::SpanningTrees => {
            spanning_trees(ids, &forbidden, cfg.scoring, cfg.max_topologies)
        }
    }
}

/// All spanning trees over `ids` avoiding `forbidden`, best `top_k` by the
/// scoring heuristic. Enumeration order is deterministic, and the sort is
/// stable, so equal-scoring trees keep their enumeration order.
#[must_use]
pub fn spanning_trees(
    ids: &[TabId],
    forbidden: &HashSet<Pair>,
    scoring: TopologyScoring,
    top_k: usize,
) -> Vec<Vec<Pair>> {
    let n = ids.len();
    if n < 2 {
        return Vec::new();
    }

    let mut allowed: Vec<(usize, usize)> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if !forbidden.contains(&ordered(&ids[i], &ids[j])) {
                allowed.push((i, j));
            }
        }
    }
    if allowed.len() < n - 1 {
        return Vec::new();
    }

    let mut trees: Vec<(f64, Vec<Pair>)> = Vec::new();
    let mut subset: Vec<usize> = Vec::with_capacity(n - 1);
    enumerate_subsets(&allowed, n, 0, &mut subset, &mut |edges| {
        if !is_connected_tree(edges, n) {
            return;
        }
        let score = score_tree(edges, n, scoring);
        let pairs = edges
            .iter()
            .map(|&(i, j)| (ids[i].clone(), ids[j].clone()))
            .collect();
        trees.push((score, pairs));
    });

    trees.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    trees.truncate(top_k);
    log::debug!("kept {} spanning tree(s) for {} tabs", trees.len(), n);
    trees.into_iter().map(|(_, pairs)| pairs).collect()
}

fn enumerate_subsets(
    allowed: &[(usize, usize)],
    n: usize,
    start: usize,
    subset: &mut Vec<usize>,
    visit: &mut impl FnMut(&[(usize, usize)]),
) {
    if subset.len() == n - 1 {
        let edges: Vec<(usize, usize)> = subset.iter().map(|&k| allowed[k]).collect();
        visit(&edges);
        return;
    }
    let remaining = n - 1 - subset.len();
    for k in start..allowed.len() {
        if allowed.len() - k < remaining {
            break;
        }
        subset.push(k);
        enumerate_subsets(allowed, n, k + 1, subset, visit);
        subset.pop();
    }
}

/// N−1 edges form a spanning tree exactly when the graph is connected.
fn is_connected_tree(edges: &[(usize, usize)], n: usize) -> bool {
    let mut adjacency = vec![Vec::new(); n];
    for &(i, j) in edges {
        adjacency[i].push(j);
        adjacency[j].push(i);
    }
    let mut seen = BTreeSet::new();
    let mut stack = vec![0_usize];
    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        stack.extend(adjacency[node].iter().copied());
    }
    seen.len() == n
}

fn score_tree(edges: &[(usize, usize)], n: usize, scoring: TopologyScoring) -> f64 {
    let mut degree = vec![0_usize; n];
    for &(i, j) in edges {
        degree[i] += 1;
        degree[j] += 1;
    }
    match scoring {
        TopologyScoring::Balanced => {
            let mean = degree.iter().sum::<usize>() as f64 / n as f64;
            let variance = degree
                .iter()
                .map(|&d| (d as f64 - mean).powi(2))
                .sum::<f64>()
                / n as f64;
            -variance
        }
        TopologyScoring::Linear => degree.iter().filter(|&&d| d == 2).count() as f64,
        TopologyScoring::Star => degree.iter().copied().max().unwrap_or(0) as f64,
    }
}
