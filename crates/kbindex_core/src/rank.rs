//! Importance ranking inside a cluster subgraph.
//!
//! `vote_rank` is the sequential election: a node's score each round is
//! the voting ability its in-neighbors still hold, and electing a node
//! spends its voters' ability, so later rounds drift away from the region
//! already covered. `select_header` is the single-winner variant: damped
//! random-walk scores filtered through a candidate predicate, with a
//! minimum field of qualifying candidates before anyone wins.
//!
//! Every tie in either mode breaks to the lexicographically smallest
//! identifier, which is what keeps repeated runs byte-identical.

use std::collections::BTreeMap;

use kbindex_graph::{LinkGraph, NoteId};

use crate::config::CandidateFilter;
use crate::error::IndexError;

/// Random-walk damping factor.
pub const PAGERANK_DAMPING: f64 = 0.85;
/// Power-iteration cap.
pub const PAGERANK_MAX_ITERATIONS: usize = 100;
/// Per-node convergence tolerance (the loop stops when the total change
/// drops below `node_count * PAGERANK_TOLERANCE`).
pub const PAGERANK_TOLERANCE: f64 = 1e-6;
/// A header is only selected when strictly more than this many candidates
/// qualify; a thinner field means the cluster has no clear owner yet.
pub const HEADER_CANDIDATE_THRESHOLD: usize = 2;

/// Elect up to `cap` representatives, most central first.
///
/// Abilities start at 1.0. Each round scores every unelected node as the
/// sum of its in-neighbors' abilities and elects the top scorer; the
/// winner's ability drops to zero and each of its voters is charged
/// 1/⟨k_out⟩ (floored at zero), ⟨k_out⟩ being the subgraph's mean
/// out-degree. An edgeless subgraph elects nobody; once someone is
/// elected, zero-score rounds still fill the list by identifier order, so
/// a connected cluster of n ≤ cap nodes returns all n.
pub fn vote_rank(graph: &LinkGraph, cap: usize) -> Result<Vec<NoteId>, IndexError> {
    if cap == 0 {
        return Err(IndexError::InvalidConfiguration(
            "representative cap must be positive".to_string(),
        ));
    }

    let node_count = graph.node_count();
    if node_count == 0 {
        return Ok(Vec::new());
    }

    let voters = graph.in_adjacency();
    let charge = if graph.edge_count() > 0 {
        node_count as f64 / graph.edge_count() as f64
    } else {
        0.0
    };

    let mut ability: BTreeMap<&NoteId, f64> = voters.keys().map(|id| (id, 1.0)).collect();
    let mut elected: Vec<NoteId> = Vec::new();

    while elected.len() < cap && elected.len() < node_count {
        let mut best: Option<(&NoteId, f64)> = None;
        for (id, ins) in &voters {
            if elected.iter().any(|done| done == id) {
                continue;
            }
            let score: f64 = ins.iter().map(|voter| ability[voter]).sum();
            let better = match &best {
                None => true,
                Some((_, best_score)) => score > *best_score,
            };
            if better {
                best = Some((id, score));
            }
        }
        let Some((winner, score)) = best else { break };
        if elected.is_empty() && score <= 0.0 {
            // Nobody can vote: the subgraph has no edges.
            break;
        }
        ability.insert(winner, 0.0);
        for voter in &voters[winner] {
            let spent = ability[voter];
            ability.insert(voter, (spent - charge).max(0.0));
        }
        elected.push(winner.clone());
    }

    Ok(elected)
}

/// Damped random-walk scores (stationary visit probability) over the
/// directed graph. Dangling mass is redistributed uniformly; iteration
/// order is identifier order throughout, so the result is deterministic.
pub fn page_rank(graph: &LinkGraph) -> BTreeMap<NoteId, f64> {
    let node_count = graph.node_count();
    if node_count == 0 {
        return BTreeMap::new();
    }

    let out = graph.out_adjacency();
    let n = node_count as f64;
    let uniform = 1.0 / n;
    let mut rank: BTreeMap<NoteId, f64> = out.keys().map(|id| (id.clone(), uniform)).collect();

    for _ in 0..PAGERANK_MAX_ITERATIONS {
        let mut next: BTreeMap<NoteId, f64> = out
            .keys()
            .map(|id| (id.clone(), (1.0 - PAGERANK_DAMPING) / n))
            .collect();

        let dangling_mass: f64 = out
            .iter()
            .filter(|(_, targets)| targets.is_empty())
            .map(|(id, _)| rank[id])
            .sum();
        let dangling_share = PAGERANK_DAMPING * dangling_mass / n;

        for (id, targets) in &out {
            let current = rank[id];
            if !targets.is_empty() {
                let share = PAGERANK_DAMPING * current / targets.len() as f64;
                for target in targets {
                    if let Some(slot) = next.get_mut(target) {
                        *slot += share;
                    }
                }
            }
        }
        for value in next.values_mut() {
            *value += dangling_share;
        }

        let drift: f64 = next
            .iter()
            .map(|(id, value)| (value - rank[id]).abs())
            .sum();
        rank = next;
        if drift < n * PAGERANK_TOLERANCE {
            break;
        }
    }

    rank
}

/// Single-header selection: the top random-walk scorer among qualifying
/// candidates, or `None` when at most `HEADER_CANDIDATE_THRESHOLD`
/// candidates qualify. The caller treats a `None` cluster as unheaded.
pub fn select_header(graph: &LinkGraph, filter: &CandidateFilter) -> Option<NoteId> {
    if graph.is_empty() {
        return None;
    }

    let scores = page_rank(graph);
    let mut qualifying = 0usize;
    let mut best: Option<(&NoteId, f64)> = None;
    for (id, score) in &scores {
        if !filter.admits(id) {
            continue;
        }
        qualifying += 1;
        let better = match &best {
            None => true,
            Some((_, best_score)) => *score > *best_score,
        };
        if better {
            best = Some((id, *score));
        }
    }

    if qualifying <= HEADER_CANDIDATE_THRESHOLD {
        return None;
    }
    best.map(|(id, _)| id.clone())
}
