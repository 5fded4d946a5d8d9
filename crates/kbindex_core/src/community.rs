//! Community detection over the undirected projection of the link graph.
//!
//! Both strategies are deterministic without a seed: sweeps and merges
//! follow identifier order, so the same graph always yields the same
//! partition. Contract for every implementation:
//!
//! - clusters are pairwise disjoint and cover the node set exactly
//! - cluster identity is the node-set content, never a positional index
//! - the returned order is descending cluster size, equal sizes keeping
//!   first-discovered order (the order of each cluster's smallest member)
//! - an empty graph yields no clusters, a single node one singleton

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use kbindex_graph::{LinkGraph, NoteId};

/// One community: a non-empty, ordered node set.
pub type Cluster = BTreeSet<NoteId>;

pub trait CommunityDetector {
    fn name(&self) -> &'static str;
    fn detect(&self, graph: &LinkGraph) -> Vec<Cluster>;
}

/// Sweep cap for label propagation. Convergence is normally a handful of
/// sweeps; the cap only guards pathological oscillation.
const MAX_PROPAGATION_SWEEPS: usize = 100;

/// Asynchronous label propagation. Every node starts with its own label;
/// sweeps in identifier order adopt the most frequent neighbor label,
/// ties to the smallest label, until a fixed point.
pub struct LabelPropagation;

impl CommunityDetector for LabelPropagation {
    fn name(&self) -> &'static str {
        "label-propagation"
    }

    fn detect(&self, graph: &LinkGraph) -> Vec<Cluster> {
        let adjacency = graph.undirected_adjacency();
        let mut labels: BTreeMap<NoteId, NoteId> = adjacency
            .keys()
            .map(|id| (id.clone(), id.clone()))
            .collect();

        for _ in 0..MAX_PROPAGATION_SWEEPS {
            let mut changed = false;
            for (id, neighbors) in &adjacency {
                if neighbors.is_empty() {
                    continue;
                }
                let mut counts: BTreeMap<NoteId, usize> = BTreeMap::new();
                for neighbor in neighbors {
                    *counts.entry(labels[neighbor].clone()).or_insert(0) += 1;
                }
                // Ascending label order plus a strict comparison keeps the
                // smallest label on ties.
                let mut best: Option<(&NoteId, usize)> = None;
                for (label, count) in &counts {
                    if best.map_or(true, |(_, best_count)| *count > best_count) {
                        best = Some((label, *count));
                    }
                }
                let best_label = best.map(|(label, _)| label.clone()).unwrap_or_else(|| id.clone());
                if labels[id] != best_label {
                    labels.insert(id.clone(), best_label);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let mut groups: BTreeMap<NoteId, Cluster> = BTreeMap::new();
        for (id, label) in labels {
            groups.entry(label).or_default().insert(id);
        }
        order_clusters(groups.into_values().collect())
    }
}

/// Greedy modularity agglomeration (CNM). Starts from singletons and
/// repeatedly merges the connected pair with the best modularity gain
/// until no merge improves modularity; equal gains take the pair with the
/// lexicographically smallest representatives.
pub struct GreedyModularity;

impl CommunityDetector for GreedyModularity {
    fn name(&self) -> &'static str {
        "greedy-modularity"
    }

    fn detect(&self, graph: &LinkGraph) -> Vec<Cluster> {
        let adjacency = graph.undirected_adjacency();
        if adjacency.is_empty() {
            return Vec::new();
        }

        struct Slot {
            members: Cluster,
            degree_sum: usize,
        }

        let ids: Vec<NoteId> = adjacency.keys().cloned().collect();
        let index_of: BTreeMap<NoteId, usize> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect();

        let mut slots: Vec<Option<Slot>> = ids
            .iter()
            .map(|id| {
                Some(Slot {
                    members: [id.clone()].into_iter().collect(),
                    degree_sum: adjacency[id].len(),
                })
            })
            .collect();

        // Undirected edge counts between community slots.
        let mut between: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        let mut edge_total = 0usize;
        for (id, neighbors) in &adjacency {
            for neighbor in neighbors {
                if neighbor > id {
                    let a = index_of[id];
                    let b = index_of[neighbor];
                    let key = (a.min(b), a.max(b));
                    *between.entry(key).or_insert(0) += 1;
                    edge_total += 1;
                }
            }
        }

        if edge_total > 0 {
            let m = edge_total as f64;
            let two_m_sq = 2.0 * m * m;

            loop {
                let mut best: Option<(f64, (NoteId, NoteId), (usize, usize))> = None;
                for (&(i, j), &count) in &between {
                    // The reroute step keeps `between` keyed by live,
                    // non-empty slots only.
                    let (Some(left), Some(right)) = (slots[i].as_ref(), slots[j].as_ref()) else {
                        continue;
                    };
                    let gain = count as f64 / m
                        - (left.degree_sum as f64 * right.degree_sum as f64) / two_m_sq;
                    let (Some(rep_left), Some(rep_right)) =
                        (left.members.iter().next(), right.members.iter().next())
                    else {
                        continue;
                    };
                    let reps = if rep_left < rep_right {
                        (rep_left.clone(), rep_right.clone())
                    } else {
                        (rep_right.clone(), rep_left.clone())
                    };
                    let take = match &best {
                        None => true,
                        Some((best_gain, best_reps, _)) => match gain.partial_cmp(best_gain) {
                            Some(std::cmp::Ordering::Greater) => true,
                            Some(std::cmp::Ordering::Equal) => reps < *best_reps,
                            _ => false,
                        },
                    };
                    if take {
                        best = Some((gain, reps, (i, j)));
                    }
                }

                let (gain, _, (i, j)) = match best {
                    Some(found) => found,
                    None => break,
                };
                if gain <= 0.0 {
                    break;
                }

                let Some(absorbed) = slots[j].take() else { break };
                let Some(keeper) = slots[i].as_mut() else { break };
                keeper.members.extend(absorbed.members);
                keeper.degree_sum += absorbed.degree_sum;

                let mut rerouted: Vec<((usize, usize), usize)> = Vec::new();
                between.retain(|&(a, b), count| {
                    if a == j || b == j {
                        rerouted.push(((a, b), *count));
                        false
                    } else {
                        true
                    }
                });
                for ((a, b), count) in rerouted {
                    let other = if a == j { b } else { a };
                    if other == i {
                        // The merged pair's own edges are internal now.
                        continue;
                    }
                    let key = (i.min(other), i.max(other));
                    *between.entry(key).or_insert(0) += count;
                }
            }
        }

        let clusters = slots
            .into_iter()
            .flatten()
            .map(|slot| slot.members)
            .collect();
        order_clusters(clusters)
    }
}

/// Descending size, equal sizes in the order of each cluster's smallest
/// member. The flat assembler depends on this exact order.
fn order_clusters(mut clusters: Vec<Cluster>) -> Vec<Cluster> {
    clusters.sort_by(|a, b| a.iter().next().cmp(&b.iter().next()));
    clusters.sort_by_key(|cluster| Reverse(cluster.len()));
    clusters
}
