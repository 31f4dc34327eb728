use std::collections::HashSet;

use crate::difficulty;
use crate::fretboard::Position;
use crate::graph::PositionGraph;
use crate::theory::Pitch;

/// One hand shape: one position per note of a chord.
pub type Path = Vec<Position>;

/// A hand can cover strictly less than this many frets at once.
const MAX_FRET_SPAN: usize = 5;

/// Candidate positions for each note of a chord, in graph enumeration order.
/// An empty inner list means that note is unreachable under the tuning.
pub fn candidate_sets(graph: &PositionGraph, chord: &[Pitch]) -> Vec<Vec<Position>> {
    chord
        .iter()
        .map(|pitch| graph.candidates(*pitch).to_vec())
        .collect()
}

/// All playable candidate paths for a chord, across note orderings.
///
/// For each ordering of the notes, the candidate sets form the layers of a
/// path graph (edges only between consecutive layers, weights from the
/// position graph); the shortest path for every (first-layer, last-layer)
/// node pair is a candidate. Paths failing the playability filter are
/// dropped, survivors are deduplicated preserving first-seen order.
///
/// Enumerating orderings is factorial in chord size, so chords with more
/// notes than `max_permuted` skip the permutation sweep and use a single
/// ordering with the most constrained note first.
pub fn find_candidate_paths(
    graph: &PositionGraph,
    note_sets: &[Vec<Position>],
    max_permuted: usize,
) -> Vec<Path> {
    let n = note_sets.len();
    if n == 0 || note_sets.iter().any(|set| set.is_empty()) {
        return Vec::new();
    }

    let orderings = if n <= max_permuted {
        permutations(n)
    } else {
        log::warn!(
            "chord with {n} notes exceeds the permutation cap ({max_permuted}); \
             searching a single ordering"
        );
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| note_sets[i].len());
        vec![order]
    };

    let mut seen: HashSet<Path> = HashSet::new();
    let mut paths = Vec::new();

    for ordering in orderings {
        let layers: Vec<&[Position]> =
            ordering.iter().map(|&i| note_sets[i].as_slice()).collect();

        for path in shortest_layer_paths(graph, &layers) {
            if is_playable(&path, n) && seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    paths
}

/// The single cheapest playable path for a chord, scored against the
/// previous chord's path. None when no candidate survives the filter.
pub fn find_best_path(
    graph: &PositionGraph,
    note_sets: &[Vec<Position>],
    previous: &[Position],
    max_permuted: usize,
) -> Option<Path> {
    let paths = find_candidate_paths(graph, note_sets, max_permuted);

    let mut best: Option<(f64, Path)> = None;
    for path in paths {
        let cost = difficulty::cost(graph, &path, previous);
        // Strict comparison keeps the first of equal-cost candidates
        if best.as_ref().is_none_or(|(c, _)| cost < *c) {
            best = Some((cost, path));
        }
    }
    best.map(|(_, path)| path)
}

/// Shortest weighted path through the layers for every (source, target)
/// pair, source in the first layer and target in the last. Edges exist
/// between all nodes of consecutive layers, so the forward pass is a dense
/// layer-by-layer relaxation; ties keep the earliest predecessor.
fn shortest_layer_paths(graph: &PositionGraph, layers: &[&[Position]]) -> Vec<Path> {
    let mut results = Vec::new();

    for isource in 0..layers[0].len() {
        // dist[l][j]: cheapest way from the source to node j of layer l
        let mut dist: Vec<Vec<f64>> = Vec::with_capacity(layers.len());
        let mut parent: Vec<Vec<usize>> = Vec::with_capacity(layers.len());

        dist.push(
            (0..layers[0].len())
                .map(|j| if j == isource { 0.0 } else { f64::INFINITY })
                .collect(),
        );
        parent.push(vec![0; layers[0].len()]);

        for l in 1..layers.len() {
            let mut layer_dist = vec![f64::INFINITY; layers[l].len()];
            let mut layer_parent = vec![0; layers[l].len()];

            for (j, &node) in layers[l].iter().enumerate() {
                for (k, &prev) in layers[l - 1].iter().enumerate() {
                    if dist[l - 1][k].is_infinite() {
                        continue;
                    }
                    let d = dist[l - 1][k] + graph.weight(prev, node);
                    if d < layer_dist[j] {
                        layer_dist[j] = d;
                        layer_parent[j] = k;
                    }
                }
            }

            dist.push(layer_dist);
            parent.push(layer_parent);
        }

        let last = layers.len() - 1;
        for (itarget, _) in layers[last].iter().enumerate() {
            if dist[last][itarget].is_infinite() {
                continue;
            }
            // Backtrack from the target through the parent pointers
            let mut path = vec![Position::new(0, 0); layers.len()];
            let mut j = itarget;
            for l in (0..layers.len()).rev() {
                path[l] = layers[l][j];
                j = parent[l][j];
            }
            results.push(path);
        }
    }

    results
}

/// Physical playability of one hand shape: each string carries at most one
/// finger, the fret span stays under a hand's reach, and the path visits no
/// more nodes than the chord has notes.
fn is_playable(path: &[Position], nnotes: usize) -> bool {
    let mut strings: Vec<usize> = path.iter().map(|p| p.string).collect();
    strings.sort_unstable();
    strings.dedup();
    if strings.len() != path.len() {
        return false;
    }

    let min_fret = path.iter().map(|p| p.fret).min().unwrap_or(0);
    let max_fret = path.iter().map(|p| p.fret).max().unwrap_or(0);

    max_fret - min_fret < MAX_FRET_SPAN && path.len() <= nnotes
}

/// All permutations of 0..n in lexicographic order. Deterministic ordering
/// matters: downstream tie-breaks select the first candidate generated.
fn permutations(n: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    let mut current = Vec::with_capacity(n);
    let mut used = vec![false; n];
    permute(n, &mut current, &mut used, &mut result);
    result
}

fn permute(
    n: usize,
    current: &mut Vec<usize>,
    used: &mut Vec<bool>,
    result: &mut Vec<Vec<usize>>,
) {
    if current.len() == n {
        result.push(current.clone());
        return;
    }
    for i in 0..n {
        if !used[i] {
            used[i] = true;
            current.push(i);
            permute(n, current, used, result);
            current.pop();
            used[i] = false;
        }
    }
}
