use crate::difficulty;
use crate::graph::PositionGraph;
use crate::pathfinder::Path;

/// The fingering sequence chosen for a whole piece, with the cumulative
/// cost the decode minimized.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub paths: Vec<Path>,
    pub total_cost: f64,
}

/// Viterbi decode over the piece: states at each chord are its candidate
/// paths, emission is the candidate's intrinsic cost, transition is the
/// hand-height shift cost between consecutive candidates. Returns the
/// globally minimal sequence rather than chaining locally best choices.
///
/// Ties select the earliest state in candidate order (strict `<` while
/// scanning), so the decode is deterministic and idempotent.
///
/// Returns None when some chord has no candidates; an empty piece decodes
/// to an empty sequence at zero cost.
pub fn decode(graph: &PositionGraph, candidates: &[Vec<Path>]) -> Option<Decoded> {
    if candidates.is_empty() {
        return Some(Decoded {
            paths: Vec::new(),
            total_cost: 0.0,
        });
    }
    if candidates.iter().any(|states| states.is_empty()) {
        return None;
    }

    // Per-state emission costs and heights, computed once
    let emissions: Vec<Vec<f64>> = candidates
        .iter()
        .map(|states| {
            states
                .iter()
                .map(|path| difficulty::emission_cost(graph, path))
                .collect()
        })
        .collect();
    let heights: Vec<Vec<f64>> = candidates
        .iter()
        .map(|states| states.iter().map(|path| difficulty::height(path)).collect())
        .collect();

    // Forward pass: cheapest cumulative cost reaching each state,
    // with backpointers into the previous chord's states.
    let mut cumulative: Vec<f64> = emissions[0].clone();
    let mut backpointers: Vec<Vec<usize>> = Vec::with_capacity(candidates.len());

    for t in 1..candidates.len() {
        let mut next = vec![f64::INFINITY; candidates[t].len()];
        let mut back = vec![0; candidates[t].len()];

        for (s, emission) in emissions[t].iter().enumerate() {
            for (sprev, prev_cost) in cumulative.iter().enumerate() {
                let cost = prev_cost
                    + difficulty::transition_cost(heights[t - 1][sprev], heights[t][s]);
                if cost < next[s] {
                    next[s] = cost;
                    back[s] = sprev;
                }
            }
            next[s] += emission;
        }

        cumulative = next;
        backpointers.push(back);
    }

    // Global minimum at the last chord, first index on ties
    let mut best_state = 0;
    for (s, cost) in cumulative.iter().enumerate() {
        if *cost < cumulative[best_state] {
            best_state = s;
        }
    }
    let total_cost = cumulative[best_state];

    // Backtrack
    let mut chosen = vec![0; candidates.len()];
    chosen[candidates.len() - 1] = best_state;
    for t in (1..candidates.len()).rev() {
        chosen[t - 1] = backpointers[t - 1][chosen[t]];
    }

    let paths = chosen
        .iter()
        .enumerate()
        .map(|(t, &s)| candidates[t][s].clone())
        .collect();

    Some(Decoded { paths, total_cost })
}
