use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use thiserror::Error;

use crate::decoder;
use crate::graph::PositionGraph;
use crate::pathfinder::{Path, candidate_sets, find_candidate_paths};
use crate::theory::Pitch;

#[derive(Error, Debug)]
pub enum ArrangeError {
    #[error("chord {chord} is not playable under the current tuning")]
    UnplayableChord { chord: usize },
}

/// Tunable knobs for the arranging pass.
pub struct ArrangeOptions {
    /// Chords with more notes than this skip the factorial permutation
    /// search (see pathfinder).
    pub max_permuted: usize,
    /// Worker threads for candidate generation.
    pub workers: usize,
    /// Show a progress bar while generating candidates.
    pub progress: bool,
}

impl Default for ArrangeOptions {
    fn default() -> Self {
        ArrangeOptions {
            max_permuted: 6,
            workers: 1,
            progress: false,
        }
    }
}

/// The chosen fingering for a whole piece.
#[derive(Debug)]
pub struct Arrangement {
    pub paths: Vec<Path>,
    pub total_cost: f64,
}

/// Turn a chord sequence into the globally cheapest fingering sequence.
///
/// Candidate generation is independent per chord and runs on a rayon pool;
/// the indexed collect keeps per-chord candidate order identical to a
/// sequential run, so decoding (and its tie-breaks) stays deterministic
/// regardless of worker count. The decode itself is strictly left-to-right.
pub fn arrange(
    graph: &PositionGraph,
    chords: &[Vec<Pitch>],
    options: &ArrangeOptions,
) -> Result<Arrangement, ArrangeError> {
    log::info!(
        "Arranging {} chords with {} workers",
        chords.len(),
        options.workers
    );

    let pb = if options.progress {
        let pb = ProgressBar::new(chords.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chords ({eta})",
            )
            .unwrap()
            .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()
        .unwrap();

    let candidates: Vec<Vec<Path>> = pool.install(|| {
        chords
            .par_iter()
            .map(|chord| {
                let sets = candidate_sets(graph, chord);
                let paths = find_candidate_paths(graph, &sets, options.max_permuted);
                pb.inc(1);
                paths
            })
            .collect()
    });
    pb.finish_and_clear();

    // Surface the first unplayable chord by piece index instead of
    // silently dropping it: skipping would shift every later chord.
    if let Some(chord) = candidates.iter().position(|states| states.is_empty()) {
        log::error!(
            "chord {chord} has no playable fingering: {:?}",
            chords[chord].iter().map(|p| p.to_string()).collect::<Vec<_>>()
        );
        return Err(ArrangeError::UnplayableChord { chord });
    }

    let decoded = decoder::decode(graph, &candidates)
        .expect("all chords verified to have candidates");

    log::info!("Arranged at total cost {:.3}", decoded.total_cost);

    Ok(Arrangement {
        paths: decoded.paths,
        total_cost: decoded.total_cost,
    })
}
