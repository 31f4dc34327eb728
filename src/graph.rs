use std::collections::HashMap;

use crate::fretboard::{Position, possible_positions};
use crate::theory::{Pitch, Tuning};

/// Crossing to an adjacent string costs a sixth of moving one fret along
/// the neck. The metric is deliberately anisotropic: cross-string leaps are
/// ergonomically much cheaper than equivalent shifts up or down the neck.
const STRING_SPACING_FACTOR: f64 = 1.0 / 6.0;

/// Ergonomic layout distance between two fretboard coordinates: Euclidean
/// norm with the across-string component scaled down.
pub fn distance(a: Position, b: Position) -> f64 {
    let dx = (a.string as f64 - b.string as f64) * STRING_SPACING_FACTOR;
    let dy = a.fret as f64 - b.fret as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Complete undirected weighted graph over every reachable position of a
/// tuning. Built once per tuning and read-only afterwards; edge weights are
/// the ergonomic layout distances. Candidate lookups per pitch come back in
/// a fixed order (string index, then fret) so downstream tie-breaks are
/// deterministic.
pub struct PositionGraph {
    positions: Vec<Position>,
    index: HashMap<Position, usize>,
    by_pitch: HashMap<Pitch, Vec<Position>>,
    weights: Vec<f64>,
}

impl PositionGraph {
    pub fn build(tuning: &Tuning) -> Self {
        let mut positions = Vec::new();
        let mut by_pitch: HashMap<Pitch, Vec<Position>> = HashMap::new();

        // possible_positions iterates strings in order and frets ascending,
        // which fixes the candidate enumeration order.
        for string in possible_positions(tuning) {
            for (pos, pitch) in string {
                positions.push(pos);
                by_pitch.entry(pitch).or_default().push(pos);
            }
        }

        let index: HashMap<Position, usize> = positions
            .iter()
            .enumerate()
            .map(|(i, pos)| (*pos, i))
            .collect();

        let n = positions.len();
        let mut weights = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distance(positions[i], positions[j]);
                weights[i * n + j] = d;
                weights[j * n + i] = d;
            }
        }

        PositionGraph {
            positions,
            index,
            by_pitch,
            weights,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Edge weight between two graph positions.
    pub fn weight(&self, a: Position, b: Position) -> f64 {
        let n = self.positions.len();
        self.weights[self.index[&a] * n + self.index[&b]]
    }

    /// All positions sounding the given pitch, in enumeration order.
    /// Empty when the pitch is not reachable under this tuning.
    pub fn candidates(&self, pitch: Pitch) -> &[Position] {
        self.by_pitch.get(&pitch).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_reflexive() {
        for pos in [Position::new(0, 0), Position::new(3, 7), Position::new(5, 20)] {
            assert_eq!(distance(pos, pos), 0.0);
        }
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Position::new(1, 4);
        let b = Position::new(5, 12);
        assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn test_distance_known_values() {
        let origin = Position::new(0, 0);
        // One string over: 1/6
        assert!((distance(origin, Position::new(1, 0)) - 1.0 / 6.0).abs() < 1e-12);
        // One fret up: 1.0, not shrunk
        assert!((distance(origin, Position::new(0, 1)) - 1.0).abs() < 1e-12);
        // 18 strings / 4 frets: 3-4-5 triangle after scaling
        assert!((distance(origin, Position::new(18, 4)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_build_standard_graph() {
        let graph = PositionGraph::build(&Tuning::standard());
        // 6 strings x 21 frets
        assert_eq!(graph.len(), 126);
        assert!(!graph.is_empty());

        let a = Position::new(0, 0);
        let b = Position::new(5, 3);
        assert_eq!(graph.weight(a, b), distance(a, b));
        assert_eq!(graph.weight(a, a), 0.0);
    }

    #[test]
    fn test_candidates_order_and_content() {
        let graph = PositionGraph::build(&Tuning::standard());

        // E4 (open thin string) also sits on every lower string
        let e4 = Pitch::parse("E4").unwrap();
        let candidates = graph.candidates(e4);
        assert_eq!(
            candidates,
            &[
                Position::new(0, 0),
                Position::new(1, 5),
                Position::new(2, 9),
                Position::new(3, 14),
                Position::new(4, 19),
            ]
        );
        // Stable order: string ascending
        for pair in candidates.windows(2) {
            assert!(pair[0].string < pair[1].string);
        }

        // E2 only exists on the open thick string
        let e2 = Pitch::parse("E2").unwrap();
        assert_eq!(graph.candidates(e2), &[Position::new(5, 0)]);

        // Below the instrument's range: no candidates
        let c0 = Pitch::parse("C0").unwrap();
        assert!(graph.candidates(c0).is_empty());
    }
}
