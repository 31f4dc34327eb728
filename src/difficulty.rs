use crate::fretboard::Position;
use crate::graph::PositionGraph;

/// Laplace scale parameter for the hand-shift smoothing term.
const LAPLACE_B: f64 = 1.0;

/// Scale on the decoder's transition term. At full weight a one-fret-longer
/// hand shift (about 1.29 nats) would beat the ln 2 saved by leaving a
/// string open; at half weight open strings win ties like that.
const TRANSITION_WEIGHT: f64 = 0.5;

/// Finite sentinel substituted when ergonomic ease underflows to zero, so
/// the decoder's sums stay well-defined instead of hitting a division fault.
pub const DEGENERATE_COST: f64 = 1e12;

/// Zero-centered Laplace density.
pub fn laplace(x: f64, b: f64) -> f64 {
    (1.0 / (2.0 * b)) * (-x.abs() / b).exp()
}

/// Mean fret index of the path's positions. 0 for an empty path, which
/// anchors the first chord of a piece to the nut.
pub fn height(path: &[Position]) -> f64 {
    if path.is_empty() {
        return 0.0;
    }
    path.iter().map(|p| p.fret as f64).sum::<f64>() / path.len() as f64
}

/// Number of fretted positions: open strings cost no fingers.
pub fn nfingers(path: &[Position]) -> usize {
    path.iter().filter(|p| p.fret != 0).count()
}

/// Sum of graph edge weights along consecutive positions of the path.
pub fn path_length(graph: &PositionGraph, path: &[Position]) -> f64 {
    path.windows(2).map(|w| graph.weight(w[0], w[1])).sum()
}

/// Invert an ergonomic ease into a cost, guarding the degenerate case.
/// Lower cost is always easier.
fn ease_to_cost(ease: f64) -> f64 {
    if !ease.is_finite() || ease < f64::MIN_POSITIVE {
        DEGENERATE_COST
    } else {
        (1.0 / ease).min(DEGENERATE_COST)
    }
}

/// Full ergonomic cost of playing `path` after `previous`: hand displacement
/// from the previous chord, finger count, and internal path span all reduce
/// the ease; the reported cost is its reciprocal.
pub fn cost(graph: &PositionGraph, path: &[Position], previous: &[Position]) -> f64 {
    let dheight = (height(path) - height(previous)).abs();
    let fingers = nfingers(path) as f64;
    let length = path_length(graph, path);

    let ease = laplace(dheight, LAPLACE_B)
        * (1.0 / (1.0 + dheight))
        * (1.0 / (1.0 + fingers))
        * (1.0 / (1.0 + length));

    ease_to_cost(ease)
}

/// Negative log of an ease, clamped so a vanishing ease yields a large
/// finite cost instead of infinity. The decoder sums these along the chain,
/// which multiplies the underlying ease terms the way a probability chain
/// would.
fn ease_to_log_cost(ease: f64) -> f64 {
    -ease.clamp(f64::MIN_POSITIVE, 1.0).ln()
}

/// Intrinsic cost of a path in isolation: finger count and internal span
/// only, independent of neighboring chords. This is the decoder's emission
/// term, in additive log space.
pub fn emission_cost(graph: &PositionGraph, path: &[Position]) -> f64 {
    let fingers = nfingers(path) as f64;
    let length = path_length(graph, path);
    let ease = (1.0 / (1.0 + fingers)) * (1.0 / (1.0 + length));
    ease_to_log_cost(ease)
}

/// Cost of moving the hand between two chord heights, in additive log
/// space, scaled by `TRANSITION_WEIGHT`. This is the decoder's transition
/// term; it reuses the hand-shift terms of `cost` at reduced weight.
pub fn transition_cost(previous_height: f64, height: f64) -> f64 {
    let dheight = (height - previous_height).abs();
    let ease = laplace(dheight, LAPLACE_B) * (1.0 / (1.0 + dheight));
    TRANSITION_WEIGHT * ease_to_log_cost(ease)
}
