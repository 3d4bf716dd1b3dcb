//! Clustered point scatter around targets.

use super::UniformPointNoise;
use crate::{Pt2, Real};

/// Generate `count` deterministic gaze points clustered around `target`.
///
/// `cluster_idx` selects an independent noise stream per target so that
/// different targets receive uncorrelated scatter.
pub fn scatter_around(
    target: Pt2,
    count: usize,
    noise: &UniformPointNoise,
    cluster_idx: usize,
) -> Vec<Pt2> {
    (0..count)
        .map(|i| {
            let d = noise.sample(cluster_idx, i);
            Pt2::new(target.x + d.x, target.y + d.y)
        })
        .collect()
}

/// A `cols × rows` grid of targets evenly spread over a `width × height`
/// screen, inset by half a cell from each edge.
pub fn grid_targets(cols: usize, rows: usize, width: Real, height: Real) -> Vec<Pt2> {
    let mut targets = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            let x = width * (c as Real + 0.5) / cols as Real;
            let y = height * (r as Real + 0.5) / rows as Real;
            targets.push(Pt2::new(x, y));
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance;

    #[test]
    fn scatter_stays_within_amplitude() {
        let noise = UniformPointNoise {
            seed: 1,
            max_abs: 10.0,
        };
        let target = Pt2::new(500.0, 300.0);
        let points = scatter_around(target, 50, &noise, 0);

        assert_eq!(points.len(), 50);
        for p in &points {
            assert!((p.x - target.x).abs() <= 10.0);
            assert!((p.y - target.y).abs() <= 10.0);
        }
    }

    #[test]
    fn grid_targets_are_inset_and_distinct() {
        let targets = grid_targets(3, 3, 1920.0, 1080.0);
        assert_eq!(targets.len(), 9);
        assert_eq!(targets[0], Pt2::new(320.0, 180.0));
        assert_eq!(targets[8], Pt2::new(1600.0, 900.0));
        for (i, a) in targets.iter().enumerate() {
            for b in targets.iter().skip(i + 1) {
                assert!(distance(a, b) > 1.0);
            }
        }
    }
}
