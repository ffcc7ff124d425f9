// Wagon wheel: scoring-zone allocation by multinomial draw.

use rand::Rng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};

/// Number of scoring zones around the field.
pub const ZONE_COUNT: usize = 9;

/// Zone names and angular boundaries in degrees from straight, in output order.
pub const ZONES: [(&str, f64, f64); ZONE_COUNT] = [
    ("fine_leg", 157.5, 202.5),
    ("square_leg", 112.5, 157.5),
    ("midwicket", 67.5, 112.5),
    ("mid_on", 22.5, 67.5),
    ("straight", -22.5, 22.5),
    ("mid_off", -67.5, -22.5),
    ("cover", -112.5, -67.5),
    ("point", -157.5, -112.5),
    ("third_man", 202.5, 247.5),
];

/// Weights used for every batter without a per-player vector.
pub const GENERIC_ZONE_WEIGHTS: [f64; ZONE_COUNT] =
    [0.08, 0.12, 0.15, 0.10, 0.07, 0.10, 0.18, 0.12, 0.08];

/// One wagon wheel segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub zone: String,
    pub runs: u32,
    pub fours: u32,
    pub sixes: u32,
    pub angle_start: f64,
    pub angle_end: f64,
}

/// Season totals the wagon wheel must reproduce exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringTotals {
    pub runs: u32,
    pub fours: u32,
    pub sixes: u32,
}

/// Split `n` trials across `weights` with a multinomial draw.
///
/// Implemented as a chain of conditional binomials: each category takes a
/// binomial share of what is left, with probability equal to its weight over
/// the remaining weight mass. The final category absorbs the remainder, so
/// the counts always sum to `n`. Weights need not be normalized.
pub fn multinomial<R: Rng + ?Sized>(rng: &mut R, n: u32, weights: &[f64]) -> Vec<u32> {
    let mut counts = vec![0u32; weights.len()];
    if weights.is_empty() {
        return counts;
    }
    let mut remaining = n;
    let mut mass: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    let last = weights.len() - 1;

    for (i, w) in weights.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        if i == last {
            counts[i] = remaining;
            break;
        }
        let w = w.max(0.0);
        let p = if mass > 0.0 { (w / mass).clamp(0.0, 1.0) } else { 0.0 };
        let drawn = match Binomial::new(u64::from(remaining), p) {
            Ok(bin) => bin.sample(rng) as u32,
            Err(_) => 0,
        };
        counts[i] = drawn.min(remaining);
        remaining -= counts[i];
        mass -= w;
    }
    counts
}

/// Allocate runs, fours and sixes across the nine zones.
///
/// Each total is drawn independently from the same weights, so the three
/// sums match `totals` exactly.
pub fn wagon_wheel<R: Rng + ?Sized>(
    rng: &mut R,
    totals: ScoringTotals,
    weights: &[f64; ZONE_COUNT],
) -> Vec<Zone> {
    let runs = multinomial(rng, totals.runs, weights);
    let fours = multinomial(rng, totals.fours, weights);
    let sixes = multinomial(rng, totals.sixes, weights);

    ZONES
        .iter()
        .enumerate()
        .map(|(i, (name, start, end))| Zone {
            zone: (*name).to_string(),
            runs: runs[i],
            fours: fours[i],
            sixes: sixes[i],
            angle_start: *start,
            angle_end: *end,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn zone_sums_match_totals() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let totals = ScoringTotals {
            runs: 1234,
            fours: 101,
            sixes: 17,
        };
        let zones = wagon_wheel(&mut rng, totals, &GENERIC_ZONE_WEIGHTS);
        assert_eq!(zones.len(), ZONE_COUNT);
        assert_eq!(zones.iter().map(|z| z.runs).sum::<u32>(), 1234);
        assert_eq!(zones.iter().map(|z| z.fours).sum::<u32>(), 101);
        assert_eq!(zones.iter().map(|z| z.sixes).sum::<u32>(), 17);
        assert_eq!(zones[4].zone, "straight");
        assert_eq!(zones[8].angle_end, 247.5);
    }

    #[test]
    fn zero_totals_give_empty_zones() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let zones = wagon_wheel(
            &mut rng,
            ScoringTotals {
                runs: 0,
                fours: 0,
                sixes: 0,
            },
            &GENERIC_ZONE_WEIGHTS,
        );
        assert!(zones.iter().all(|z| z.runs == 0 && z.fours == 0 && z.sixes == 0));
    }

    #[test]
    fn zero_weight_zones_stay_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let weights = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let counts = multinomial(&mut rng, 500, &weights);
        assert_eq!(counts.iter().sum::<u32>(), 500);
        for (i, c) in counts.iter().enumerate() {
            if weights[i] == 0.0 {
                assert_eq!(*c, 0, "zone {i}");
            }
        }
    }

    #[test]
    fn same_seed_same_wheel() {
        let totals = ScoringTotals {
            runs: 800,
            fours: 70,
            sixes: 20,
        };
        let a = wagon_wheel(&mut ChaCha8Rng::seed_from_u64(5), totals, &GENERIC_ZONE_WEIGHTS);
        let b = wagon_wheel(&mut ChaCha8Rng::seed_from_u64(5), totals, &GENERIC_ZONE_WEIGHTS);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn multinomial_is_exact(
            n in 0u32..5000,
            seed in any::<u64>(),
            weights in proptest::collection::vec(0.0f64..10.0, 1..12),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let counts = multinomial(&mut rng, n, &weights);
            prop_assert_eq!(counts.len(), weights.len());
            prop_assert_eq!(counts.iter().sum::<u32>(), n);
        }
    }
}
