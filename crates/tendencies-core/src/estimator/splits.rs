// Placeholder opponent splits.
//
// Bowler type and batter handedness are not joined onto the delivery data,
// so these splits are season figures scaled by a bounded random factor.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::round_to;

/// Inclusive multiplier range applied to a season figure.
pub type Range = (f64, f64);

pub const VS_PACE: Range = (0.90, 1.10);
pub const VS_SPIN: Range = (0.95, 1.15);
pub const VS_LEFT_ARM_AVERAGE: Range = (0.88, 1.05);
pub const VS_LEFT_ARM_STRIKE_RATE: Range = (0.90, 1.08);
pub const VS_RIGHT_ARM_AVERAGE: Range = (0.95, 1.08);
pub const VS_RIGHT_ARM_STRIKE_RATE: Range = (0.95, 1.05);

pub const VS_RHB_ECONOMY: Range = (0.92, 1.05);
pub const VS_LHB_ECONOMY: Range = (0.95, 1.08);
/// Share of a bowler's wickets attributed to right-handed batters. The
/// left-handed split gets the rest (nominally 35%).
pub const RHB_WICKET_SHARE: f64 = 0.65;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingSplit {
    pub average: f64,
    pub strike_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingSplit {
    pub economy: f64,
    pub wickets: u32,
}

/// All four batting splits.
#[derive(Debug, Clone, PartialEq)]
pub struct BattingSplits {
    pub vs_pace: BattingSplit,
    pub vs_spin: BattingSplit,
    pub vs_left_arm: BattingSplit,
    pub vs_right_arm: BattingSplit,
}

fn factor<R: Rng + ?Sized>(rng: &mut R, (lo, hi): Range) -> f64 {
    rng.gen_range(lo..=hi)
}

/// Pace and spin reuse one factor for average and strike rate; the arm
/// splits perturb each figure separately.
pub fn batting_splits<R: Rng + ?Sized>(rng: &mut R, average: f64, strike_rate: f64) -> BattingSplits {
    let pace = factor(rng, VS_PACE);
    let spin = factor(rng, VS_SPIN);
    let vs_left_arm = BattingSplit {
        average: round_to(average * factor(rng, VS_LEFT_ARM_AVERAGE), 2),
        strike_rate: round_to(strike_rate * factor(rng, VS_LEFT_ARM_STRIKE_RATE), 2),
    };
    let vs_right_arm = BattingSplit {
        average: round_to(average * factor(rng, VS_RIGHT_ARM_AVERAGE), 2),
        strike_rate: round_to(strike_rate * factor(rng, VS_RIGHT_ARM_STRIKE_RATE), 2),
    };
    BattingSplits {
        vs_pace: BattingSplit {
            average: round_to(average * pace, 2),
            strike_rate: round_to(strike_rate * pace, 2),
        },
        vs_spin: BattingSplit {
            average: round_to(average * spin, 2),
            strike_rate: round_to(strike_rate * spin, 2),
        },
        vs_left_arm,
        vs_right_arm,
    }
}

/// Right- and left-hand batter splits for a bowler.
pub fn bowling_splits<R: Rng + ?Sized>(
    rng: &mut R,
    economy: f64,
    wickets: u32,
) -> (BowlingSplit, BowlingSplit) {
    // Half-to-even on the right-hand share; left-handers take the remainder.
    let rhb_wickets =
        ((f64::from(wickets) * RHB_WICKET_SHARE).round_ties_even() as u32).min(wickets);
    let vs_rhb = BowlingSplit {
        economy: round_to(economy * factor(rng, VS_RHB_ECONOMY), 2),
        wickets: rhb_wickets,
    };
    let vs_lhb = BowlingSplit {
        economy: round_to(economy * factor(rng, VS_LHB_ECONOMY), 2),
        wickets: wickets - rhb_wickets,
    };
    (vs_rhb, vs_lhb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn within(value: f64, base: f64, (lo, hi): Range) -> bool {
        // Allow for the 2dp rounding on either edge.
        value >= base * lo - 0.005 && value <= base * hi + 0.005
    }

    #[test]
    fn batting_splits_stay_in_range() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let s = batting_splits(&mut rng, 40.0, 130.0);
            assert!(within(s.vs_pace.average, 40.0, VS_PACE));
            assert!(within(s.vs_pace.strike_rate, 130.0, VS_PACE));
            assert!(within(s.vs_spin.average, 40.0, VS_SPIN));
            assert!(within(s.vs_left_arm.average, 40.0, VS_LEFT_ARM_AVERAGE));
            assert!(within(s.vs_left_arm.strike_rate, 130.0, VS_LEFT_ARM_STRIKE_RATE));
            assert!(within(s.vs_right_arm.average, 40.0, VS_RIGHT_ARM_AVERAGE));
            assert!(within(s.vs_right_arm.strike_rate, 130.0, VS_RIGHT_ARM_STRIKE_RATE));
        }
    }

    #[test]
    fn pace_factor_shared_between_average_and_strike_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let s = batting_splits(&mut rng, 50.0, 100.0);
        assert!((s.vs_pace.strike_rate - 2.0 * s.vs_pace.average).abs() < 0.02);
    }

    #[test]
    fn bowling_wickets_use_fixed_split() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (rhb, lhb) = bowling_splits(&mut rng, 7.5, 20);
        assert_eq!(rhb.wickets, 13);
        assert_eq!(lhb.wickets, 7);
        assert!(within(rhb.economy, 7.5, VS_RHB_ECONOMY));
        assert!(within(lhb.economy, 7.5, VS_LHB_ECONOMY));
    }

    #[test]
    fn wicket_split_sums_to_total() {
        for wickets in 0..=120 {
            let mut rng = ChaCha8Rng::seed_from_u64(u64::from(wickets));
            let (rhb, lhb) = bowling_splits(&mut rng, 7.5, wickets);
            assert_eq!(rhb.wickets + lhb.wickets, wickets, "{wickets} wickets");
        }
    }

    #[test]
    fn wicket_split_rounds_half_to_even() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let shares: Vec<(u32, u32)> = [10, 30, 50]
            .into_iter()
            .map(|w| {
                let (rhb, lhb) = bowling_splits(&mut rng, 7.5, w);
                (rhb.wickets, lhb.wickets)
            })
            .collect();
        assert_eq!(shares, vec![(6, 4), (20, 10), (32, 18)]);
    }

    #[test]
    fn zero_wickets_zero_split() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (rhb, lhb) = bowling_splits(&mut rng, 0.0, 0);
        assert_eq!((rhb.wickets, lhb.wickets), (0, 0));
        assert_eq!(rhb.economy, 0.0);
    }
}
