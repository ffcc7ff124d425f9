// Pitch map: a 6x6 length/line heatmap of a bowler's deliveries.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::model::round_to;

pub const LENGTHS: [&str; 6] = ["full_toss", "yorker", "full", "good", "short_of_good", "short"];

pub const LINES: [&str; 6] = [
    "wide_outside_off",
    "outside_off",
    "off_stump",
    "middle_stump",
    "leg_stump",
    "outside_leg",
];

/// Frequency multiplier for cells on the preferred length or line.
pub const PREFERRED_BOOST: f64 = 1.5;
pub const PREFERRED_ECONOMY_MEAN: f64 = 5.5;
pub const OTHER_ECONOMY_MEAN: f64 = 7.0;
pub const ECONOMY_STDEV: f64 = 0.8;
pub const MIN_CELL_ECONOMY: f64 = 2.0;
pub const MAX_CELL_ECONOMY: f64 = 15.0;

/// One length/line cell of the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub length: String,
    pub line: String,
    pub balls: u32,
    pub wickets: u32,
    pub economy: f64,
}

/// The length and line a bowler is assumed to favour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PitchPreference {
    pub length: Option<String>,
    pub line: Option<String>,
}

impl PitchPreference {
    pub fn new(length: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            length: Some(length.into()),
            line: Some(line.into()),
        }
    }

    fn matches(&self, length: &str, line: &str) -> bool {
        self.length.as_deref() == Some(length) || self.line.as_deref() == Some(line)
    }
}

/// Split `total` into integer shares proportional to `weights` using the
/// largest-remainder method. Shares always sum to `total`; ties on the
/// remainder go to the earlier index.
pub fn apportion(total: u32, weights: &[f64]) -> Vec<u32> {
    let sum: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if weights.is_empty() || sum <= 0.0 {
        let mut shares = vec![0; weights.len()];
        if let Some(first) = shares.first_mut() {
            *first = total;
        }
        return shares;
    }

    let quotas: Vec<f64> = weights
        .iter()
        .map(|w| w.max(0.0) / sum * f64::from(total))
        .collect();
    let mut shares: Vec<u32> = quotas.iter().map(|q| q.floor() as u32).collect();
    let assigned: u32 = shares.iter().sum();
    let mut leftover = total.saturating_sub(assigned);

    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for i in order {
        if leftover == 0 {
            break;
        }
        shares[i] += 1;
        leftover -= 1;
    }
    shares
}

/// Simulate a pitch map for a bowler's season totals.
///
/// Cell frequencies are `sqrt(U)` (skewed towards 1), boosted on the preferred
/// length or line. Balls and wickets are apportioned by frequency; economy is
/// a clamped Gaussian centred lower on preferred cells.
pub fn pitch_map<R: Rng + ?Sized>(
    rng: &mut R,
    balls: u32,
    wickets: u32,
    preference: &PitchPreference,
) -> Vec<Cell> {
    let mut frequencies = Vec::with_capacity(LENGTHS.len() * LINES.len());
    let mut preferred = Vec::with_capacity(LENGTHS.len() * LINES.len());
    for length in LENGTHS {
        for line in LINES {
            let is_preferred = preference.matches(length, line);
            let base = rng.gen::<f64>().sqrt();
            frequencies.push(if is_preferred { base * PREFERRED_BOOST } else { base });
            preferred.push(is_preferred);
        }
    }

    let ball_shares = apportion(balls, &frequencies);
    let wicket_shares = apportion(wickets, &frequencies);

    let mut cells = Vec::with_capacity(frequencies.len());
    for (i, length) in LENGTHS.iter().enumerate() {
        for (j, line) in LINES.iter().enumerate() {
            let k = i * LINES.len() + j;
            let mean = if preferred[k] {
                PREFERRED_ECONOMY_MEAN
            } else {
                OTHER_ECONOMY_MEAN
            };
            let economy = match Normal::new(mean, ECONOMY_STDEV) {
                Ok(normal) => normal.sample(rng),
                Err(_) => mean,
            };
            cells.push(Cell {
                length: (*length).to_string(),
                line: (*line).to_string(),
                balls: ball_shares[k],
                wickets: wicket_shares[k],
                economy: round_to(economy.clamp(MIN_CELL_ECONOMY, MAX_CELL_ECONOMY), 2),
            });
        }
    }
    cells
}
