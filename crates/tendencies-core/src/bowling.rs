// Bowling profile aggregation.
//
// Average and strike rate are `None` (serialized as null) for a bowler
// without a credited wicket, while economy and the percentage fields fall
// back to zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::estimator::pitch::{self, PitchPreference};
use crate::estimator::splits::{self, BowlingSplit};
use crate::estimator::{Cell, SeedSource, Stream};
use crate::model::{match_count, mode, pct, round_to, Delivery, DeliveryTable, Provenance, Role, Span};
use crate::phase::phase;

pub const BALLS_PER_OVER: u32 = 6;

const SYNTHETIC_FIELDS: [&str; 3] = ["pitch_map", "vs_rhb", "vs_lhb"];

// ---------------------------------------------------------------------------
// Profile types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingStats {
    pub balls: u32,
    pub overs: f64,
    pub wickets: u32,
    pub runs_conceded: u32,
    pub economy: f64,
    pub average: Option<f64>,
    pub strike_rate: Option<f64>,
    pub boundary_pct: f64,
    pub dot_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingPhaseStats {
    pub overs: f64,
    pub runs: u32,
    pub wickets: u32,
    pub economy: f64,
    pub average: Option<f64>,
    pub strike_rate: Option<f64>,
    pub boundary_pct: f64,
    pub dot_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingProfile {
    pub name: String,
    pub team: String,
    pub country: String,
    pub format: String,
    pub role: Role,
    pub matches: usize,
    pub span: Option<Span>,
    pub provenance: Provenance,
    pub stats: BowlingStats,
    pub phases: BTreeMap<String, BowlingPhaseStats>,
    pub wicket_types: BTreeMap<String, u32>,
    pub pitch_map: Vec<Cell>,
    pub vs_rhb: BowlingSplit,
    pub vs_lhb: BowlingSplit,
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    legal: u32,
    runs: u32,
    wickets: u32,
    boundaries: u32,
    dots: u32,
}

impl Tally {
    fn of<'a>(deliveries: impl IntoIterator<Item = &'a Delivery>) -> Self {
        let mut t = Tally::default();
        for d in deliveries {
            t.runs += d.runs_conceded();
            if d.credited_wicket().is_some() {
                t.wickets += 1;
            }
            if d.is_legal() {
                t.legal += 1;
                if d.is_boundary() {
                    t.boundaries += 1;
                }
                if d.runs_conceded() == 0 {
                    t.dots += 1;
                }
            }
        }
        t
    }

    /// Overs in decimal notation: 21 legal balls is 3.5 overs, not "3.3".
    fn exact_overs(&self) -> f64 {
        f64::from(self.legal) / f64::from(BALLS_PER_OVER)
    }

    fn overs(&self) -> f64 {
        round_to(self.exact_overs(), 1)
    }

    fn economy(&self) -> f64 {
        if self.legal == 0 {
            0.0
        } else {
            round_to(f64::from(self.runs) / self.exact_overs(), 2)
        }
    }

    fn average(&self) -> Option<f64> {
        (self.wickets > 0).then(|| round_to(f64::from(self.runs) / f64::from(self.wickets), 2))
    }

    fn strike_rate(&self) -> Option<f64> {
        (self.wickets > 0).then(|| round_to(f64::from(self.legal) / f64::from(self.wickets), 2))
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Build `name`'s bowling profile from every delivery in `table`.
///
/// Returns `None` when the player never bowled.
pub fn aggregate(
    name: &str,
    table: &DeliveryTable,
    seeds: &SeedSource,
    preference: &PitchPreference,
) -> Option<BowlingProfile> {
    let bowled = table.bowled_by(name);
    build_profile(name, table.format(), &bowled, seeds, preference)
}

/// Build a bowling profile from the deliveries `name` bowled.
pub fn build_profile(
    name: &str,
    format: &str,
    bowled: &[&Delivery],
    seeds: &SeedSource,
    preference: &PitchPreference,
) -> Option<BowlingProfile> {
    if bowled.is_empty() {
        return None;
    }

    let team = mode(bowled.iter().map(|d| d.bowling_team.as_str()))
        .unwrap_or_else(|| "Unknown".to_string());
    let total = Tally::of(bowled.iter().copied());

    let stats = BowlingStats {
        balls: total.legal,
        overs: total.overs(),
        wickets: total.wickets,
        runs_conceded: total.runs,
        economy: total.economy(),
        average: total.average(),
        strike_rate: total.strike_rate(),
        boundary_pct: pct(total.boundaries, total.legal),
        dot_pct: pct(total.dots, total.legal),
    };

    let mut by_phase: BTreeMap<&str, Vec<&Delivery>> = BTreeMap::new();
    for d in bowled {
        by_phase.entry(phase(d.over, format)).or_default().push(*d);
    }
    let phases = by_phase
        .into_iter()
        .map(|(ph, rows)| {
            let t = Tally::of(rows);
            let stats = BowlingPhaseStats {
                overs: t.overs(),
                runs: t.runs,
                wickets: t.wickets,
                economy: t.economy(),
                average: t.average(),
                strike_rate: t.strike_rate(),
                boundary_pct: pct(t.boundaries, t.legal),
                dot_pct: pct(t.dots, t.legal),
            };
            (ph.to_string(), stats)
        })
        .collect();

    let mut wicket_types = BTreeMap::new();
    for kind in bowled.iter().filter_map(|d| d.credited_wicket()) {
        *wicket_types.entry(kind.to_string()).or_insert(0) += 1;
    }

    let mut pitch_rng = seeds.rng(name, format, Role::Bowler, Stream::PitchMap);
    let pitch_map = pitch::pitch_map(&mut pitch_rng, stats.balls, stats.wickets, preference);

    let mut split_rng = seeds.rng(name, format, Role::Bowler, Stream::OpponentSplits);
    let (vs_rhb, vs_lhb) = splits::bowling_splits(&mut split_rng, stats.economy, stats.wickets);

    Some(BowlingProfile {
        name: name.to_string(),
        team,
        country: String::new(),
        format: format.to_string(),
        role: Role::Bowler,
        matches: match_count(bowled),
        span: Span::of(bowled),
        provenance: Provenance::cricsheet(&SYNTHETIC_FIELDS),
        stats,
        phases,
        wicket_types,
        pitch_map,
        vs_rhb,
        vs_lhb,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
