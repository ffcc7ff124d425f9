// Batting profile aggregation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::estimator::splits::{self, BattingSplit};
use crate::estimator::wagon::{self, ScoringTotals, ZONE_COUNT};
use crate::estimator::{SeedSource, Stream, Zone};
use crate::model::{match_count, mode, pct, round_to, Delivery, DeliveryTable, Provenance, Role, Span};
use crate::phase::phase;

/// Rows of the delivery table per "innings" window when counting hundreds
/// and fifties. The table has no innings boundary field, so a batter's runs
/// are summed per fixed block of table rows instead.
pub const INNINGS_WINDOW: usize = 200;

const SYNTHETIC_FIELDS: [&str; 5] = ["wagon_wheel", "vs_pace", "vs_spin", "vs_left_arm", "vs_right_arm"];

// ---------------------------------------------------------------------------
// Profile types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingStats {
    pub runs: u32,
    pub balls_faced: u32,
    pub innings: u32,
    pub dismissals: u32,
    pub not_outs: u32,
    pub average: f64,
    pub strike_rate: f64,
    pub hundreds: u32,
    pub fifties: u32,
    pub fours: u32,
    pub sixes: u32,
    pub boundary_pct: f64,
    pub dot_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingPhaseStats {
    pub runs: u32,
    pub balls: u32,
    pub dismissals: u32,
    pub average: f64,
    pub strike_rate: f64,
    pub boundary_pct: f64,
    pub dot_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingProfile {
    pub name: String,
    pub team: String,
    pub country: String,
    pub format: String,
    pub role: Role,
    pub matches: usize,
    pub span: Option<Span>,
    pub provenance: Provenance,
    pub stats: BattingStats,
    pub phases: BTreeMap<String, BattingPhaseStats>,
    pub dismissals_breakdown: BTreeMap<String, u32>,
    pub wagon_wheel: Vec<Zone>,
    pub vs_pace: BattingSplit,
    pub vs_spin: BattingSplit,
    pub vs_left_arm: BattingSplit,
    pub vs_right_arm: BattingSplit,
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

/// Raw counts over a set of deliveries faced by one batter.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    runs: u32,
    balls: u32,
    dismissals: u32,
    fours: u32,
    sixes: u32,
    boundaries: u32,
    dots: u32,
}

impl Tally {
    fn of<'a>(name: &str, deliveries: impl IntoIterator<Item = &'a Delivery>) -> Self {
        let mut t = Tally::default();
        for d in deliveries {
            t.runs += d.runs_off_bat;
            if d.is_four() {
                t.fours += 1;
            }
            if d.is_six() {
                t.sixes += 1;
            }
            if d.dismisses(name) {
                t.dismissals += 1;
            }
            if d.is_legal() {
                t.balls += 1;
                if d.is_boundary() {
                    t.boundaries += 1;
                }
                if d.runs_off_bat == 0 {
                    t.dots += 1;
                }
            }
        }
        t
    }

    /// Runs per dismissal; with no dismissals the runs themselves.
    fn average(&self) -> f64 {
        if self.dismissals > 0 {
            round_to(f64::from(self.runs) / f64::from(self.dismissals), 2)
        } else {
            f64::from(self.runs)
        }
    }

    fn strike_rate(&self) -> f64 {
        if self.balls > 0 {
            round_to(f64::from(self.runs) / f64::from(self.balls) * 100.0, 2)
        } else {
            0.0
        }
    }
}

/// Hundreds and fifties over fixed windows of table rows.
fn milestones(deliveries: &[&Delivery]) -> (u32, u32) {
    let mut windows: BTreeMap<usize, u32> = BTreeMap::new();
    for d in deliveries {
        *windows.entry(d.row / INNINGS_WINDOW).or_insert(0) += d.runs_off_bat;
    }
    let hundreds = windows.values().filter(|r| **r >= 100).count() as u32;
    let fifties = windows.values().filter(|r| (50..=99).contains(*r)).count() as u32;
    (hundreds, fifties)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Build `name`'s batting profile from every delivery in `table`.
///
/// Returns `None` when the player never faced a ball.
pub fn aggregate(
    name: &str,
    table: &DeliveryTable,
    seeds: &SeedSource,
    zone_weights: &[f64; ZONE_COUNT],
) -> Option<BattingProfile> {
    let faced = table.faced_by(name);
    build_profile(name, table.format(), &faced, seeds, zone_weights)
}

/// Build a batting profile from the deliveries `name` faced as striker.
pub fn build_profile(
    name: &str,
    format: &str,
    faced: &[&Delivery],
    seeds: &SeedSource,
    zone_weights: &[f64; ZONE_COUNT],
) -> Option<BattingProfile> {
    if faced.is_empty() {
        return None;
    }

    let team = mode(faced.iter().map(|d| d.batting_team.as_str()))
        .unwrap_or_else(|| "Unknown".to_string());
    let total = Tally::of(name, faced.iter().copied());
    let (hundreds, fifties) = milestones(faced);
    let innings = total.dismissals + u32::from(total.runs > 0);

    let stats = BattingStats {
        runs: total.runs,
        balls_faced: total.balls,
        innings,
        dismissals: total.dismissals,
        not_outs: innings.saturating_sub(total.dismissals),
        average: total.average(),
        strike_rate: total.strike_rate(),
        hundreds,
        fifties,
        fours: total.fours,
        sixes: total.sixes,
        boundary_pct: pct(total.boundaries, total.balls),
        dot_pct: pct(total.dots, total.balls),
    };

    let mut by_phase: BTreeMap<&str, Vec<&Delivery>> = BTreeMap::new();
    for d in faced {
        by_phase.entry(phase(d.over, format)).or_default().push(*d);
    }
    let phases = by_phase
        .into_iter()
        .map(|(ph, rows)| {
            let t = Tally::of(name, rows);
            let stats = BattingPhaseStats {
                runs: t.runs,
                balls: t.balls,
                dismissals: t.dismissals,
                average: t.average(),
                strike_rate: t.strike_rate(),
                boundary_pct: pct(t.boundaries, t.balls),
                dot_pct: pct(t.dots, t.balls),
            };
            (ph.to_string(), stats)
        })
        .collect();

    let mut dismissals_breakdown = BTreeMap::new();
    for d in faced.iter().filter(|d| d.dismisses(name)) {
        let kind = d.wicket_type.clone().unwrap_or_else(|| "unknown".to_string());
        *dismissals_breakdown.entry(kind).or_insert(0) += 1;
    }

    let mut wheel_rng = seeds.rng(name, format, Role::Batter, Stream::WagonWheel);
    let wagon_wheel = wagon::wagon_wheel(
        &mut wheel_rng,
        ScoringTotals {
            runs: stats.runs,
            fours: stats.fours,
            sixes: stats.sixes,
        },
        zone_weights,
    );

    let mut split_rng = seeds.rng(name, format, Role::Batter, Stream::OpponentSplits);
    let s = splits::batting_splits(&mut split_rng, stats.average, stats.strike_rate);

    Some(BattingProfile {
        name: name.to_string(),
        team,
        country: String::new(),
        format: format.to_string(),
        role: Role::Batter,
        matches: match_count(faced),
        span: Span::of(faced),
        provenance: Provenance::cricsheet(&SYNTHETIC_FIELDS),
        stats,
        phases,
        dismissals_breakdown,
        wagon_wheel,
        vs_pace: s.vs_pace,
        vs_spin: s.vs_spin,
        vs_left_arm: s.vs_left_arm,
        vs_right_arm: s.vs_right_arm,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
