// Delivery-level data model shared by the loader and the aggregators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Wicket types that are not credited to the bowler.
pub const UNCREDITED_WICKETS: [&str; 3] = ["run out", "retired hurt", "obstructing the field"];

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which side of the ball a profile describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batter,
    Bowler,
}

impl Role {
    /// Short code used in artifact file names (`bat` / `bowl`).
    pub fn short_code(&self) -> &'static str {
        match self {
            Role::Batter => "bat",
            Role::Bowler => "bowl",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Batter => "batter",
            Role::Bowler => "bowler",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Extras conceded on a single delivery, broken down by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extras {
    pub wides: u32,
    pub noballs: u32,
    pub byes: u32,
    pub legbyes: u32,
    pub penalty: u32,
}

impl Extras {
    pub fn total(&self) -> u32 {
        self.wides + self.noballs + self.byes + self.legbyes + self.penalty
    }
}

/// One ball bowled. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Position of this row in the concatenated table for its format.
    pub row: usize,
    pub match_id: String,
    pub start_date: Option<NaiveDate>,
    pub innings: u32,
    /// 1-based over number.
    pub over: u32,
    pub ball_in_over: u32,
    pub striker: String,
    pub non_striker: String,
    pub bowler: String,
    pub batting_team: String,
    pub bowling_team: String,
    pub runs_off_bat: u32,
    pub extras: Extras,
    pub wicket_type: Option<String>,
    pub player_dismissed: Option<String>,
    pub other_wicket_type: Option<String>,
    pub other_player_dismissed: Option<String>,
}

impl Delivery {
    /// A legal delivery is any ball without a wide recorded.
    pub fn is_legal(&self) -> bool {
        self.extras.wides == 0
    }

    pub fn is_four(&self) -> bool {
        self.runs_off_bat == 4
    }

    pub fn is_six(&self) -> bool {
        self.runs_off_bat == 6
    }

    pub fn is_boundary(&self) -> bool {
        self.is_four() || self.is_six()
    }

    /// Runs charged to the bowler: off the bat plus every extra.
    pub fn runs_conceded(&self) -> u32 {
        self.runs_off_bat + self.extras.total()
    }

    /// Whether `name` was dismissed on this ball.
    pub fn dismisses(&self, name: &str) -> bool {
        self.player_dismissed.as_deref() == Some(name)
    }

    /// The wicket type if this ball produced a wicket credited to the bowler.
    pub fn credited_wicket(&self) -> Option<&str> {
        self.wicket_type
            .as_deref()
            .filter(|kind| !UNCREDITED_WICKETS.contains(kind))
    }
}

// ---------------------------------------------------------------------------
// DeliveryTable
// ---------------------------------------------------------------------------

/// All deliveries for one format, concatenated across match files.
#[derive(Debug, Clone, Default)]
pub struct DeliveryTable {
    format: String,
    deliveries: Vec<Delivery>,
}

impl DeliveryTable {
    /// Build a table, renumbering `row` to each delivery's position.
    pub fn new(format: impl Into<String>, mut deliveries: Vec<Delivery>) -> Self {
        for (i, d) in deliveries.iter_mut().enumerate() {
            d.row = i;
        }
        Self {
            format: format.into(),
            deliveries,
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Deliveries faced by `name`.
    pub fn faced_by<'a>(&'a self, name: &str) -> Vec<&'a Delivery> {
        self.deliveries.iter().filter(|d| d.striker == name).collect()
    }

    /// Deliveries bowled by `name`.
    pub fn bowled_by<'a>(&'a self, name: &str) -> Vec<&'a Delivery> {
        self.deliveries.iter().filter(|d| d.bowler == name).collect()
    }

    /// Group deliveries by striker in a single pass, preserving table order
    /// within each group.
    pub fn by_striker(&self) -> HashMap<&str, Vec<&Delivery>> {
        let mut groups: HashMap<&str, Vec<&Delivery>> = HashMap::new();
        for d in &self.deliveries {
            if !d.striker.is_empty() {
                groups.entry(d.striker.as_str()).or_default().push(d);
            }
        }
        groups
    }

    /// Group deliveries by bowler in a single pass.
    pub fn by_bowler(&self) -> HashMap<&str, Vec<&Delivery>> {
        let mut groups: HashMap<&str, Vec<&Delivery>> = HashMap::new();
        for d in &self.deliveries {
            if !d.bowler.is_empty() {
                groups.entry(d.bowler.as_str()).or_default().push(d);
            }
        }
        groups
    }
}

// ---------------------------------------------------------------------------
// Profile building blocks
// ---------------------------------------------------------------------------

/// First and last match dates covered by a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl Span {
    /// `None` when no delivery carries a date.
    pub fn of(deliveries: &[&Delivery]) -> Option<Self> {
        let mut dates = deliveries.iter().filter_map(|d| d.start_date);
        let first = dates.next()?;
        let (first, last) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { first, last })
    }
}

/// Number of distinct matches among `deliveries`.
pub fn match_count(deliveries: &[&Delivery]) -> usize {
    let mut ids: Vec<&str> = deliveries.iter().map(|d| d.match_id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

/// Marks which profile fields are simulated rather than measured, so
/// consumers never mistake them for ball-tracking data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub synthetic: Vec<String>,
}

impl Provenance {
    pub fn cricsheet(synthetic: &[&str]) -> Self {
        Self {
            source: "cricsheet".into(),
            synthetic: synthetic.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Most frequent value, ties broken by lexical order. `None` for no input.
pub(crate) fn mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        if !v.is_empty() {
            *counts.entry(v).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(v, _)| v.to_string())
}

/// Round to `places` decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Percentage `part / whole * 100` rounded to 2 places, 0 when `whole` is 0.
pub(crate) fn pct(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round_to(part as f64 / whole as f64 * 100.0, 2)
    }
}
