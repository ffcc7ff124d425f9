// Game phase classification by over number.

/// Inclusive over range for a named phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRange {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
}

const fn range(name: &'static str, start: u32, end: u32) -> PhaseRange {
    PhaseRange { name, start, end }
}

const TEST_PHASES: &[PhaseRange] = &[
    range("first_session", 1, 30),
    range("second_session", 31, 60),
    range("third_session", 61, 90),
];

const ODI_PHASES: &[PhaseRange] = &[
    range("powerplay", 1, 10),
    range("middle", 11, 40),
    range("death", 41, 50),
];

const T20_PHASES: &[PhaseRange] = &[
    range("powerplay", 1, 6),
    range("middle", 7, 15),
    range("death", 16, 20),
];

/// Format keys with a phase table of their own. Anything else uses ODI phases.
pub const KNOWN_FORMATS: &[&str] = &["tests", "odis", "t20is", "ipl", "bbl", "psl"];

/// Ordered phase table for a format key.
pub fn phases_for(format: &str) -> &'static [PhaseRange] {
    match format {
        "tests" => TEST_PHASES,
        "t20is" | "ipl" | "bbl" | "psl" => T20_PHASES,
        _ => ODI_PHASES,
    }
}

/// Map a 1-based over number to its phase name.
///
/// Overs outside every declared range (over 0, over 21 of a T20 super over,
/// day-two overs in a Test) fall into the last declared phase.
pub fn phase(over: u32, format: &str) -> &'static str {
    let table = phases_for(format);
    table
        .iter()
        .find(|r| (r.start..=r.end).contains(&over))
        .or_else(|| table.last())
        .map(|r| r.name)
        .unwrap_or("unknown")
}
