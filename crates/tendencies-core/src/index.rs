// Team -> format -> role membership index.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::Role;

/// Players of one team in one format, by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSets {
    pub batters: BTreeSet<String>,
    pub bowlers: BTreeSet<String>,
}

impl RoleSets {
    fn for_role_mut(&mut self, role: Role) -> &mut BTreeSet<String> {
        match role {
            Role::Batter => &mut self.batters,
            Role::Bowler => &mut self.bowlers,
        }
    }

    fn for_role(&self, role: Role) -> &BTreeSet<String> {
        match role {
            Role::Batter => &self.batters,
            Role::Bowler => &self.bowlers,
        }
    }
}

/// One membership row of the index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexEntry {
    pub team: String,
    pub format: String,
    pub role: Role,
    pub name: String,
}

/// Accumulates accepted players. Membership is a set at every level, so a
/// player can never be listed twice under the same team, format and role.
///
/// Serializes as `{team: {format: {batters: [..], bowlers: [..]}}}` with
/// every level sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexBuilder {
    teams: BTreeMap<String, BTreeMap<String, RoleSets>>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a player. Returns `false` if they were already listed.
    pub fn insert(&mut self, team: &str, format: &str, role: Role, name: &str) -> bool {
        self.teams
            .entry(team.to_string())
            .or_default()
            .entry(format.to_string())
            .or_default()
            .for_role_mut(role)
            .insert(name.to_string())
    }

    pub fn contains(&self, team: &str, format: &str, role: Role, name: &str) -> bool {
        self.teams
            .get(team)
            .and_then(|formats| formats.get(format))
            .is_some_and(|sets| sets.for_role(role).contains(name))
    }

    /// Fold another builder (typically one format's worth) into this one.
    pub fn merge(&mut self, other: IndexBuilder) {
        for (team, formats) in other.teams {
            let ours = self.teams.entry(team).or_default();
            for (format, sets) in formats {
                let target = ours.entry(format).or_default();
                target.batters.extend(sets.batters);
                target.bowlers.extend(sets.bowlers);
            }
        }
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get(&self, team: &str, format: &str) -> Option<&RoleSets> {
        self.teams.get(team).and_then(|formats| formats.get(format))
    }

    /// Every membership row, sorted by team, format, role, name.
    pub fn entries(&self) -> Vec<IndexEntry> {
        let mut out = Vec::new();
        for (team, formats) in &self.teams {
            for (format, sets) in formats {
                for role in [Role::Batter, Role::Bowler] {
                    for name in sets.for_role(role) {
                        out.push(IndexEntry {
                            team: team.clone(),
                            format: format.clone(),
                            role,
                            name: name.clone(),
                        });
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_deduplicates() {
        let mut idx = IndexBuilder::new();
        assert!(idx.insert("India", "t20is", Role::Batter, "V Kohli"));
        assert!(!idx.insert("India", "t20is", Role::Batter, "V Kohli"));
        assert!(idx.insert("India", "t20is", Role::Bowler, "V Kohli"));
        assert!(idx.insert("India", "odis", Role::Batter, "V Kohli"));
        assert_eq!(idx.entries().len(), 3);
        assert!(idx.contains("India", "odis", Role::Batter, "V Kohli"));
        assert!(!idx.contains("India", "odis", Role::Bowler, "V Kohli"));
    }

    #[test]
    fn merge_unions_without_duplicates() {
        let mut a = IndexBuilder::new();
        a.insert("India", "t20is", Role::Batter, "V Kohli");
        let mut b = IndexBuilder::new();
        b.insert("India", "t20is", Role::Batter, "V Kohli");
        b.insert("India", "t20is", Role::Batter, "RG Sharma");
        b.insert("Australia", "tests", Role::Bowler, "PJ Cummins");

        a.merge(b);
        assert_eq!(a.team_count(), 2);
        let sets = a.get("India", "t20is").unwrap();
        assert_eq!(sets.batters.len(), 2);
        assert_eq!(a.entries().len(), 3);
    }

    #[test]
    fn serializes_as_nested_sorted_map() {
        let mut idx = IndexBuilder::new();
        idx.insert("India", "t20is", Role::Batter, "V Kohli");
        idx.insert("India", "t20is", Role::Batter, "A Sharma");
        idx.insert("Australia", "odis", Role::Bowler, "A Zampa");

        let json = serde_json::to_string(&idx).unwrap();
        assert_eq!(
            json,
            r#"{"Australia":{"odis":{"batters":[],"bowlers":["A Zampa"]}},"India":{"t20is":{"batters":["A Sharma","V Kohli"],"bowlers":[]}}}"#
        );
        let back: IndexBuilder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, idx);
    }
}
