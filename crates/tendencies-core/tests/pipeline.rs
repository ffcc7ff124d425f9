// End-to-end pipeline tests over Cricsheet-style CSVs in a temp directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tendencies_core::config::Config;
use tendencies_core::pipeline;

const HEADER: &str = "match_id,season,start_date,venue,innings,ball,batting_team,bowling_team,striker,non_striker,bowler,runs_off_bat,extras,wides,noballs,byes,legbyes,penalty,wicket_type,player_dismissed,other_wicket_type,other_player_dismissed";

struct Innings<'a> {
    innings: u32,
    batting: &'a str,
    bowling: &'a str,
    striker: &'a str,
}

/// One CSV row for legal ball `i` (0-based) of an innings.
fn row(match_id: &str, inn: &Innings, i: usize, bowler: &str, runs: u32) -> String {
    format!(
        "{match_id},2024,2024-02-01,Ground,{},{}.{},{},{},{},Partner,{bowler},{runs},0,,,,,,,,,",
        inn.innings,
        i / 6,
        i % 6 + 1,
        inn.batting,
        inn.bowling,
        inn.striker,
    )
}

fn write_csv(dir: &Path, file: &str, rows: &[String]) {
    let mut text = String::from(HEADER);
    for r in rows {
        text.push('\n');
        text.push_str(r);
    }
    fs::write(dir.join(file), text).unwrap();
}

/// Two matches plus an info file and one malformed file:
///
/// - 1001, innings 1: V Kohli faces 60 balls (7 runs per over); MA Starc bowls
///   overs 1-5, A Zampa overs 6-10.
/// - 1001, innings 2: S Short faces 49 balls; JJ Bumrah bowls 30, Part Timer 19.
/// - 1002: E Fifty faces 50 singles from MA Starc.
fn seed_raw(raw: &Path) {
    let dir = raw.join("t20is");
    fs::create_dir_all(&dir).unwrap();

    let first = Innings {
        innings: 1,
        batting: "India",
        bowling: "Australia",
        striker: "V Kohli",
    };
    let pattern = [1, 0, 1, 0, 1, 4];
    let mut rows: Vec<String> = (0..60)
        .map(|i| {
            let bowler = if i < 30 { "MA Starc" } else { "A Zampa" };
            row("1001", &first, i, bowler, pattern[i % 6])
        })
        .collect();

    let second = Innings {
        innings: 2,
        batting: "Australia",
        bowling: "India",
        striker: "S Short",
    };
    rows.extend((0..49).map(|i| {
        let bowler = if i < 30 { "JJ Bumrah" } else { "Part Timer" };
        row("1001", &second, i, bowler, 1)
    }));
    write_csv(&dir, "1001.csv", &rows);

    let third = Innings {
        innings: 1,
        batting: "India",
        bowling: "Australia",
        striker: "E Fifty",
    };
    let rows: Vec<String> = (0..50).map(|i| row("1002", &third, i, "MA Starc", 1)).collect();
    write_csv(&dir, "1002.csv", &rows);

    fs::write(dir.join("1001_info.csv"), "version,2.2.0\ninfo,team,India\n").unwrap();
    write_csv(
        &dir,
        "9999.csv",
        &["9999,2024,2024-02-02,Ground,1,0.1,India,Australia,X,Y,Z,four,0,,,,,,,,,".to_string()],
    );
}

fn config_for(root: &Path, seed: u64, parallel: bool) -> Config {
    let mut config = Config::new(root.join("raw"), root.join("processed"));
    config.formats = vec!["t20is".to_string(), "odis".to_string()];
    config.seed = Some(seed);
    config.parallel = parallel;
    config
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (e.file_name().to_string_lossy().into_owned(), fs::read(e.path()).unwrap())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[test]
fn writes_accepted_profiles_only() {
    let tmp = tempfile::tempdir().unwrap();
    seed_raw(&tmp.path().join("raw"));
    let config = config_for(tmp.path(), 42, false);

    let summary = pipeline::run(&config).unwrap();

    assert_eq!(summary.skipped_formats, vec!["odis".to_string()]);
    assert_eq!(summary.formats.len(), 1);
    let t20 = &summary.formats[0];
    assert_eq!(t20.format, "t20is");
    assert_eq!(t20.files_loaded, 2);
    assert_eq!(t20.files_skipped, 1);
    assert_eq!(t20.deliveries, 159);
    assert_eq!(t20.batters_written, 2);
    assert_eq!(t20.bowlers_written, 3);

    let files: Vec<String> = snapshot(&config.processed_dir).into_keys().collect();
    assert_eq!(
        files,
        vec![
            "a_zampa_t20is_bowl.json",
            "e_fifty_t20is_bat.json",
            "index.json",
            "jj_bumrah_t20is_bowl.json",
            "ma_starc_t20is_bowl.json",
            "v_kohli_t20is_bat.json",
        ]
    );
}

#[test]
fn batting_profile_contents() {
    let tmp = tempfile::tempdir().unwrap();
    seed_raw(&tmp.path().join("raw"));
    let config = config_for(tmp.path(), 42, false);
    pipeline::run(&config).unwrap();

    let p = read_json(&config.processed_dir.join("v_kohli_t20is_bat.json"));
    assert_eq!(p["name"], "V Kohli");
    assert_eq!(p["team"], "India");
    assert_eq!(p["format"], "t20is");
    assert_eq!(p["role"], "batter");
    assert_eq!(p["stats"]["runs"], 70);
    assert_eq!(p["stats"]["balls_faced"], 60);
    assert_eq!(p["stats"]["fours"], 10);
    assert_eq!(p["stats"]["strike_rate"], 116.67);
    assert_eq!(p["provenance"]["source"], "cricsheet");

    let phases = p["phases"].as_object().unwrap();
    let keys: Vec<&str> = phases.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["middle", "powerplay"]);
    assert_eq!(p["phases"]["powerplay"]["balls"], 36);

    let zones = p["wagon_wheel"].as_array().unwrap();
    assert_eq!(zones.len(), 9);
    let runs: u64 = zones.iter().map(|z| z["runs"].as_u64().unwrap()).sum();
    let fours: u64 = zones.iter().map(|z| z["fours"].as_u64().unwrap()).sum();
    assert_eq!(runs, 70);
    assert_eq!(fours, 10);
}

#[test]
fn wicketless_bowler_has_null_average() {
    let tmp = tempfile::tempdir().unwrap();
    seed_raw(&tmp.path().join("raw"));
    let config = config_for(tmp.path(), 42, false);
    pipeline::run(&config).unwrap();

    let p = read_json(&config.processed_dir.join("ma_starc_t20is_bowl.json"));
    assert_eq!(p["team"], "Australia");
    assert_eq!(p["matches"], 2);
    assert_eq!(p["stats"]["balls"], 80);
    assert_eq!(p["stats"]["overs"], 13.3);
    assert_eq!(p["stats"]["runs_conceded"], 85);
    assert_eq!(p["stats"]["wickets"], 0);
    assert!(p["stats"]["average"].is_null());
    assert!(p["stats"]["strike_rate"].is_null());

    let cells = p["pitch_map"].as_array().unwrap();
    assert_eq!(cells.len(), 36);
    let balls: u64 = cells.iter().map(|c| c["balls"].as_u64().unwrap()).sum();
    assert_eq!(balls, 80);
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

#[test]
fn index_lists_each_player_once() {
    let tmp = tempfile::tempdir().unwrap();
    seed_raw(&tmp.path().join("raw"));
    let config = config_for(tmp.path(), 42, false);
    let summary = pipeline::run(&config).unwrap();
    assert_eq!(summary.teams, 2);

    let index = read_json(&summary.index_path);
    assert_eq!(
        index,
        serde_json::json!({
            "Australia": {"t20is": {"batters": [], "bowlers": ["A Zampa", "MA Starc"]}},
            "India": {"t20is": {"batters": ["E Fifty", "V Kohli"], "bowlers": ["JJ Bumrah"]}},
        })
    );
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn rerun_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    seed_raw(&tmp.path().join("raw"));
    let config = config_for(tmp.path(), 42, false);

    pipeline::run(&config).unwrap();
    let first = snapshot(&config.processed_dir);
    pipeline::run(&config).unwrap();
    let second = snapshot(&config.processed_dir);
    assert_eq!(first, second);
}

#[test]
fn parallel_matches_serial() {
    let serial = tempfile::tempdir().unwrap();
    seed_raw(&serial.path().join("raw"));
    let config = config_for(serial.path(), 7, false);
    pipeline::run(&config).unwrap();

    let parallel = tempfile::tempdir().unwrap();
    seed_raw(&parallel.path().join("raw"));
    let par_config = config_for(parallel.path(), 7, true);
    pipeline::run(&par_config).unwrap();

    assert_eq!(
        snapshot(&config.processed_dir),
        snapshot(&par_config.processed_dir)
    );
}

#[test]
fn seed_changes_synthetic_fields_only() {
    let a = tempfile::tempdir().unwrap();
    seed_raw(&a.path().join("raw"));
    let config_a = config_for(a.path(), 1, false);
    pipeline::run(&config_a).unwrap();

    let b = tempfile::tempdir().unwrap();
    seed_raw(&b.path().join("raw"));
    let config_b = config_for(b.path(), 2, false);
    pipeline::run(&config_b).unwrap();

    let pa = read_json(&config_a.processed_dir.join("v_kohli_t20is_bat.json"));
    let pb = read_json(&config_b.processed_dir.join("v_kohli_t20is_bat.json"));
    assert_eq!(pa["stats"], pb["stats"]);
    assert_eq!(pa["phases"], pb["phases"]);
    assert_ne!(pa["vs_pace"], pb["vs_pace"]);
}
