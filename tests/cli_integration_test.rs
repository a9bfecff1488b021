//! CLI integration tests: config loading, exit codes and command dispatch over
//! mock ports with a temporary data directory.

mod common;

use common::*;
use signaldesk::adapters::json_state_store::{LAST_SEARCH_FILE, MAPPING_FILE};
use signaldesk::cli::{self, Cli, Command, Desk, WatchlistAction};
use signaldesk::domain::config::AppConfig;
use signaldesk::domain::error::SignalError;
use signaldesk::domain::market::{ChangeWindow, RankBy};
use signaldesk::domain::period::Horizon;
use signaldesk::domain::risk_profile::ProfileName;
use signaldesk::domain::universe::Universe;
use std::fs;
use std::io::Write;
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn exit_code(err: &SignalError) -> String {
    // ExitCode doesn't implement PartialEq, so compare the Debug form
    format!("{:?}", ExitCode::from(err))
}

fn desk(dir: &TempDir) -> Desk {
    let config = AppConfig {
        data_dir: dir.path().join("data"),
        ..AppConfig::default()
    };
    let quotes = MockQuotePort::new()
        .with_bars("AIR.PA", generate_bars(date(2024, 1, 1), 60, 100.0, 1.0))
        .with_bars("MC.PA", generate_bars(date(2024, 1, 1), 60, 700.0, -2.0))
        .with_candidates(vec![candidate("AIR.PA", "Airbus SE")]);
    let news = MockNewsPort::new().with_headlines("AIR.PA", &["Airbus: contrat record"]);
    let membership =
        MockMembershipPort::new().with_members(Universe::Cac40, &[("AIR", "Airbus"), ("MC", "LVMH")]);
    Desk::new(config, Box::new(quotes), Box::new(news), Box::new(membership), None).unwrap()
}

#[test]
fn config_file_is_loaded_and_validated() {
    let file = write_temp_ini("[news]\nlang = en\nmax_items = 4\n\n[market]\ntop_n = 3\n");
    let cfg = cli::load_config(Some(file.path())).unwrap();
    assert_eq!(cfg.news_lang, "en");
    assert_eq!(cfg.news_max_items, 4);
    assert_eq!(cfg.top_n, 3);
}

#[test]
fn invalid_config_exits_with_code_2() {
    let file = write_temp_ini("[network]\ntimeout_secs = 600\n");
    let err = cli::load_config(Some(file.path())).unwrap_err();
    assert!(matches!(err, SignalError::ConfigInvalid { .. }));
    assert_eq!(exit_code(&err), format!("{:?}", ExitCode::from(2)));
}

#[test]
fn missing_explicit_config_is_a_parse_error() {
    let err = cli::load_config(Some(std::path::Path::new("/nonexistent/signaldesk.ini"))).unwrap_err();
    assert!(matches!(err, SignalError::ConfigParse { .. }));
}

#[test]
fn unreadable_lexicon_degrades_to_keyword_scoring() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        data_dir: dir.path().join("data"),
        lexicon_path: Some(dir.path().join("vader_lexicon.txt")),
        ..AppConfig::default()
    };
    let desk = Desk::connect(config).unwrap();
    desk.execute(Command::Guess {
        ticker: "air".into(),
    })
    .unwrap();
    desk.execute(Command::Watchlist {
        action: WatchlistAction::Add {
            symbol: "air.pa".into(),
        },
    })
    .unwrap();
    assert_eq!(desk.store.watchlist().unwrap(), vec!["AIR.PA"]);
}

#[test]
fn desk_creates_default_state_documents() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    assert!(dir.path().join("data").join(MAPPING_FILE).exists());
    assert_eq!(desk.store.profile(), ProfileName::Neutral);
    assert_eq!(desk.store.last_search(), "TTE.PA");
}

#[test]
fn resolve_persists_the_verified_guess() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    desk.execute(Command::Resolve {
        identifier: "air".into(),
    })
    .unwrap();
    let mapping = fs::read_to_string(dir.path().join("data").join(MAPPING_FILE)).unwrap();
    assert!(mapping.contains("\"AIR\": \"AIR.PA\""));
}

#[test]
fn unresolved_identifier_exits_with_code_4() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    let err = desk
        .execute(Command::Resolve {
            identifier: "Airbus Group".into(),
        })
        .unwrap_err();
    assert!(matches!(err, SignalError::Unresolved { .. }));
    assert_eq!(exit_code(&err), format!("{:?}", ExitCode::from(4)));
}

#[test]
fn manual_mapping_then_analysis_updates_last_search() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    desk.execute(Command::Map {
        raw: "Airbus".into(),
        symbol: "air.pa".into(),
    })
    .unwrap();
    desk.execute(Command::Analyze {
        identifier: Some("Airbus".into()),
        horizon: Horizon::Month,
        held: false,
        cost_basis: None,
        profile: Some("prudent".into()),
    })
    .unwrap();

    let last = fs::read_to_string(dir.path().join("data").join(LAST_SEARCH_FILE)).unwrap();
    assert!(last.contains("Airbus"));
    assert_eq!(desk.store.last_search(), "Airbus");
}

#[test]
fn analysis_without_identifier_uses_last_search() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    desk.store.set_last_search("MC.PA").unwrap();
    desk.execute(Command::Analyze {
        identifier: None,
        horizon: Horizon::Year,
        held: true,
        cost_basis: Some(500.0),
        profile: None,
    })
    .unwrap();
    assert_eq!(desk.store.last_search(), "MC.PA");
}

#[test]
fn unknown_profile_is_rejected() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    let err = desk
        .execute(Command::Profile {
            name: Some("reckless".into()),
        })
        .unwrap_err();
    assert!(matches!(err, SignalError::UnknownProfile(_)));
    assert_eq!(desk.store.profile(), ProfileName::Neutral);

    desk.execute(Command::Profile {
        name: Some("Agressif".into()),
    })
    .unwrap();
    assert_eq!(desk.store.profile(), ProfileName::Aggressive);
}

#[test]
fn watchlist_round_trip() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    let add = |s: &str| {
        desk.execute(Command::Watchlist {
            action: WatchlistAction::Add { symbol: s.into() },
        })
    };
    add("air.pa").unwrap();
    add("AIR.PA").unwrap();
    add("mc.pa").unwrap();
    desk.execute(Command::Watchlist {
        action: WatchlistAction::Remove {
            symbol: "air.pa".into(),
        },
    })
    .unwrap();
    desk.execute(Command::Watchlist {
        action: WatchlistAction::List,
    })
    .unwrap();
    assert_eq!(desk.store.watchlist().unwrap(), vec!["MC.PA"]);
}

#[test]
fn markets_and_flash_fill_the_fetch_caches() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    desk.execute(Command::Markets {
        universes: vec!["cac40".into()],
        sort: RankBy::Change(ChangeWindow::SevenDays),
        top: Some(1),
        days: None,
    })
    .unwrap();
    desk.execute(Command::Flash).unwrap();
    assert!(!desk.caches.membership.is_empty());
    assert!(!desk.caches.quotes.is_empty());
    assert!(!desk.caches.news.is_empty());
}

#[test]
fn clear_cache_with_mappings_empties_the_mapping_file() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    desk.execute(Command::Resolve {
        identifier: "air".into(),
    })
    .unwrap();
    assert!(!desk.caches.is_empty());

    desk.execute(Command::ClearCache { mappings: false }).unwrap();
    assert!(desk.caches.is_empty());
    let mapping = fs::read_to_string(dir.path().join("data").join(MAPPING_FILE)).unwrap();
    assert!(mapping.contains("AIR.PA"));

    desk.execute(Command::ClearCache { mappings: true }).unwrap();
    let mapping: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("data").join(MAPPING_FILE)).unwrap())
            .unwrap();
    assert_eq!(mapping, serde_json::json!({}));
}

#[test]
fn guess_needs_no_network() {
    let dir = TempDir::new().unwrap();
    let desk = desk(&dir);
    desk.execute(Command::Guess {
        ticker: "vod.ls".into(),
    })
    .unwrap();
    assert!(desk.caches.is_empty());
}

#[test]
fn cli_arguments_parse_into_commands() {
    use clap::Parser;
    let cli = Cli::try_parse_from([
        "signaldesk",
        "--config",
        "desk.ini",
        "analyze",
        "TTE",
        "--horizon",
        "1y",
        "--cost-basis",
        "58.5",
    ])
    .unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("desk.ini")));
    match cli.command {
        Command::Analyze {
            identifier,
            horizon,
            cost_basis,
            ..
        } => {
            assert_eq!(identifier.as_deref(), Some("TTE"));
            assert_eq!(horizon, Horizon::Year);
            assert_eq!(cost_basis, Some(58.5));
        }
        other => panic!("unexpected command {:?}", other),
    }
}
