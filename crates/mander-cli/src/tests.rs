//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use mander_core::db::Database;
use mander_core::{EventKind, EventStore, Personalizer};

use crate::cli::{parse_key_val, Cli, Commands};
use crate::commands::{self, truncate, ViewOptions};

fn setup_test_service() -> Personalizer<Database> {
    Personalizer::new(Database::in_memory().unwrap())
}

fn write_baseline(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("feed.csv");
    std::fs::write(
        &path,
        "id,name,amount,date,category\n\
         t1,ACME,-50,2024-03-05,\n\
         t2,COFFEE SHOP,-4.50,2024-03-06,\n\
         t3,PAYROLL,2500,2024-03-15,Salary\n",
    )
    .unwrap();
    path
}

fn kinds(service: &Personalizer<Database>, user: &str) -> Vec<EventKind> {
    service
        .history(user)
        .unwrap()
        .iter()
        .map(|e| e.kind())
        .collect()
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_key_val() {
    assert_eq!(
        parse_key_val("kind=add-transaction").unwrap(),
        ("kind".to_string(), "add-transaction".to_string())
    );
    assert_eq!(
        parse_key_val("name=a=b").unwrap(),
        ("name".to_string(), "a=b".to_string())
    );
    assert!(parse_key_val("novalue").is_err());
    assert!(parse_key_val("=x").is_err());
}

#[test]
fn test_cli_parses_negative_amount() {
    let cli = Cli::try_parse_from([
        "mander", "--no-encrypt", "add", "Lunch", "-12.5", "--date", "2024-03-10",
    ])
    .unwrap();
    assert!(cli.no_encrypt);
    match cli.command {
        Commands::Add {
            name, amount, date, ..
        } => {
            assert_eq!(name, "Lunch");
            assert_eq!(amount, -12.5);
            assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 10));
        }
        _ => panic!("expected add"),
    }
}

#[test]
fn test_cli_parses_submit_fields() {
    let cli = Cli::try_parse_from([
        "mander",
        "--user",
        "alice",
        "submit",
        "kind=remove-transaction",
        "transactionId=7",
    ])
    .unwrap();
    assert_eq!(cli.user.as_deref(), Some("alice"));
    match cli.command {
        Commands::Submit { fields } => assert_eq!(fields.len(), 2),
        _ => panic!("expected submit"),
    }
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a very long merchant name", 10), "a very ...");
    assert_eq!(truncate("café crème brûlée", 8), "café ...");
}

// ========== Event Recording Tests ==========

#[test]
fn test_cmd_add_allocates_id() {
    let service = setup_test_service();
    commands::cmd_add(
        &service,
        "alice",
        "checking",
        "Cash gift",
        100.0,
        NaiveDate::from_ymd_opt(2024, 3, 10),
    )
    .unwrap();

    let history = service.history("alice").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].data.transaction_id(), Some("1"));
}

#[test]
fn test_cmd_add_rejects_empty_name() {
    let service = setup_test_service();
    assert!(commands::cmd_add(&service, "alice", "checking", "  ", 1.0, None).is_err());
    assert!(service.history("alice").unwrap().is_empty());
}

#[test]
fn test_cmd_categorize_and_uncategorize() {
    let service = setup_test_service();
    commands::cmd_categorize(&service, "alice", "t1", " Food ").unwrap();
    commands::cmd_uncategorize(&service, "alice", "t1", "Food").unwrap();

    assert_eq!(
        kinds(&service, "alice"),
        vec![EventKind::TransactionCategorized, EventKind::CategoryRemoved]
    );

    let view = service.view("alice", Vec::new()).unwrap();
    assert!(view.is_empty());
}

#[test]
fn test_cmd_categorize_rejects_blank_category() {
    let service = setup_test_service();
    assert!(commands::cmd_categorize(&service, "alice", "t1", "   ").is_err());
    assert!(service.history("alice").unwrap().is_empty());
}

#[test]
fn test_cmd_remove_and_auto_categorize() {
    let service = setup_test_service();
    commands::cmd_remove(&service, "alice", "t1").unwrap();
    commands::cmd_auto_categorize(&service, "alice", "COFFEE SHOP", "Dining").unwrap();

    assert_eq!(
        kinds(&service, "alice"),
        vec![
            EventKind::TransactionRemoved,
            EventKind::AutoCategorizationAdded
        ]
    );
}

#[test]
fn test_cmd_submit_uses_form_decoding() {
    let service = setup_test_service();
    let fields = vec![
        ("kind".to_string(), "add-transaction".to_string()),
        ("account".to_string(), "checking".to_string()),
        ("amount".to_string(), "-20".to_string()),
        ("date".to_string(), "2024-03-02".to_string()),
        ("name".to_string(), "Cash".to_string()),
    ];
    commands::cmd_submit(&service, "alice", fields).unwrap();
    assert_eq!(kinds(&service, "alice"), vec![EventKind::TransactionAdded]);
}

#[test]
fn test_cmd_submit_unknown_kind_fails_without_append() {
    let service = setup_test_service();
    let fields = vec![("kind".to_string(), "explode".to_string())];
    assert!(commands::cmd_submit(&service, "alice", fields).is_err());
    assert_eq!(service.store().event_count("alice").unwrap(), 0);
}

#[test]
fn test_cmd_events() {
    let service = setup_test_service();
    assert!(commands::cmd_events(service.store(), "alice", false).is_ok());

    commands::cmd_categorize(&service, "alice", "t1", "Food").unwrap();
    assert!(commands::cmd_events(service.store(), "alice", false).is_ok());
    assert!(commands::cmd_events(service.store(), "alice", true).is_ok());
}

// ========== View and Report Tests ==========

#[test]
fn test_cmd_view_with_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = write_baseline(dir.path());
    let service = setup_test_service();
    commands::cmd_auto_categorize(&service, "alice", "COFFEE SHOP", "Dining").unwrap();

    let options = ViewOptions {
        baseline: Some(baseline.as_path()),
        period: Some("2024-03"),
        category: Some("Dining"),
        limit: Some(10),
        newest_first: true,
        json: false,
    };
    assert!(commands::cmd_view(&service, "alice", &options).is_ok());

    let json = ViewOptions {
        json: true,
        ..options
    };
    assert!(commands::cmd_view(&service, "alice", &json).is_ok());
}

#[test]
fn test_cmd_view_limit_smaller_than_matches() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = write_baseline(dir.path());
    let service = setup_test_service();

    let options = ViewOptions {
        baseline: Some(baseline.as_path()),
        limit: Some(1),
        newest_first: true,
        ..ViewOptions::default()
    };
    assert!(commands::cmd_view(&service, "alice", &options).is_ok());
}

#[test]
fn test_cmd_view_without_baseline() {
    let service = setup_test_service();
    assert!(commands::cmd_view(&service, "alice", &ViewOptions::default()).is_ok());
}

#[test]
fn test_cmd_view_rejects_bad_period() {
    let service = setup_test_service();
    let options = ViewOptions {
        period: Some("March"),
        ..ViewOptions::default()
    };
    assert!(commands::cmd_view(&service, "alice", &options).is_err());
}

#[test]
fn test_cmd_view_missing_baseline_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv");
    let service = setup_test_service();
    let options = ViewOptions {
        baseline: Some(missing.as_path()),
        ..ViewOptions::default()
    };
    assert!(commands::cmd_view(&service, "alice", &options).is_err());
}

#[test]
fn test_cmd_report() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = write_baseline(dir.path());
    let service = setup_test_service();
    commands::cmd_categorize(&service, "alice", "t1", "Groceries").unwrap();

    assert!(commands::cmd_report(&service, "alice", Some(baseline.as_path()), Some("2024-03"), false).is_ok());
    assert!(commands::cmd_report(&service, "alice", Some(baseline.as_path()), Some("2024-03"), true).is_ok());
    // Empty period still prints the budget section
    assert!(commands::cmd_report(&service, "alice", Some(baseline.as_path()), Some("1999-01"), false).is_ok());
}

// ========== Core Command Tests ==========

#[test]
fn test_cmd_init_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mander.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());

    let db = commands::open_db(&path, true).unwrap();
    db.append(
        "alice",
        &mander_core::handle_command(mander_core::Command::RemoveTransaction {
            transaction_id: "t1".into(),
        })
        .unwrap(),
    )
    .unwrap();
    assert!(commands::cmd_status(&db).is_ok());
}
