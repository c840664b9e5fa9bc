//! Integration tests for mander-core
//!
//! These tests exercise the full form → command → event → store → view
//! workflow against both store implementations.

use mander_core::{
    baseline,
    db::Database,
    filter::{Period, ViewFilter},
    reports, BaselineTransaction, Command, Error, EventKind, EventStore, MemoryStore,
    Personalizer,
};

/// Exported feed with two identical coffee purchases and a paycheck
fn baseline_csv() -> &'static str {
    r#"id,name,amount,date,category,logo
t1,ACME,-50,2024-03-05,,
t2,COFFEE SHOP,-4.50,2024-03-06,,
t3,COFFEE SHOP,-5.25,2024-03-12,,
t4,PAYROLL,2500,2024-03-15,Salary,
t5,CITY POWER,-90,2024-02-27,Utilities,"#
}

fn load_baseline() -> Vec<BaselineTransaction> {
    baseline::load_csv(baseline_csv().as_bytes()).expect("Failed to parse baseline")
}

fn submit_form<S: EventStore>(service: &Personalizer<S>, user: &str, pairs: &[(&str, &str)]) {
    let command = Command::from_form(pairs.iter().copied()).expect("Failed to decode form");
    service.submit(user, command).expect("Failed to submit");
}

fn run_dashboard_workflow<S: EventStore>(service: &Personalizer<S>) {
    submit_form(
        service,
        "alice",
        &[("kind", "categorize-transaction"), ("transactionId", "t1"), ("category", "Food")],
    );
    submit_form(
        service,
        "alice",
        &[
            ("kind", "add-transaction"),
            ("account", "checking"),
            ("amount", "100"),
            ("date", "2024-03-10"),
            ("name", "Cash gift"),
        ],
    );
    submit_form(
        service,
        "alice",
        &[("kind", "remove-category"), ("transactionId", "t1"), ("category", "Food")],
    );
    submit_form(
        service,
        "alice",
        &[("kind", "add-auto-categorization"), ("name", "COFFEE SHOP"), ("category", "Dining")],
    );
    submit_form(
        service,
        "alice",
        &[("kind", "categorize-transaction"), ("transactionId", "t5"), ("category", "Bills")],
    );

    let history = service.history("alice").expect("Failed to read history");
    let kinds: Vec<EventKind> = history.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::TransactionCategorized,
            EventKind::TransactionAdded,
            EventKind::CategoryRemoved,
            EventKind::AutoCategorizationAdded,
            EventKind::TransactionCategorized,
        ]
    );

    let view = service.view("alice", load_baseline()).expect("Failed to build view");
    assert_eq!(view.len(), 6);

    let acme = view.get("t1").unwrap();
    assert!(acme.category.is_empty());
    assert!(!acme.can_delete);

    let gift = view.get("1").expect("manual transaction gets counter id");
    assert!(gift.can_delete);
    assert!(gift.category.is_empty());

    for id in ["t2", "t3"] {
        let coffee = view.get(id).unwrap();
        assert_eq!(coffee.primary_category(), Some("Dining"));
        assert!(coffee.category[0].is_auto_categorized);
    }

    let power = view.get("t5").unwrap();
    assert!(power.is_need);
    assert_eq!(power.category.len(), 2);

    // Deleting the manual entry removes it from every later read
    submit_form(
        service,
        "alice",
        &[("kind", "remove-transaction"), ("transactionId", "1")],
    );
    let view = service.view("alice", load_baseline()).unwrap();
    assert!(view.get("1").is_none());
    assert_eq!(view.len(), 5);

    // Replays are deterministic
    assert_eq!(view, service.view("alice", load_baseline()).unwrap());

    let march: Period = "2024-03".parse().unwrap();
    let selected = ViewFilter::new().period(Some(march)).newest_first(true).apply(&view);
    let ids: Vec<&str> = selected.iter().map(|tx| tx.id.as_str()).collect();
    assert_eq!(ids, vec!["t4", "t3", "t2", "t1"]);

    let split = reports::needs_wants_savings(selected.iter().copied());
    assert_eq!(split.income, 2500.0);
    assert_eq!(split.spending, 59.75);
    assert_eq!(split.needs, 0.0);

    let months = reports::breakdown_by_month(&view);
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].period.to_string(), "2024-02");
}

#[test]
fn test_workflow_with_memory_store() {
    let service = Personalizer::new(MemoryStore::new());
    run_dashboard_workflow(&service);
}

#[test]
fn test_workflow_with_database() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let service = Personalizer::new(db);
    run_dashboard_workflow(&service);

    // Stored positions are visible through the database API
    let stored = service.store().list_events("alice").unwrap();
    assert_eq!(stored.len(), 6);
    assert!(stored.windows(2).all(|w| w[0].seq < w[1].seq));
}

#[test]
fn test_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mander.db");
    let path = path.to_str().unwrap();

    {
        let service = Personalizer::new(Database::new_unencrypted(path).unwrap());
        submit_form(
            &service,
            "alice",
            &[("kind", "categorize-transaction"), ("transactionId", "t1"), ("category", "Food")],
        );
    }

    let service = Personalizer::new(Database::new_unencrypted(path).unwrap());
    let view = service.view("alice", load_baseline()).unwrap();
    assert!(view.get("t1").unwrap().has_category("Food"));
}

#[test]
fn test_unknown_kind_is_rejected_before_persistence() {
    let db = Database::in_memory().unwrap();
    let result = Command::from_form([("kind", "transfer-funds"), ("amount", "10")]);
    assert!(matches!(result, Err(Error::UnknownCommandKind(k)) if k == "transfer-funds"));
    assert_eq!(db.event_count("alice").unwrap(), 0);
}

#[test]
fn test_categorization_outside_baseline_window_is_ignored() {
    let service = Personalizer::new(MemoryStore::new());
    submit_form(
        &service,
        "alice",
        &[("kind", "categorize-transaction"), ("transactionId", "t-old"), ("category", "Rent")],
    );

    let view = service.view("alice", load_baseline()).unwrap();
    assert_eq!(view.len(), 5);
    assert!(view.iter().all(|tx| !tx.has_category("Rent")));
}
