use sql_adapter::prelude::*;
use sql_adapter::test_utils::{CallJournal, MockDriver};

fn mock_adapter(kind: DriverKind) -> (Adapter, CallJournal) {
    let driver = MockDriver::new(kind);
    let journal = driver.journal();
    let dsn = format!("{}:host=localhost;dbname=app", kind.as_scheme());
    let spec = ConnectionSpec::new(dsn)
        .with_user("app")
        .with_password("secret");
    (Adapter::with_driver(spec, Box::new(driver)), journal)
}

fn drained(journal: &CallJournal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

#[test]
fn nested_transactions_use_savepoints_on_capable_drivers() {
    let (mut db, journal) = mock_adapter(DriverKind::Mysql);

    assert!(db.begin_transaction().unwrap());
    assert!(!db.begin_transaction().unwrap());
    assert!(!db.begin_transaction().unwrap());
    assert_eq!(db.transaction_depth(), 3);

    assert!(!db.commit().unwrap());
    assert!(!db.rollback().unwrap());
    assert!(db.commit().unwrap());
    assert_eq!(db.transaction_depth(), 0);

    assert_eq!(
        drained(&journal),
        vec![
            "APPLY ATTRIBUTES",
            "SET NAMES utf8",
            "BEGIN",
            "SAVEPOINT LEVEL1",
            "SAVEPOINT LEVEL2",
            "RELEASE SAVEPOINT LEVEL2",
            "ROLLBACK TO SAVEPOINT LEVEL1",
            "COMMIT",
        ]
    );

    // The adapter's own log carries the statement texts, charset directive
    // included.
    assert_eq!(
        db.query_log(),
        vec![
            "SET NAMES utf8",
            "START TRANSACTION;",
            "SAVEPOINT LEVEL1",
            "SAVEPOINT LEVEL2",
            "RELEASE SAVEPOINT LEVEL2",
            "ROLLBACK TO SAVEPOINT LEVEL1",
            "COMMIT;",
        ]
    );
}

#[test]
fn depth_equals_begins_minus_closes() {
    let (mut db, _journal) = mock_adapter(DriverKind::Postgres);

    db.begin_transaction().unwrap();
    db.begin_transaction().unwrap();
    db.commit().unwrap();
    db.begin_transaction().unwrap();
    db.begin_transaction().unwrap();
    db.rollback().unwrap();
    // 4 begins, 2 closes so far.
    assert_eq!(db.transaction_depth(), 2);
    db.commit().unwrap();
    db.commit().unwrap();
    assert_eq!(db.transaction_depth(), 0);
}

#[test]
fn savepoint_incapable_driver_always_begins_physically() {
    let (mut db, journal) = mock_adapter(DriverKind::Sqlite);

    db.begin_transaction().unwrap();
    db.begin_transaction().unwrap();
    db.commit().unwrap();
    db.commit().unwrap();

    // No savepoint statements anywhere; every level went to the driver.
    assert_eq!(
        drained(&journal),
        vec!["APPLY ATTRIBUTES", "BEGIN", "BEGIN", "COMMIT", "COMMIT"]
    );
}

#[test]
fn disabled_nesting_only_runs_the_outermost_statements() {
    let (mut db, journal) = mock_adapter(DriverKind::Mysql);
    db.set_nested_transactions(false).unwrap();

    assert!(db.begin_transaction().unwrap());
    assert!(!db.begin_transaction().unwrap());
    assert_eq!(db.transaction_depth(), 2);

    // The inner rollback is a no-op on the connection; only the depth moves.
    assert!(!db.rollback().unwrap());
    assert_eq!(db.transaction_depth(), 1);
    assert!(db.commit().unwrap());
    assert_eq!(db.transaction_depth(), 0);

    assert_eq!(
        drained(&journal),
        vec!["APPLY ATTRIBUTES", "SET NAMES utf8", "BEGIN", "COMMIT"]
    );
}

#[test]
fn nesting_toggle_is_rejected_mid_transaction() {
    let (mut db, _journal) = mock_adapter(DriverKind::Mysql);

    db.begin_transaction().unwrap();
    let err = db.set_nested_transactions(false).unwrap_err();
    assert!(matches!(err, SqlAdapterError::ConfigError(_)));
    assert!(db.nested_transactions_enabled());
    assert_eq!(db.transaction_depth(), 1);

    db.rollback().unwrap();
    db.set_nested_transactions(false).unwrap();
    assert!(!db.nested_transactions_enabled());
}

#[test]
fn closing_without_a_transaction_fails_and_depth_stays_zero() {
    let (mut db, _journal) = mock_adapter(DriverKind::Mysql);

    assert!(matches!(
        db.commit(),
        Err(SqlAdapterError::ConfigError(_))
    ));
    assert!(matches!(
        db.rollback(),
        Err(SqlAdapterError::ConfigError(_))
    ));
    assert_eq!(db.transaction_depth(), 0);
}

#[test]
fn failed_connect_surfaces_as_connection_error() {
    let driver = MockDriver::new(DriverKind::Mysql).failing_connect();
    let spec = ConnectionSpec::new("mysql:host=localhost;dbname=app");
    let mut db = Adapter::with_driver(spec, Box::new(driver));

    assert!(matches!(
        db.begin_transaction(),
        Err(SqlAdapterError::ConnectionError(_))
    ));
    assert!(!db.is_connected());
}

#[test]
fn injected_connections_skip_connect_time_setup() {
    let (mut db, journal) = mock_adapter(DriverKind::Mysql);
    let extra = MockDriver::new(DriverKind::Mysql);
    db.set_connection(Box::new(extra.connection()));
    assert!(db.is_connected());

    db.begin_transaction().unwrap();
    // No attribute application or charset directive on either journal.
    assert!(drained(&journal).is_empty());
    assert_eq!(drained(&extra.journal()), vec!["BEGIN"]);
}

#[test]
fn postgres_nests_like_mysql() {
    let (mut db, journal) = mock_adapter(DriverKind::Postgres);

    db.begin_transaction().unwrap();
    db.begin_transaction().unwrap();
    db.commit().unwrap();
    db.commit().unwrap();

    assert_eq!(
        drained(&journal),
        vec![
            "APPLY ATTRIBUTES",
            "SET NAMES utf8",
            "BEGIN",
            "SAVEPOINT LEVEL1",
            "RELEASE SAVEPOINT LEVEL1",
            "COMMIT",
        ]
    );
}
