use sql_adapter::prelude::*;
use sql_adapter::test_utils::MockDriver;

fn mysql_adapter() -> Adapter {
    let spec = ConnectionSpec::new("mysql:host=localhost;dbname=app");
    Adapter::with_driver(spec, Box::new(MockDriver::new(DriverKind::Mysql)))
}

fn sqlite_adapter() -> Adapter {
    let spec = ConnectionSpec::new("sqlite::memory:");
    Adapter::with_driver(spec, Box::new(MockDriver::new(DriverKind::Sqlite)))
}

#[test]
fn scalar_is_quoted_and_passthrough_is_verbatim() {
    let mut db = mysql_adapter();
    let out = db
        .placeholder("? and ?p", &[SqlParam::from("a'b"), SqlParam::raw("x=1")])
        .unwrap();
    assert_eq!(out, "'a\\'b' and x=1");
}

#[test]
fn assignment_list_never_leaks_the_unescaped_value() {
    let mut db = mysql_adapter();
    let out = db
        .placeholder(
            "?a",
            &[SqlParam::map([("name", SqlValue::Text("o'brien".into()))])],
        )
        .unwrap();
    assert_eq!(out, "`name`='o\\'brien'");
    assert!(!out.contains("o'brien"));
}

#[test]
fn quoting_follows_the_driver_family() {
    let mut db = sqlite_adapter();
    let out = db
        .placeholder(
            "?a",
            &[SqlParam::map([("name", SqlValue::Text("o'brien".into()))])],
        )
        .unwrap();
    // Doubled quote escaping and double-quoted identifiers on this family.
    assert_eq!(out, "\"name\"='o''brien'");
}

#[test]
fn key_and_value_lists_build_insert_fragments() {
    let mut db = mysql_adapter();
    let pairs = [
        ("id", SqlValue::Int(7)),
        ("name", SqlValue::Text("a'b".into())),
    ];
    let out = db
        .placeholder(
            "INSERT INTO t (?k) VALUES (?v)",
            &[SqlParam::map(pairs.clone()), SqlParam::map(pairs)],
        )
        .unwrap();
    assert_eq!(out, "INSERT INTO t (`id`, `name`) VALUES (7, 'a\\'b')");
}

#[test]
fn value_list_accepts_plain_sequences() {
    let mut db = mysql_adapter();
    let out = db
        .placeholder(
            "id IN (?v)",
            &[SqlParam::list([
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3),
            ])],
        )
        .unwrap();
    assert_eq!(out, "id IN (1, 2, 3)");
}

#[test]
fn too_few_arguments_is_a_parameter_error() {
    let mut db = mysql_adapter();
    let err = db
        .placeholder("? and ?", &[SqlParam::from(1)])
        .unwrap_err();
    assert!(matches!(err, SqlAdapterError::ParameterError(_)));
}

#[test]
fn wrong_argument_shapes_are_parameter_errors() {
    let mut db = mysql_adapter();
    assert!(matches!(
        db.placeholder("?a", &[SqlParam::from(1)]),
        Err(SqlAdapterError::ParameterError(_))
    ));
    assert!(matches!(
        db.placeholder("?", &[SqlParam::map([("k", SqlValue::Int(1))])]),
        Err(SqlAdapterError::ParameterError(_))
    ));
}

#[test]
fn adapter_quote_goes_through_the_driver() {
    let mut db = mysql_adapter();
    assert_eq!(db.quote(&SqlValue::Text("a'b".into())).unwrap(), "'a\\'b'");
    assert_eq!(db.quote(&SqlValue::Null).unwrap(), "NULL");
    assert_eq!(db.quote(&SqlValue::Int(5)).unwrap(), "5");
}

#[test]
fn identifier_quoting_is_distinct_from_literal_quoting() {
    let mut mysql = mysql_adapter();
    assert_eq!(mysql.quote_identifier("users").unwrap(), "`users`");
    assert_eq!(mysql.quote_identifier("we`ird").unwrap(), "`we``ird`");

    let mut sqlite = sqlite_adapter();
    assert_eq!(sqlite.quote_identifier("users").unwrap(), "\"users\"");
}
