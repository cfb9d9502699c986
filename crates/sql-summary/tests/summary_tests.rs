//! End-to-end summary tests
//!
//! Exercises the public facade the way instrumentation code calls it.

use sql_summary::{generate_summary, SummaryCache, UNKNOWN};
use test_case::test_case;

fn summarize(query: &str) -> String {
    let cache = SummaryCache::default();
    generate_summary(Some(query), &cache)
}

#[test_case("SELECT * FROM users WHERE id = 1", "SELECT users" ; "select")]
#[test_case("EXPLAIN SELECT 1", "EXPLAIN" ; "explain resolves to leading keyword")]
#[test_case("/*app='x'*/ SELECT * FROM users", "SELECT users" ; "leading comment")]
#[test_case("DESELECT 1", UNKNOWN ; "unrecognized operation")]
#[test_case("  \n\tselect * from users", "SELECT users" ; "leading whitespace")]
#[test_case("SELECT * FROM users -- trailing", "SELECT users" ; "trailing comment")]
#[test_case("SELECT * FROM /* hint */ users", "SELECT users" ; "comment before table")]
#[test_case("UPDATE \"Users\" SET name = 'O''Brien'", "UPDATE Users" ; "quoted update")]
#[test_case("SELECT * FROM users WHERE note = 'it\\'s; DROP TABLE x'", "SELECT users" ; "escaped quote hides statement")]
fn test_generate_summary(query: &str, expected: &str) {
    assert_eq!(summarize(query), expected);
}

#[test_case("SELECT * FROM users\u{a0}WHERE id = 1", "SELECT users" ; "no-break space")]
#[test_case("SELECT\u{3000}*\u{3000}FROM\u{3000}users", "SELECT users" ; "ideographic space")]
#[test_case("UPDATE\u{a0}accounts SET x = 1", "UPDATE accounts" ; "no-break space after operation")]
#[test_case("SELECT * FROM ユーザー\u{a0}WHERE id = 1", "SELECT ユーザー" ; "non-ascii table name")]
fn test_unicode_whitespace(query: &str, expected: &str) {
    assert_eq!(summarize(query), expected);
}

#[test_case("DROP /* c */ TABLE t", "DROP TABLE t" ; "block comment inside drop table")]
#[test_case("DROP -- c\nTABLE t", "DROP TABLE t" ; "line comment inside drop table")]
#[test_case("RELEASE -- x\nSAVEPOINT s", "RELEASE SAVEPOINT" ; "line comment inside release savepoint")]
#[test_case("CREATE /* a */ /* b */ DATABASE d", "CREATE DATABASE d" ; "consecutive comments")]
fn test_compound_operation_across_comments(query: &str, expected: &str) {
    assert_eq!(summarize(query), expected);
}

#[test_case("SELECT data #>> '{a}' FROM docs", "SELECT docs" ; "json path as text")]
#[test_case("SELECT data #> '{a}' FROM docs", "SELECT docs" ; "json path")]
#[test_case("UPDATE docs SET data = data #- '{a}'", "UPDATE docs" ; "json delete path")]
#[test_case("SELECT * FROM docs # mysql comment", "SELECT docs" ; "hash comment still works")]
fn test_hash_json_operators(query: &str, expected: &str) {
    assert_eq!(summarize(query), expected);
}

#[test]
fn test_repeated_calls_are_identical() {
    let cache = SummaryCache::default();
    let queries = [
        "SELECT * FROM users",
        "BEGIN",
        "garbage ((( '",
        "",
        "INSERT INTO t VALUES (1)",
    ];
    for query in queries {
        let first = generate_summary(Some(query), &cache);
        let second = generate_summary(Some(query), &cache);
        assert_eq!(first, second, "query: {query:?}");
    }
}

#[test]
fn test_summary_table() {
    let cache = SummaryCache::default();
    let queries = [
        "SELECT * FROM users WHERE id = 1",
        "SELECT * FROM a, b",
        "SELECT * FROM a JOIN b ON a.id = b.id",
        "INSERT INTO logs (msg) VALUES ('x')",
        "DELETE FROM sessions",
        "UPDATE accounts SET x = 1",
        "DROP TABLE IF EXISTS tmp",
        "RELEASE SAVEPOINT sp",
        "EXPLAIN SELECT * FROM users",
        "SELECT * FROM users; DELETE FROM users",
        "DESELECT 1",
    ];
    let report = queries
        .iter()
        .map(|q| format!("{} => {}", q, generate_summary(Some(q), &cache)))
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(report, @r###"
    SELECT * FROM users WHERE id = 1 => SELECT users
    SELECT * FROM a, b => SELECT a,b
    SELECT * FROM a JOIN b ON a.id = b.id => SELECT a
    INSERT INTO logs (msg) VALUES ('x') => INSERT logs
    DELETE FROM sessions => DELETE sessions
    UPDATE accounts SET x = 1 => UPDATE accounts
    DROP TABLE IF EXISTS tmp => DROP TABLE tmp
    RELEASE SAVEPOINT sp => RELEASE SAVEPOINT
    EXPLAIN SELECT * FROM users => EXPLAIN users
    SELECT * FROM users; DELETE FROM users => SELECT users
    DESELECT 1 => UNKNOWN
    "###);
}

#[test]
fn test_none_query() {
    let cache = SummaryCache::default();
    assert_eq!(generate_summary(None, &cache), UNKNOWN);
}

#[test]
fn test_very_long_query() {
    let columns = (0..5_000)
        .map(|i| format!("c{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!("SELECT {} FROM wide_table", columns);
    assert_eq!(summarize(&query), "SELECT wide_table");
}

#[test]
fn test_deeply_nested_parentheses() {
    let query = format!("SELECT {}1{} FROM t", "(".repeat(10_000), ")".repeat(10_000));
    assert_eq!(summarize(&query), "SELECT t");
}

#[test]
fn test_summaries_are_cached_per_query() {
    let cache = SummaryCache::new(16).unwrap();
    generate_summary(Some("SELECT * FROM a"), &cache);
    generate_summary(Some("SELECT * FROM a"), &cache);
    generate_summary(Some("SELECT * FROM b"), &cache);

    let stats = cache.stats();
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.hits, 1);
    assert_eq!(cache.get(Some("SELECT * FROM b")).as_deref(), Some("SELECT b"));
}
