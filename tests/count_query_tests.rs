//! Count Query Tests
//!
//! End-to-end tests for count-query rewriting:
//! - Plain, DISTINCT and constructor-expression projections
//! - FROM-first queries without a select clause
//! - Count projection overrides
//! - ORDER BY removal and subquery isolation

use hql_rewrite::{rewrite, QueryEnhancer, RewriteConfig};

fn count_query(query: &str) -> String {
    QueryEnhancer::parse(query)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", query, e))
        .create_count_query(None)
}

#[test]
fn test_simple_count() {
    assert_eq!(count_query("select u from User u"), "select count(u) from User u");
}

#[test]
fn test_count_with_where_and_joins() {
    assert_eq!(
        count_query(
            "select e from Employee e join e.department d where d.name = :name and e.age > 30"
        ),
        "select count(e) from Employee e join e.department d where d.name = :name and e.age > 30"
    );
}

#[test]
fn test_count_distinct() {
    assert_eq!(
        count_query("SELECT DISTINCT u FROM User u"),
        "SELECT count(DISTINCT u) FROM User u"
    );
}

#[test]
fn test_count_distinct_multiple_columns_kept() {
    assert_eq!(
        count_query("select distinct a, b from X x"),
        "select count(distinct a, b) from X x"
    );
}

#[test]
fn test_count_distinct_constructor_uses_alias() {
    assert_eq!(
        count_query("SELECT DISTINCT new com.example.Foo(x.a, x.b) FROM X x"),
        "SELECT count(DISTINCT x) FROM X x"
    );
}

#[test]
fn test_count_constructor_without_distinct() {
    assert_eq!(
        count_query("select new com.example.Foo(x.a) from X x"),
        "select count(x) from X x"
    );
}

#[test]
fn test_count_from_query() {
    assert_eq!(count_query("from Person p"), "select count(p) from Person p");
}

#[test]
fn test_count_drops_order_by() {
    assert_eq!(
        count_query("select p from Person p order by p.lastName, p.firstName"),
        "select count(p) from Person p"
    );
}

#[test]
fn test_count_keeps_subquery_select_and_order() {
    assert_eq!(
        count_query(
            "select p from Person p where p.id in (select distinct a.person.id from Address a order by a.id)"
        ),
        "select count(p) from Person p where p.id in (select distinct a.person.id from Address a order by a.id)"
    );
}

#[test]
fn test_count_projection_override() {
    let enhancer = QueryEnhancer::parse("select distinct p.name from Person p").unwrap();
    assert_eq!(
        enhancer.create_count_query(Some("p.id")),
        "select count(distinct p.id) from Person p"
    );
}

#[test]
fn test_count_through_config() {
    let config = RewriteConfig {
        count: true,
        count_projection: Some("*".to_string()),
        ..RewriteConfig::default()
    };
    let output = rewrite("from Person p where p.age > 18", &config).unwrap();
    assert_eq!(output.query, "select count(*) from Person p where p.age > 18");
    assert_eq!(output.alias.as_deref(), Some("p"));
}

#[test]
fn test_count_ignores_sort() {
    let config = RewriteConfig {
        count: true,
        sort: vec!["name".parse().unwrap()],
        ..RewriteConfig::default()
    };
    let output = rewrite("select p from Person p", &config).unwrap();
    assert_eq!(output.query, "select count(p) from Person p");
}

#[test]
fn test_projection_and_constructor_detection() {
    let enhancer =
        QueryEnhancer::parse("select new com.example.Dto(p.id, p.name) from Person p").unwrap();
    assert!(enhancer.has_constructor_expression());
    assert_eq!(enhancer.projection(), "new com.example.Dto(p.id, p.name)");
    assert_eq!(enhancer.detect_alias().as_deref(), Some("p"));
}
