//! Sort Injection Tests
//!
//! End-to-end tests for appending sort orders to HQL queries:
//! - ORDER BY creation and chaining
//! - Alias qualification rules
//! - Ignore-case wrapping
//! - Subquery isolation
//! - LIMIT / OFFSET / FETCH placement

use hql_rewrite::{QueryEnhancer, Order, Sort};

fn sort_query(query: &str, sort: Sort) -> String {
    QueryEnhancer::parse(query)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", query, e))
        .apply_sorting(&sort)
}

#[test]
fn test_adds_order_by() {
    assert_eq!(
        sort_query("select e from Employee e", Sort::by(["first_name", "last_name"])),
        "select e from Employee e order by e.first_name asc, e.last_name asc"
    );
}

#[test]
fn test_zero_one_and_many_orders() {
    let query = "select e from Employee e";
    assert_eq!(sort_query(query, Sort::unsorted()), query);
    assert_eq!(
        sort_query(query, Sort::by(["a"])),
        "select e from Employee e order by e.a asc"
    );
    let many = sort_query(query, Sort::by(["a", "b", "c", "d"]));
    assert_eq!(
        many,
        "select e from Employee e order by e.a asc, e.b asc, e.c asc, e.d asc"
    );
    assert!(!many.contains(",,"));
    assert!(!many.ends_with(','));
}

#[test]
fn test_chains_existing_order_by() {
    assert_eq!(
        sort_query(
            "select e from Employee e order by e.age",
            Sort::unsorted().and(Order::desc("name"))
        ),
        "select e from Employee e order by e.age, e.name desc"
    );
}

#[test]
fn test_ignore_case() {
    assert_eq!(
        sort_query(
            "select e from Employee e",
            Sort::unsorted().and(Order::asc("name").ignore_case())
        ),
        "select e from Employee e order by lower(e.name) asc"
    );
}

#[test]
fn test_projection_alias_stays_unqualified() {
    assert_eq!(
        sort_query(
            "select e.department as dept, count(e) as headcount from Employee e group by e.department",
            Sort::unsorted()
                .and(Order::desc("headcount"))
                .and(Order::asc("dept"))
        ),
        "select e.department as dept, count(e) as headcount from Employee e group by e.department order by headcount desc, dept asc"
    );
}

#[test]
fn test_function_sort_stays_unqualified() {
    assert_eq!(
        sort_query(
            "select e from Employee e",
            Sort::by(["LENGTH(e.lastName)"])
        ),
        "select e from Employee e order by LENGTH(e.lastName) asc"
    );
}

#[test]
fn test_alias_comes_from_first_root() {
    assert_eq!(
        sort_query(
            "select d from Department d join d.employees e, Company c",
            Sort::by(["name"])
        ),
        "select d from Department d join d.employees e, Company c order by d.name asc"
    );
}

#[test]
fn test_subquery_is_not_sorted() {
    assert_eq!(
        sort_query(
            "select e from Employee e where exists (select 1 from Audit a where a.employee = e)",
            Sort::by(["name"])
        ),
        "select e from Employee e where exists (select 1 from Audit a where a.employee = e) order by e.name asc"
    );
}

#[test]
fn test_sort_precedes_limit_and_offset() {
    assert_eq!(
        sort_query(
            "select e from Employee e order by e.id limit 20 offset 40",
            Sort::by(["name"])
        ),
        "select e from Employee e order by e.id, e.name asc limit 20 offset 40"
    );
    assert_eq!(
        sort_query(
            "select e from Employee e fetch first 5 rows only",
            Sort::by(["name"])
        ),
        "select e from Employee e order by e.name asc fetch first 5 rows only"
    );
}

#[test]
fn test_from_query_is_sorted() {
    assert_eq!(
        sort_query("from Person p where p.age > 18", Sort::by(["lastName"])),
        "from Person p where p.age > 18 order by p.lastName asc"
    );
}

#[test]
fn test_keyword_case_is_preserved() {
    assert_eq!(
        sort_query(
            "SELECT u FROM User u WHERE u.active = true ORDER BY u.id DESC",
            Sort::by(["name"])
        ),
        "SELECT u FROM User u WHERE u.active = true ORDER BY u.id DESC, u.name asc"
    );
}
