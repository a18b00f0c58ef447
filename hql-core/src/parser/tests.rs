//! Tests for the HQL parser.

use super::*;
use crate::ast::*;

fn statement_query(tree: &QueryTree) -> NodeId {
    let NodeKind::SelectStatement { query_expression } = tree.kind(tree.root()) else {
        panic!("root is not a select statement");
    };
    let NodeKind::QueryExpression { first, rest } = tree.kind(*query_expression) else {
        panic!("expected query expression");
    };
    assert!(rest.is_empty());
    *first
}

fn count_kind(tree: &QueryTree, predicate: impl Fn(&NodeKind) -> bool) -> usize {
    (0..tree.len())
        .filter(|index| predicate(tree.kind(NodeId(*index))))
        .count()
}

#[test]
fn test_simple_select() {
    let tree = parse("select e from Employee e").unwrap();
    let ordered = statement_query(&tree);
    let NodeKind::OrderedQuery {
        body,
        parenthesized,
        query_order,
    } = tree.kind(ordered)
    else {
        panic!("expected ordered query");
    };
    assert!(!parenthesized);
    assert!(query_order.is_none());
    assert!(matches!(
        tree.kind(*body),
        NodeKind::SelectQuery {
            from_clause: Some(_),
            where_clause: None,
            ..
        }
    ));
}

#[test]
fn test_from_root_variable() {
    let tree = parse("SELECT u FROM com.example.User AS u").unwrap();
    let root = (0..tree.len())
        .map(NodeId)
        .find(|id| matches!(tree.kind(*id), NodeKind::FromRoot { .. }))
        .unwrap();
    let NodeKind::FromRoot {
        target,
        variable: Some(variable),
    } = tree.kind(root)
    else {
        panic!("expected from root with variable");
    };
    assert_eq!(*target, FromTarget::Entity("com.example.User".to_string()));
    assert_eq!(
        *tree.kind(*variable),
        NodeKind::Variable {
            as_kw: Some("AS".to_string()),
            name: "u".to_string(),
        }
    );
}

#[test]
fn test_from_query_without_select() {
    let tree = parse("from Person p where p.age > 18").unwrap();
    let ordered = statement_query(&tree);
    let NodeKind::OrderedQuery { body, .. } = tree.kind(ordered) else {
        panic!("expected ordered query");
    };
    assert!(matches!(
        tree.kind(*body),
        NodeKind::FromQuery {
            where_clause: Some(_),
            select_clause: None,
            ..
        }
    ));
}

#[test]
fn test_reserved_words_are_not_variables() {
    let tree = parse("select e from Employee where e.id = 1").unwrap();
    assert_eq!(
        count_kind(&tree, |k| matches!(k, NodeKind::Variable { .. })),
        0
    );
    assert_eq!(
        count_kind(&tree, |k| matches!(k, NodeKind::WhereClause { .. })),
        1
    );
}

#[test]
fn test_entity_named_like_keyword() {
    let tree = parse("select o from Order o").unwrap();
    assert_eq!(
        count_kind(&tree, |k| matches!(k, NodeKind::FromRoot { target: FromTarget::Entity(name), .. } if name == "Order")),
        1
    );
}

#[test]
fn test_query_order_parts() {
    let tree = parse(
        "select e from Employee e order by e.name desc nulls last, e.id limit 10 offset 5 rows",
    )
    .unwrap();
    let ordered = statement_query(&tree);
    let NodeKind::OrderedQuery {
        query_order: Some(order),
        ..
    } = tree.kind(ordered)
    else {
        panic!("expected query order");
    };
    let NodeKind::QueryOrder {
        order_by_clause: Some(order_by),
        limit_clause: Some(_),
        offset_clause: Some(_),
        fetch_clause: None,
    } = tree.kind(*order)
    else {
        panic!("expected order by, limit and offset");
    };
    let NodeKind::OrderByClause { items, .. } = tree.kind(*order_by) else {
        panic!("expected order by clause");
    };
    assert_eq!(items.len(), 2);
    assert!(matches!(
        tree.kind(items[0]),
        NodeKind::SortedItem {
            direction: Some(d),
            nulls: Some(n),
            ..
        } if d == "desc" && n == "nulls last"
    ));
}

#[test]
fn test_fetch_clause() {
    let tree = parse("select e from Employee e fetch first 10 rows only").unwrap();
    assert_eq!(
        count_kind(&tree, |k| matches!(k, NodeKind::FetchClause { trailing, percent: false, .. } if trailing == "rows only")),
        1
    );
}

#[test]
fn test_joins() {
    let tree = parse(
        "select e from Employee e left outer join fetch e.department d \
         join e.manager m on m.active = true cross join Company c, in(e.phones) p",
    )
    .unwrap();
    assert_eq!(
        count_kind(&tree, |k| matches!(k, NodeKind::Join { keyword, fetch: Some(_), .. } if keyword == "left outer join")),
        1
    );
    assert_eq!(
        count_kind(&tree, |k| matches!(k, NodeKind::Join { restriction: Some(_), .. })),
        1
    );
    assert_eq!(
        count_kind(&tree, |k| matches!(k, NodeKind::CrossJoin { .. })),
        1
    );
    assert_eq!(
        count_kind(&tree, |k| matches!(k, NodeKind::CollectionJoin { .. })),
        1
    );
    assert_eq!(count_kind(&tree, |k| matches!(k, NodeKind::Alias { .. })), 2);
}

#[test]
fn test_constructor_expression() {
    let tree =
        parse("select new com.example.Dto(e.firstName, e.lastName as last) from Employee e")
            .unwrap();
    let instantiation = (0..tree.len())
        .map(NodeId)
        .find(|id| matches!(tree.kind(*id), NodeKind::Instantiation { .. }))
        .unwrap();
    let NodeKind::Instantiation {
        target, arguments, ..
    } = tree.kind(instantiation)
    else {
        unreachable!();
    };
    assert_eq!(target, "com.example.Dto");
    assert_eq!(arguments.len(), 2);
}

#[test]
fn test_subquery_detection() {
    let tree = parse(
        "select e from Employee e where e.id in (select m.id from Manager m) \
         and exists (select 1 from Audit a where a.employee = e)",
    )
    .unwrap();
    let subqueries: Vec<NodeId> = (0..tree.len())
        .map(NodeId)
        .filter(|id| matches!(tree.kind(*id), NodeKind::Subquery { .. }))
        .collect();
    assert_eq!(subqueries.len(), 2);

    let select_clauses: Vec<NodeId> = (0..tree.len())
        .map(NodeId)
        .filter(|id| matches!(tree.kind(*id), NodeKind::SelectClause { .. }))
        .collect();
    let nested = select_clauses
        .iter()
        .filter(|id| tree.is_subquery(**id))
        .count();
    assert_eq!(nested, 2);
}

#[test]
fn test_predicates() {
    let tree = parse(
        "from Person p where p.name is not null and p.age not between 1 and 10 \
         and p.email like '%@x.com' escape '\\' and p.id in (1, 2, 3) and p.role in :roles \
         and p.salary > all (select s.amount from Salary s)",
    )
    .unwrap();
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::IsNull { keyword, .. } if keyword == "is not null")) == 1);
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::Between { not: Some(_), .. })) == 1);
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::Like { escape: Some(_), .. })) == 1);
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::InList { target: InTarget::List(items), .. } if items.len() == 3)) == 1);
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::InList { target: InTarget::Parameter(_), .. })) == 1);
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::Quantified { .. })) == 1);
}

#[test]
fn test_functions_and_case() {
    let tree = parse(
        "select count(distinct e.id), count(*), cast(e.age as Integer), \
         case when e.age > 60 then 'senior' else 'junior' end from Employee e",
    )
    .unwrap();
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::Function { distinct: Some(_), .. })) == 1);
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::Function { star: true, .. })) == 1);
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::Binary { operator, .. } if operator == "as")) == 1);
    assert!(count_kind(&tree, |k| matches!(k, NodeKind::Case { operand: None, whens, else_branch: Some(_), .. } if whens.len() == 1)) == 1);
}

#[test]
fn test_set_operations() {
    let tree = parse("select a from A a union all select b from B b").unwrap();
    let NodeKind::SelectStatement { query_expression } = tree.kind(tree.root()) else {
        panic!("expected statement");
    };
    let NodeKind::QueryExpression { rest, .. } = tree.kind(*query_expression) else {
        panic!("expected query expression");
    };
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].0, "union all");
}

#[test]
fn test_parenthesized_query_expression() {
    let tree = parse("(select a from A a) order by a.name").unwrap();
    let ordered = statement_query(&tree);
    assert!(matches!(
        tree.kind(ordered),
        NodeKind::OrderedQuery {
            parenthesized: true,
            query_order: Some(_),
            ..
        }
    ));
}

#[test]
fn test_subquery_in_from() {
    let tree = parse("select t from (select e.name as n from Employee e) t").unwrap();
    assert_eq!(
        count_kind(&tree, |k| matches!(k, NodeKind::FromRoot { target: FromTarget::Subquery { .. }, .. })),
        1
    );
}

#[test]
fn test_trailing_semicolon() {
    assert!(parse("select e from Employee e;").is_ok());
}

#[test]
fn test_parse_errors() {
    assert!(matches!(parse(""), Err(HqlError::ParseError(_))));
    assert!(matches!(parse("delete from Employee e"), Err(HqlError::ParseError(_))));
    assert!(matches!(parse("select e from Employee e where"), Err(HqlError::ParseError(_))));
    assert!(matches!(parse("select e from Employee e )"), Err(HqlError::ParseError(_))));
    assert!(matches!(parse("select e from Employee e order by"), Err(HqlError::ParseError(_))));
    assert!(matches!(
        parse("select e from Employee e where e.name = 'open"),
        Err(HqlError::ParseError(_))
    ));
}

#[test]
fn test_parent_links_are_complete() {
    let tree = parse("select e from Employee e join e.address a where a.city = :city").unwrap();
    for index in 0..tree.len() {
        let id = NodeId(index);
        if id != tree.root() {
            assert!(tree.parent(id).is_some(), "node {} has no parent", index);
        }
    }
}
