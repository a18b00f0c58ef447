//! Query tree rendering.
//!
//! [`QueryVisitor`] walks a [`QueryTree`] top-down and produces a token stream.
//! `visit` dispatches on the node kind; eight node kinds go through overridable
//! hook methods whose default bodies are the plain renderings in [`render`].
//! An implementor overriding a hook can still call the matching `render`
//! function to get the default output. Every other kind renders through
//! [`render::node`].
//!
//! [`HqlQueryRenderer`] overrides nothing and reproduces the query.

use crate::ast::{NodeId, NodeKind, QueryTree};
use crate::token::{self, QueryToken};
use crate::transformer::ResolvedState;

pub trait QueryVisitor {
    fn visit(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        match tree.kind(id) {
            NodeKind::OrderedQuery { .. } => self.visit_ordered_query(tree, id),
            NodeKind::FromQuery { .. } => self.visit_from_query(tree, id),
            NodeKind::QueryOrder { .. } => self.visit_query_order(tree, id),
            NodeKind::FromRoot { .. } => self.visit_from_root(tree, id),
            NodeKind::Alias { .. } => self.visit_alias(tree, id),
            NodeKind::Variable { .. } => self.visit_variable(tree, id),
            NodeKind::SelectClause { .. } => self.visit_select_clause(tree, id),
            NodeKind::Instantiation { .. } => self.visit_instantiation(tree, id),
            _ => render::node(self, tree, id),
        }
    }

    fn visit_ordered_query(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        render::ordered_query(self, tree, id)
    }

    fn visit_from_query(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        render::from_query(self, tree, id)
    }

    fn visit_query_order(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        render::query_order(self, tree, id)
    }

    fn visit_from_root(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        render::from_root(self, tree, id)
    }

    fn visit_alias(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        render::alias(tree, id)
    }

    fn visit_variable(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        render::variable(tree, id)
    }

    fn visit_select_clause(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        render::select_clause(self, tree, id)
    }

    fn visit_instantiation(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        render::instantiation(self, tree, id)
    }
}

/// Renders a query tree unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct HqlQueryRenderer;

impl QueryVisitor for HqlQueryRenderer {}

/// Render `tree` back to query text.
pub fn render_tree(tree: &QueryTree) -> String {
    let tokens = HqlQueryRenderer.visit(tree, tree.root());
    token::render(&tokens, &ResolvedState::default())
}

/// Default renderings, one per node kind.
pub mod render {
    use super::QueryVisitor;
    use crate::ast::{FromTarget, InTarget, NodeId, NodeKind, QueryTree};
    use crate::token::{
        join_with_commas, nospace, QueryToken, TOKEN_CLOSE_PAREN, TOKEN_COMMA, TOKEN_OPEN_PAREN,
        TOKEN_PERCENT, TOKEN_STAR,
    };

    /// Render any node, dispatching children back through `visitor`.
    pub fn node<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        id: NodeId,
    ) -> Vec<QueryToken> {
        let mut tokens = Vec::new();

        match tree.kind(id) {
            NodeKind::SelectStatement { query_expression }
            | NodeKind::Subquery { query_expression } => {
                tokens.extend(visitor.visit(tree, *query_expression));
            }
            NodeKind::QueryExpression { first, rest } => {
                tokens.extend(visitor.visit(tree, *first));
                for (operator, query) in rest {
                    tokens.push(QueryToken::new(operator.as_str()));
                    tokens.extend(visitor.visit(tree, *query));
                }
            }
            NodeKind::OrderedQuery { .. } => return ordered_query(visitor, tree, id),
            NodeKind::SelectQuery {
                select_clause,
                from_clause,
                where_clause,
                group_by_clause,
                having_clause,
            } => {
                tokens.extend(visitor.visit(tree, *select_clause));
                for clause in [from_clause, where_clause, group_by_clause, having_clause]
                    .into_iter()
                    .flatten()
                {
                    tokens.extend(visitor.visit(tree, *clause));
                }
            }
            NodeKind::FromQuery { .. } => return from_query(visitor, tree, id),
            NodeKind::QueryOrder { .. } => return query_order(visitor, tree, id),
            NodeKind::OrderByClause { keyword, items }
            | NodeKind::GroupByClause { keyword, items } => {
                tokens.push(QueryToken::new(keyword.as_str()));
                let items = items.iter().map(|item| visitor.visit(tree, *item)).collect();
                join_with_commas(&mut tokens, items);
            }
            NodeKind::SortedItem {
                expression,
                direction,
                nulls,
            } => {
                tokens.extend(visitor.visit(tree, *expression));
                tokens.extend(direction.iter().map(|d| QueryToken::new(d.as_str())));
                tokens.extend(nulls.iter().map(|n| QueryToken::new(n.as_str())));
            }
            NodeKind::LimitClause { keyword, value } => {
                tokens.push(QueryToken::new(keyword.as_str()));
                tokens.extend(visitor.visit(tree, *value));
            }
            NodeKind::OffsetClause {
                keyword,
                value,
                rows,
            } => {
                tokens.push(QueryToken::new(keyword.as_str()));
                tokens.extend(visitor.visit(tree, *value));
                tokens.extend(rows.iter().map(|r| QueryToken::new(r.as_str())));
            }
            NodeKind::FetchClause {
                keyword,
                value,
                percent,
                trailing,
            } => {
                tokens.push(QueryToken::new(keyword.as_str()));
                tokens.extend(visitor.visit(tree, *value));
                if *percent {
                    nospace(&mut tokens);
                    tokens.push(TOKEN_PERCENT);
                }
                tokens.push(QueryToken::new(trailing.as_str()));
            }
            NodeKind::FromClause { keyword, roots } => {
                tokens.push(QueryToken::new(keyword.as_str()));
                let roots = roots.iter().map(|root| visitor.visit(tree, *root)).collect();
                join_with_commas(&mut tokens, roots);
            }
            NodeKind::EntityWithJoins { root, joins } => {
                tokens.extend(visitor.visit(tree, *root));
                for join in joins {
                    // `, in(...)` attaches to the preceding root
                    if matches!(tree.kind(*join), NodeKind::CollectionJoin { .. }) {
                        nospace(&mut tokens);
                    }
                    tokens.extend(visitor.visit(tree, *join));
                }
            }
            NodeKind::FromRoot { .. } => return from_root(visitor, tree, id),
            NodeKind::Join {
                keyword,
                fetch,
                target,
                variable,
                restriction,
            } => {
                tokens.push(QueryToken::new(keyword.as_str()));
                tokens.extend(fetch.iter().map(|f| QueryToken::new(f.as_str())));
                tokens.extend(from_target(visitor, tree, target));
                if let Some(variable) = variable {
                    tokens.extend(visitor.visit(tree, *variable));
                }
                if let Some((keyword, predicate)) = restriction {
                    tokens.push(QueryToken::new(keyword.as_str()));
                    tokens.extend(visitor.visit(tree, *predicate));
                }
            }
            NodeKind::CrossJoin {
                keyword,
                entity,
                alias,
            } => {
                tokens.push(QueryToken::new(keyword.as_str()));
                tokens.push(QueryToken::new(entity.as_str()));
                if let Some(alias) = alias {
                    tokens.extend(visitor.visit(tree, *alias));
                }
            }
            NodeKind::CollectionJoin { in_kw, path, alias } => {
                tokens.push(TOKEN_COMMA);
                tokens.push(QueryToken::with_space(in_kw.as_str(), false));
                tokens.push(TOKEN_OPEN_PAREN);
                tokens.extend(visitor.visit(tree, *path));
                nospace(&mut tokens);
                tokens.push(TOKEN_CLOSE_PAREN);
                if let Some(alias) = alias {
                    tokens.extend(visitor.visit(tree, *alias));
                }
            }
            NodeKind::Alias { .. } => return alias(tree, id),
            NodeKind::Variable { .. } => return variable(tree, id),
            NodeKind::SelectClause { .. } => return select_clause(visitor, tree, id),
            NodeKind::SelectionList { items } => {
                let items = items.iter().map(|item| visitor.visit(tree, *item)).collect();
                join_with_commas(&mut tokens, items);
            }
            NodeKind::Selection {
                expression,
                variable,
            }
            | NodeKind::InstantiationArgument {
                expression,
                variable,
            } => {
                tokens.extend(visitor.visit(tree, *expression));
                if let Some(variable) = variable {
                    tokens.extend(visitor.visit(tree, *variable));
                }
            }
            NodeKind::Instantiation { .. } => return instantiation(visitor, tree, id),
            NodeKind::ObjectSelection {
                keyword,
                identifier,
            } => {
                tokens.push(QueryToken::with_space(keyword.as_str(), false));
                tokens.push(TOKEN_OPEN_PAREN);
                tokens.push(QueryToken::with_space(identifier.as_str(), false));
                tokens.push(TOKEN_CLOSE_PAREN);
            }
            NodeKind::WhereClause { keyword, predicate }
            | NodeKind::HavingClause { keyword, predicate } => {
                tokens.push(QueryToken::new(keyword.as_str()));
                tokens.extend(visitor.visit(tree, *predicate));
            }
            NodeKind::Path(text) | NodeKind::Literal(text) | NodeKind::Parameter(text) => {
                tokens.push(QueryToken::new(text.as_str()));
            }
            NodeKind::Function {
                name,
                distinct,
                star,
                arguments,
            } => {
                tokens.push(QueryToken::with_space(name.as_str(), false));
                tokens.push(TOKEN_OPEN_PAREN);
                if *star {
                    tokens.push(TOKEN_STAR);
                } else {
                    tokens.extend(distinct.iter().map(|d| QueryToken::new(d.as_str())));
                    let arguments = arguments
                        .iter()
                        .map(|argument| visitor.visit(tree, *argument))
                        .collect();
                    join_with_commas(&mut tokens, arguments);
                }
                nospace(&mut tokens);
                tokens.push(TOKEN_CLOSE_PAREN);
            }
            NodeKind::Binary {
                left,
                operator,
                right,
            } => {
                tokens.extend(visitor.visit(tree, *left));
                tokens.push(QueryToken::new(operator.as_str()));
                tokens.extend(visitor.visit(tree, *right));
            }
            NodeKind::Unary { operator, operand } => {
                // Sign operators bind to their operand; `not` is a word.
                let word = operator.chars().all(|c| c.is_ascii_alphabetic());
                tokens.push(QueryToken::with_space(operator.as_str(), word));
                tokens.extend(visitor.visit(tree, *operand));
            }
            NodeKind::Parenthesized(inner) => {
                tokens.push(TOKEN_OPEN_PAREN);
                tokens.extend(visitor.visit(tree, *inner));
                nospace(&mut tokens);
                tokens.push(TOKEN_CLOSE_PAREN);
            }
            NodeKind::IsNull {
                expression,
                keyword,
            } => {
                tokens.extend(visitor.visit(tree, *expression));
                tokens.push(QueryToken::new(keyword.as_str()));
            }
            NodeKind::Between {
                expression,
                not,
                between_kw,
                low,
                and_kw,
                high,
            } => {
                tokens.extend(visitor.visit(tree, *expression));
                tokens.extend(not.iter().map(|n| QueryToken::new(n.as_str())));
                tokens.push(QueryToken::new(between_kw.as_str()));
                tokens.extend(visitor.visit(tree, *low));
                tokens.push(QueryToken::new(and_kw.as_str()));
                tokens.extend(visitor.visit(tree, *high));
            }
            NodeKind::InList {
                expression,
                not,
                in_kw,
                target,
            } => {
                tokens.extend(visitor.visit(tree, *expression));
                tokens.extend(not.iter().map(|n| QueryToken::new(n.as_str())));
                tokens.push(QueryToken::new(in_kw.as_str()));
                match target {
                    InTarget::List(items) => {
                        tokens.push(TOKEN_OPEN_PAREN);
                        let items = items.iter().map(|item| visitor.visit(tree, *item)).collect();
                        join_with_commas(&mut tokens, items);
                        nospace(&mut tokens);
                        tokens.push(TOKEN_CLOSE_PAREN);
                    }
                    InTarget::Subquery(subquery) => {
                        tokens.extend(parenthesized(visitor, tree, *subquery));
                    }
                    InTarget::Parameter(parameter) => {
                        tokens.extend(visitor.visit(tree, *parameter));
                    }
                }
            }
            NodeKind::Like {
                expression,
                not,
                like_kw,
                pattern,
                escape,
            } => {
                tokens.extend(visitor.visit(tree, *expression));
                tokens.extend(not.iter().map(|n| QueryToken::new(n.as_str())));
                tokens.push(QueryToken::new(like_kw.as_str()));
                tokens.extend(visitor.visit(tree, *pattern));
                if let Some((keyword, escape)) = escape {
                    tokens.push(QueryToken::new(keyword.as_str()));
                    tokens.extend(visitor.visit(tree, *escape));
                }
            }
            NodeKind::Exists { keyword, subquery } => {
                tokens.push(QueryToken::new(keyword.as_str()));
                tokens.extend(parenthesized(visitor, tree, *subquery));
            }
            NodeKind::Quantified {
                quantifier,
                subquery,
            } => {
                tokens.push(QueryToken::new(quantifier.as_str()));
                tokens.extend(parenthesized(visitor, tree, *subquery));
            }
            NodeKind::Case {
                case_kw,
                operand,
                whens,
                else_branch,
                end_kw,
            } => {
                tokens.push(QueryToken::new(case_kw.as_str()));
                if let Some(operand) = operand {
                    tokens.extend(visitor.visit(tree, *operand));
                }
                for when in whens {
                    tokens.push(QueryToken::new(when.when_kw.as_str()));
                    tokens.extend(visitor.visit(tree, when.condition));
                    tokens.push(QueryToken::new(when.then_kw.as_str()));
                    tokens.extend(visitor.visit(tree, when.result));
                }
                if let Some((keyword, result)) = else_branch {
                    tokens.push(QueryToken::new(keyword.as_str()));
                    tokens.extend(visitor.visit(tree, *result));
                }
                tokens.push(QueryToken::new(end_kw.as_str()));
            }
        }

        tokens
    }

    /// `( inner )` with no space inside the parentheses.
    pub fn parenthesized<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        inner: NodeId,
    ) -> Vec<QueryToken> {
        let mut tokens = vec![TOKEN_OPEN_PAREN];
        tokens.extend(visitor.visit(tree, inner));
        nospace(&mut tokens);
        tokens.push(TOKEN_CLOSE_PAREN);
        tokens
    }

    /// Target of a from root or join.
    pub fn from_target<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        target: &FromTarget,
    ) -> Vec<QueryToken> {
        match target {
            FromTarget::Entity(name) => vec![QueryToken::new(name.as_str())],
            FromTarget::Path(path) => visitor.visit(tree, *path),
            FromTarget::Subquery { lateral, subquery } => {
                let mut tokens: Vec<QueryToken> = lateral
                    .iter()
                    .map(|l| QueryToken::new(l.as_str()))
                    .collect();
                tokens.extend(parenthesized(visitor, tree, *subquery));
                tokens
            }
        }
    }

    /// The query, or `( queryExpression )`, without its query order.
    pub fn ordered_query_body<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        id: NodeId,
    ) -> Vec<QueryToken> {
        let NodeKind::OrderedQuery {
            body,
            parenthesized: wrapped,
            ..
        } = tree.kind(id)
        else {
            return Vec::new();
        };

        if *wrapped {
            parenthesized(visitor, tree, *body)
        } else {
            visitor.visit(tree, *body)
        }
    }

    pub fn ordered_query<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        id: NodeId,
    ) -> Vec<QueryToken> {
        let mut tokens = ordered_query_body(visitor, tree, id);
        if let NodeKind::OrderedQuery {
            query_order: Some(query_order),
            ..
        } = tree.kind(id)
        {
            tokens.extend(visitor.visit(tree, *query_order));
        }
        tokens
    }

    pub fn from_query<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        id: NodeId,
    ) -> Vec<QueryToken> {
        let mut tokens = Vec::new();
        if let NodeKind::FromQuery {
            from_clause,
            where_clause,
            group_by_clause,
            having_clause,
            select_clause,
        } = tree.kind(id)
        {
            tokens.extend(visitor.visit(tree, *from_clause));
            for clause in [where_clause, group_by_clause, having_clause, select_clause]
                .into_iter()
                .flatten()
            {
                tokens.extend(visitor.visit(tree, *clause));
            }
        }
        tokens
    }

    pub fn query_order<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        id: NodeId,
    ) -> Vec<QueryToken> {
        let mut tokens = Vec::new();
        if let NodeKind::QueryOrder {
            order_by_clause,
            limit_clause,
            offset_clause,
            fetch_clause,
        } = tree.kind(id)
        {
            for clause in [order_by_clause, limit_clause, offset_clause, fetch_clause]
                .into_iter()
                .flatten()
            {
                tokens.extend(visitor.visit(tree, *clause));
            }
        }
        tokens
    }

    pub fn from_root<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        id: NodeId,
    ) -> Vec<QueryToken> {
        let mut tokens = Vec::new();
        if let NodeKind::FromRoot { target, variable } = tree.kind(id) {
            tokens.extend(from_target(visitor, tree, target));
            if let Some(variable) = variable {
                tokens.extend(visitor.visit(tree, *variable));
            }
        }
        tokens
    }

    pub fn alias(tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        match tree.kind(id) {
            NodeKind::Alias { as_kw, name } => named(as_kw.as_deref(), name),
            _ => Vec::new(),
        }
    }

    pub fn variable(tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        match tree.kind(id) {
            NodeKind::Variable { as_kw, name } => named(as_kw.as_deref(), name),
            _ => Vec::new(),
        }
    }

    fn named(as_kw: Option<&str>, name: &str) -> Vec<QueryToken> {
        let mut tokens: Vec<QueryToken> = as_kw.into_iter().map(QueryToken::new).collect();
        tokens.push(QueryToken::new(name));
        tokens
    }

    pub fn select_clause<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        id: NodeId,
    ) -> Vec<QueryToken> {
        let mut tokens = Vec::new();
        if let NodeKind::SelectClause {
            keyword,
            distinct,
            selection_list,
        } = tree.kind(id)
        {
            tokens.push(QueryToken::new(keyword.as_str()));
            tokens.extend(distinct.iter().map(|d| QueryToken::new(d.as_str())));
            tokens.extend(visitor.visit(tree, *selection_list));
        }
        tokens
    }

    pub fn instantiation<V: QueryVisitor + ?Sized>(
        visitor: &mut V,
        tree: &QueryTree,
        id: NodeId,
    ) -> Vec<QueryToken> {
        let mut tokens = Vec::new();
        if let NodeKind::Instantiation {
            new_kw,
            target,
            arguments,
        } = tree.kind(id)
        {
            tokens.push(QueryToken::new(new_kw.as_str()));
            tokens.push(QueryToken::with_space(target.as_str(), false));
            tokens.push(TOKEN_OPEN_PAREN);
            let arguments = arguments
                .iter()
                .map(|argument| visitor.visit(tree, *argument))
                .collect();
            join_with_commas(&mut tokens, arguments);
            nospace(&mut tokens);
            tokens.push(TOKEN_CLOSE_PAREN);
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn round_trip(query: &str) -> String {
        render_tree(&parse(query).unwrap())
    }

    #[test]
    fn test_identity_rendering() {
        let queries = [
            "select e from Employee e",
            "SELECT DISTINCT u FROM User u WHERE u.age >= 18",
            "select e.name as n, count(e) from Employee e group by e.name having count(e) > 1",
            "select e from Employee e order by e.name desc nulls last, e.id",
            "select e from Employee e order by e.name limit 10 offset 5",
            "select e from Employee e fetch first 10% rows only",
            "select new com.example.Dto(e.firstName, e.lastName) from Employee e",
            "select e from Employee e left outer join fetch e.department d join e.manager m on m.id = d.id",
            "select e from Employee e cross join Company c",
            "select e from Employee e, in(e.phones) p where p.number like '555%'",
            "select e from Employee e where e.id in (select m.id from Manager m) and not exists (select a from Audit a)",
            "select e from Employee e where e.name is not null and e.age between 18 and 65",
            "select e from Employee e where e.id in (1, 2, 3) or e.role in :roles",
            "select count(*), count(distinct e.id), cast(e.age as Integer) from Employee e",
            "select case when e.age > 60 then 'senior' else 'junior' end from Employee e",
            "select -e.balance, e.a * (e.b + e.c), e.first || ' ' || e.last from Employee e",
            "select object(e) from Employee e",
            "select t from (select e.name as n from Employee e) t",
            "select a from A a union all select b from B b",
            "(select a from A a) order by a.name",
            "from Person p where p.salary > all (select s.amount from Salary s)",
        ];

        for query in queries {
            assert_eq!(round_trip(query), query);
        }
    }

    #[test]
    fn test_normalizes_whitespace() {
        assert_eq!(
            round_trip("select  e\n  from Employee   e  where e.id=:id"),
            "select e from Employee e where e.id = :id"
        );
        assert_eq!(
            round_trip("select count( e ) from Employee e"),
            "select count(e) from Employee e"
        );
    }
}
