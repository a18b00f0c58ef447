//! Sort injection and count-query rewriting over a parsed query.
//!
//! [`HqlQueryTransformer`] is the default renderer with eight hooks overridden.
//! It walks the tree once, tracking the primary alias, the projection and the
//! projection aliases as it goes, and returns a [`TransformedQuery`]. Tokens
//! whose text depends on that tracked state are left deferred and resolved when
//! the query is rendered.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::ast::{NodeId, NodeKind, QueryTree};
use crate::renderer::{render, QueryVisitor};
use crate::sort::{Direction, Sort};
use crate::token::{
    self, clip, nospace, space, Deferred, QueryToken, TOKEN_ASC, TOKEN_CLOSE_PAREN, TOKEN_COMMA,
    TOKEN_COUNT_FUNC, TOKEN_DESC, TOKEN_LOWER_FUNC, TOKEN_ORDER_BY, TOKEN_SELECT_COUNT,
};

/// Transformer state frozen after the traversal; deferred tokens resolve against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedState {
    alias: Option<String>,
    projection: Vec<QueryToken>,
    projection_aliases: HashSet<String>,
    has_constructor_expression: bool,
}

impl ResolvedState {
    pub fn new(
        alias: Option<String>,
        projection: Vec<QueryToken>,
        projection_aliases: HashSet<String>,
        has_constructor_expression: bool,
    ) -> Self {
        Self {
            alias,
            projection,
            projection_aliases,
            has_constructor_expression,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Whether a sort property gets qualified with the primary alias.
    ///
    /// Function expressions and references to projection aliases are left as is.
    pub fn should_alias(&self, property: &str) -> bool {
        !property.contains('(') && !self.projection_aliases.contains(property)
    }
}

/// Result of one transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedQuery {
    tokens: Vec<QueryToken>,
    state: ResolvedState,
}

impl TransformedQuery {
    pub fn tokens(&self) -> &[QueryToken] {
        &self.tokens
    }

    pub fn state(&self) -> &ResolvedState {
        &self.state
    }

    /// The transformed query text.
    pub fn render(&self) -> String {
        token::render(&self.tokens, &self.state)
    }

    /// The primary alias, if the outer query declares one.
    pub fn alias(&self) -> Option<&str> {
        self.state.alias()
    }

    /// Tokens of the outer query's selection list; empty when it has none.
    pub fn projection(&self) -> &[QueryToken] {
        &self.state.projection
    }

    pub fn projection_text(&self) -> String {
        token::render(&self.state.projection, &self.state)
    }

    pub fn has_constructor_expression(&self) -> bool {
        self.state.has_constructor_expression
    }
}

/// Rewrites a query tree with an injected sort or into a count query.
#[derive(Debug, Clone, Default)]
pub struct HqlQueryTransformer {
    sort: Sort,
    count_query: bool,
    count_projection: Option<String>,

    primary_from_alias: Option<String>,
    projection: Vec<QueryToken>,
    projection_processed: bool,
    has_constructor_expression: bool,
    projection_aliases: HashSet<String>,
}

impl HqlQueryTransformer {
    pub fn new(sort: Sort, count_query: bool, count_projection: Option<String>) -> Self {
        Self {
            sort,
            count_query,
            count_projection,
            ..Self::default()
        }
    }

    /// Transformer that appends `sort` to the outer query.
    pub fn sorting(sort: Sort) -> Self {
        Self::new(sort, false, None)
    }

    /// Transformer that turns the outer query into a count query.
    pub fn counting(count_projection: Option<String>) -> Self {
        Self::new(Sort::unsorted(), true, count_projection)
    }

    pub fn transform(mut self, tree: &QueryTree) -> TransformedQuery {
        debug!(
            count_query = self.count_query,
            orders = self.sort.len(),
            "transforming query"
        );

        let tokens = self.visit(tree, tree.root());

        debug!(
            alias = ?self.primary_from_alias,
            constructor_expression = self.has_constructor_expression,
            "query transformed"
        );

        TransformedQuery {
            tokens,
            state: ResolvedState::new(
                self.primary_from_alias,
                self.projection,
                self.projection_aliases,
                self.has_constructor_expression,
            ),
        }
    }

    fn record_primary_alias(&mut self, tree: &QueryTree, id: NodeId, tokens: &[QueryToken]) {
        if self.primary_from_alias.is_some() || tree.is_subquery(id) {
            return;
        }
        if let Some(alias) = tokens.last().and_then(QueryToken::literal) {
            trace!(alias, "primary alias");
            self.primary_from_alias = Some(alias.to_string());
        }
    }

    fn count_target(&self) -> QueryToken {
        match &self.count_projection {
            Some(projection) => QueryToken::new(projection.as_str()),
            None => QueryToken::deferred(Deferred::PrimaryAlias, true),
        }
    }

    /// `order by` (or `,` after an existing clause) followed by every sort term.
    fn append_sort(&self, tokens: &mut Vec<QueryToken>, after_order_by: bool) {
        if after_order_by {
            nospace(tokens);
            tokens.push(TOKEN_COMMA);
        } else {
            space(tokens);
            tokens.push(TOKEN_ORDER_BY);
        }

        for order in &self.sort {
            trace!(property = %order.property, direction = ?order.direction, "sort term");

            if order.ignore_case {
                tokens.push(TOKEN_LOWER_FUNC);
            }
            tokens.push(QueryToken::deferred(
                Deferred::SortProperty(order.property.clone()),
                true,
            ));
            if order.ignore_case {
                nospace(tokens);
                tokens.push(TOKEN_CLOSE_PAREN);
            }
            tokens.push(match order.direction {
                Direction::Asc => TOKEN_ASC,
                Direction::Desc => TOKEN_DESC,
            });
            tokens.push(TOKEN_COMMA);
        }

        clip(tokens);
        space(tokens);
    }
}

impl QueryVisitor for HqlQueryTransformer {
    fn visit_ordered_query(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        let mut tokens = render::ordered_query_body(self, tree, id);

        let NodeKind::OrderedQuery { query_order, .. } = tree.kind(id) else {
            return tokens;
        };

        if self.count_query || tree.is_subquery(id) {
            if let Some(query_order) = query_order {
                tokens.extend(self.visit(tree, *query_order));
            }
            return tokens;
        }

        let (order_by_clause, rest) = match query_order.map(|q| tree.kind(q)) {
            Some(NodeKind::QueryOrder {
                order_by_clause,
                limit_clause,
                offset_clause,
                fetch_clause,
            }) => (*order_by_clause, [*limit_clause, *offset_clause, *fetch_clause]),
            _ => (None, [None; 3]),
        };

        if let Some(order_by_clause) = order_by_clause {
            tokens.extend(self.visit(tree, order_by_clause));
        }

        if self.sort.is_sorted() {
            self.append_sort(&mut tokens, order_by_clause.is_some());
        }

        for clause in rest.into_iter().flatten() {
            tokens.extend(self.visit(tree, clause));
        }

        tokens
    }

    fn visit_from_query(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        let NodeKind::FromQuery {
            from_clause,
            where_clause,
            group_by_clause,
            having_clause,
            select_clause,
        } = tree.kind(id)
        else {
            return Vec::new();
        };

        if !(self.count_query && select_clause.is_none() && !tree.is_subquery(id)) {
            return render::from_query(self, tree, id);
        }

        let mut tokens = vec![TOKEN_SELECT_COUNT, self.count_target()];
        nospace(&mut tokens);
        tokens.push(TOKEN_CLOSE_PAREN);

        tokens.extend(self.visit(tree, *from_clause));
        for clause in [where_clause, group_by_clause, having_clause]
            .into_iter()
            .flatten()
        {
            tokens.extend(self.visit(tree, *clause));
        }

        tokens
    }

    fn visit_query_order(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        if !self.count_query || tree.is_subquery(id) {
            return render::query_order(self, tree, id);
        }

        let NodeKind::QueryOrder {
            limit_clause,
            offset_clause,
            fetch_clause,
            ..
        } = tree.kind(id)
        else {
            return Vec::new();
        };

        let mut tokens = Vec::new();
        for clause in [limit_clause, offset_clause, fetch_clause]
            .into_iter()
            .flatten()
        {
            tokens.extend(self.visit(tree, *clause));
        }
        tokens
    }

    fn visit_from_root(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        let tokens = render::from_root(self, tree, id);
        if let NodeKind::FromRoot {
            variable: Some(_), ..
        } = tree.kind(id)
        {
            self.record_primary_alias(tree, id, &tokens);
        }
        tokens
    }

    fn visit_alias(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        let tokens = render::alias(tree, id);
        self.record_primary_alias(tree, id, &tokens);
        tokens
    }

    fn visit_variable(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        if let NodeKind::Variable {
            as_kw: Some(_),
            name,
        } = tree.kind(id)
        {
            self.projection_aliases.insert(name.clone());
        }
        render::variable(tree, id)
    }

    fn visit_select_clause(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        let NodeKind::SelectClause {
            keyword,
            distinct,
            selection_list,
        } = tree.kind(id)
        else {
            return Vec::new();
        };

        let top_level = !tree.is_subquery(id);
        let counting = self.count_query && top_level;

        let mut tokens = vec![QueryToken::new(keyword.as_str())];
        if counting {
            tokens.push(TOKEN_COUNT_FUNC);
        }
        if let Some(distinct) = distinct {
            tokens.push(QueryToken::new(distinct.as_str()));
        }

        let selection_tokens = self.visit(tree, *selection_list);

        if counting {
            let constructor = || {
                tree.any_descendant(*selection_list, |kind| {
                    matches!(kind, NodeKind::Instantiation { .. })
                })
            };

            if self.count_projection.is_some() || distinct.is_none() || constructor() {
                tokens.push(self.count_target());
            } else {
                tokens.extend(selection_tokens.iter().cloned());
            }
            nospace(&mut tokens);
            tokens.push(TOKEN_CLOSE_PAREN);
        } else {
            tokens.extend(selection_tokens.iter().cloned());
        }

        if top_level && !self.projection_processed {
            self.projection = selection_tokens;
            self.projection_processed = true;
        }

        tokens
    }

    fn visit_instantiation(&mut self, tree: &QueryTree, id: NodeId) -> Vec<QueryToken> {
        self.has_constructor_expression = true;
        render::instantiation(self, tree, id)
    }
}
