//! Query tree for parsed HQL statements.
//!
//! Nodes live in an arena owned by [`QueryTree`] and refer to each other by
//! [`NodeId`]. Every node except the [`NodeKind::SelectStatement`] root carries a
//! parent link, which is what lets the transformer ask whether a node sits inside
//! a subquery. Keyword fields hold the spelling found in the source so that
//! rendering reproduces the caller's casing.

use crate::error::{HqlError, HqlResult};

/// Index of a node inside its [`QueryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

/// `entityName` or `LATERAL? ( subquery )` in a from root or join.
#[derive(Debug, Clone, PartialEq)]
pub enum FromTarget {
    Entity(String),
    /// Path expression node (join targets only)
    Path(NodeId),
    Subquery {
        lateral: Option<String>,
        subquery: NodeId,
    },
}

/// Right-hand side of `IN`.
#[derive(Debug, Clone, PartialEq)]
pub enum InTarget {
    List(Vec<NodeId>),
    Subquery(NodeId),
    Parameter(NodeId),
}

/// `WHEN condition THEN result`
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub when_kw: String,
    pub condition: NodeId,
    pub then_kw: String,
    pub result: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // Statement structure
    SelectStatement {
        query_expression: NodeId,
    },
    QueryExpression {
        first: NodeId,
        /// (set operator as written, ordered query)
        rest: Vec<(String, NodeId)>,
    },
    OrderedQuery {
        /// Either a `SelectQuery`/`FromQuery` or a parenthesized `QueryExpression`
        body: NodeId,
        parenthesized: bool,
        query_order: Option<NodeId>,
    },
    SelectQuery {
        select_clause: NodeId,
        from_clause: Option<NodeId>,
        where_clause: Option<NodeId>,
        group_by_clause: Option<NodeId>,
        having_clause: Option<NodeId>,
    },
    FromQuery {
        from_clause: NodeId,
        where_clause: Option<NodeId>,
        group_by_clause: Option<NodeId>,
        having_clause: Option<NodeId>,
        select_clause: Option<NodeId>,
    },
    QueryOrder {
        order_by_clause: Option<NodeId>,
        limit_clause: Option<NodeId>,
        offset_clause: Option<NodeId>,
        fetch_clause: Option<NodeId>,
    },
    OrderByClause {
        keyword: String,
        items: Vec<NodeId>,
    },
    SortedItem {
        expression: NodeId,
        direction: Option<String>,
        nulls: Option<String>,
    },
    LimitClause {
        keyword: String,
        value: NodeId,
    },
    OffsetClause {
        keyword: String,
        value: NodeId,
        rows: Option<String>,
    },
    FetchClause {
        /// `fetch first` / `fetch next`
        keyword: String,
        value: NodeId,
        percent: bool,
        /// `rows only` / `row with ties`
        trailing: String,
    },

    // FROM
    FromClause {
        keyword: String,
        roots: Vec<NodeId>,
    },
    EntityWithJoins {
        root: NodeId,
        joins: Vec<NodeId>,
    },
    FromRoot {
        target: FromTarget,
        variable: Option<NodeId>,
    },
    Join {
        /// `join`, `left outer join`, ...
        keyword: String,
        fetch: Option<String>,
        target: FromTarget,
        variable: Option<NodeId>,
        /// (`on`/`with`, predicate)
        restriction: Option<(String, NodeId)>,
    },
    CrossJoin {
        keyword: String,
        entity: String,
        alias: Option<NodeId>,
    },
    CollectionJoin {
        in_kw: String,
        path: NodeId,
        alias: Option<NodeId>,
    },
    Variable {
        as_kw: Option<String>,
        name: String,
    },
    Alias {
        as_kw: Option<String>,
        name: String,
    },

    // SELECT
    SelectClause {
        keyword: String,
        distinct: Option<String>,
        selection_list: NodeId,
    },
    SelectionList {
        items: Vec<NodeId>,
    },
    Selection {
        expression: NodeId,
        variable: Option<NodeId>,
    },
    Instantiation {
        new_kw: String,
        target: String,
        arguments: Vec<NodeId>,
    },
    InstantiationArgument {
        expression: NodeId,
        variable: Option<NodeId>,
    },
    ObjectSelection {
        keyword: String,
        identifier: String,
    },

    // Restrictions and grouping
    WhereClause {
        keyword: String,
        predicate: NodeId,
    },
    GroupByClause {
        keyword: String,
        items: Vec<NodeId>,
    },
    HavingClause {
        keyword: String,
        predicate: NodeId,
    },
    Subquery {
        query_expression: NodeId,
    },

    // Expressions
    Path(String),
    Literal(String),
    Parameter(String),
    Function {
        name: String,
        distinct: Option<String>,
        star: bool,
        arguments: Vec<NodeId>,
    },
    Binary {
        left: NodeId,
        operator: String,
        right: NodeId,
    },
    Unary {
        operator: String,
        operand: NodeId,
    },
    /// `( expression )` or `( subquery )`
    Parenthesized(NodeId),
    IsNull {
        expression: NodeId,
        /// `is null` / `is not null`
        keyword: String,
    },
    Between {
        expression: NodeId,
        not: Option<String>,
        between_kw: String,
        low: NodeId,
        and_kw: String,
        high: NodeId,
    },
    InList {
        expression: NodeId,
        not: Option<String>,
        in_kw: String,
        target: InTarget,
    },
    Like {
        expression: NodeId,
        not: Option<String>,
        like_kw: String,
        pattern: NodeId,
        escape: Option<(String, NodeId)>,
    },
    Exists {
        keyword: String,
        subquery: NodeId,
    },
    /// `all (subquery)` / `any (...)` / `some (...)`
    Quantified {
        quantifier: String,
        subquery: NodeId,
    },
    Case {
        case_kw: String,
        operand: Option<NodeId>,
        whens: Vec<WhenClause>,
        else_branch: Option<(String, NodeId)>,
        end_kw: String,
    },
}

impl NodeKind {
    /// Child node ids in source order.
    pub fn children(&self) -> Vec<NodeId> {
        fn from_target(target: &FromTarget, out: &mut Vec<NodeId>) {
            match target {
                FromTarget::Entity(_) => {}
                FromTarget::Path(id) => out.push(*id),
                FromTarget::Subquery { subquery, .. } => out.push(*subquery),
            }
        }

        let mut out = Vec::new();
        match self {
            NodeKind::SelectStatement { query_expression }
            | NodeKind::Subquery { query_expression } => out.push(*query_expression),
            NodeKind::QueryExpression { first, rest } => {
                out.push(*first);
                out.extend(rest.iter().map(|(_, id)| *id));
            }
            NodeKind::OrderedQuery {
                body, query_order, ..
            } => {
                out.push(*body);
                out.extend(*query_order);
            }
            NodeKind::SelectQuery {
                select_clause,
                from_clause,
                where_clause,
                group_by_clause,
                having_clause,
            } => {
                out.push(*select_clause);
                out.extend(*from_clause);
                out.extend(*where_clause);
                out.extend(*group_by_clause);
                out.extend(*having_clause);
            }
            NodeKind::FromQuery {
                from_clause,
                where_clause,
                group_by_clause,
                having_clause,
                select_clause,
            } => {
                out.push(*from_clause);
                out.extend(*where_clause);
                out.extend(*group_by_clause);
                out.extend(*having_clause);
                out.extend(*select_clause);
            }
            NodeKind::QueryOrder {
                order_by_clause,
                limit_clause,
                offset_clause,
                fetch_clause,
            } => {
                out.extend(*order_by_clause);
                out.extend(*limit_clause);
                out.extend(*offset_clause);
                out.extend(*fetch_clause);
            }
            NodeKind::OrderByClause { items, .. } | NodeKind::GroupByClause { items, .. } => {
                out.extend(items.iter().copied())
            }
            NodeKind::SortedItem { expression, .. } => out.push(*expression),
            NodeKind::LimitClause { value, .. }
            | NodeKind::OffsetClause { value, .. }
            | NodeKind::FetchClause { value, .. } => out.push(*value),
            NodeKind::FromClause { roots, .. } => out.extend(roots.iter().copied()),
            NodeKind::EntityWithJoins { root, joins } => {
                out.push(*root);
                out.extend(joins.iter().copied());
            }
            NodeKind::FromRoot { target, variable } => {
                from_target(target, &mut out);
                out.extend(*variable);
            }
            NodeKind::Join {
                target,
                variable,
                restriction,
                ..
            } => {
                from_target(target, &mut out);
                out.extend(*variable);
                out.extend(restriction.as_ref().map(|(_, id)| *id));
            }
            NodeKind::CrossJoin { alias, .. } => out.extend(*alias),
            NodeKind::CollectionJoin { path, alias, .. } => {
                out.push(*path);
                out.extend(*alias);
            }
            NodeKind::SelectClause { selection_list, .. } => out.push(*selection_list),
            NodeKind::SelectionList { items } => out.extend(items.iter().copied()),
            NodeKind::Selection {
                expression,
                variable,
            }
            | NodeKind::InstantiationArgument {
                expression,
                variable,
            } => {
                out.push(*expression);
                out.extend(*variable);
            }
            NodeKind::Instantiation { arguments, .. } | NodeKind::Function { arguments, .. } => {
                out.extend(arguments.iter().copied())
            }
            NodeKind::WhereClause { predicate, .. } | NodeKind::HavingClause { predicate, .. } => {
                out.push(*predicate)
            }
            NodeKind::Binary { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::Unary { operand, .. } => out.push(*operand),
            NodeKind::Parenthesized(inner) => out.push(*inner),
            NodeKind::IsNull { expression, .. } => out.push(*expression),
            NodeKind::Between {
                expression,
                low,
                high,
                ..
            } => {
                out.push(*expression);
                out.push(*low);
                out.push(*high);
            }
            NodeKind::InList {
                expression, target, ..
            } => {
                out.push(*expression);
                match target {
                    InTarget::List(items) => out.extend(items.iter().copied()),
                    InTarget::Subquery(id) | InTarget::Parameter(id) => out.push(*id),
                }
            }
            NodeKind::Like {
                expression,
                pattern,
                escape,
                ..
            } => {
                out.push(*expression);
                out.push(*pattern);
                out.extend(escape.as_ref().map(|(_, id)| *id));
            }
            NodeKind::Exists { subquery, .. } | NodeKind::Quantified { subquery, .. } => {
                out.push(*subquery)
            }
            NodeKind::Case {
                operand,
                whens,
                else_branch,
                ..
            } => {
                out.extend(*operand);
                for when in whens {
                    out.push(when.condition);
                    out.push(when.result);
                }
                out.extend(else_branch.as_ref().map(|(_, id)| *id));
            }
            NodeKind::Variable { .. }
            | NodeKind::Alias { .. }
            | NodeKind::ObjectSelection { .. }
            | NodeKind::Path(_)
            | NodeKind::Literal(_)
            | NodeKind::Parameter(_) => {}
        }
        out
    }
}

/// An immutable, validated query tree.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl QueryTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` lies inside a nested subquery rather than the outermost query.
    ///
    /// Walks ancestor links until a `Subquery` (true) or the statement root (false).
    pub fn is_subquery(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.kind(current) {
                NodeKind::Subquery { .. } => return true,
                NodeKind::SelectStatement { .. } => return false,
                _ => {}
            }
            current = match self.parent(current) {
                Some(parent) => parent,
                None => panic!("node {} is detached from the statement root", current.0),
            };
        }
    }

    /// Whether any node in the subtree rooted at `id` matches `predicate`.
    pub fn any_descendant(&self, id: NodeId, predicate: impl Fn(&NodeKind) -> bool) -> bool {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let kind = self.kind(current);
            if predicate(kind) {
                return true;
            }
            stack.extend(kind.children());
        }
        false
    }
}

/// Builds a [`QueryTree`] bottom-up.
///
/// Children are pushed before their parent; pushing a node adopts every child it
/// references.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.0) {
                node.parent = Some(id);
            }
        }
        self.nodes.push(Node { kind, parent: None });
        id
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    /// Validate parent links and freeze the tree.
    pub fn finish(self, root: NodeId) -> HqlResult<QueryTree> {
        match self.nodes.get(root.0) {
            Some(Node {
                kind: NodeKind::SelectStatement { .. },
                parent: None,
            }) => {}
            Some(_) => {
                return Err(HqlError::MalformedTree(format!(
                    "root node {} is not a parentless select statement",
                    root.0
                )))
            }
            None => {
                return Err(HqlError::MalformedTree(format!(
                    "root node {} does not exist",
                    root.0
                )))
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if index == root.0 {
                continue;
            }
            if node.parent.is_none() {
                return Err(HqlError::MalformedTree(format!(
                    "node {} is not attached to the statement",
                    index
                )));
            }
            for child in node.kind.children() {
                if child.0 >= self.nodes.len() {
                    return Err(HqlError::MalformedTree(format!(
                        "node {} references missing child {}",
                        index, child.0
                    )));
                }
            }
        }

        Ok(QueryTree {
            nodes: self.nodes,
            root,
        })
    }
}
