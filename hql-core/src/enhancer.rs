//! String-level facade over the parser and transformer.

use tracing::debug;

use crate::ast::QueryTree;
use crate::error::HqlResult;
use crate::parser::parse;
use crate::renderer::render_tree;
use crate::sort::Sort;
use crate::transformer::{HqlQueryTransformer, TransformedQuery};

/// A parsed query that can be re-rendered with a sort or as a count query.
///
/// The query is parsed once; every operation runs a fresh transformer over the
/// same tree.
#[derive(Debug, Clone)]
pub struct QueryEnhancer {
    query: String,
    tree: QueryTree,
}

impl QueryEnhancer {
    pub fn parse(query: &str) -> HqlResult<Self> {
        let tree = parse(query)?;
        debug!(nodes = tree.len(), "parsed query");
        Ok(Self {
            query: query.to_string(),
            tree,
        })
    }

    /// The query as it was given.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn tree(&self) -> &QueryTree {
        &self.tree
    }

    pub fn apply_sorting(&self, sort: &Sort) -> String {
        HqlQueryTransformer::sorting(sort.clone())
            .transform(&self.tree)
            .render()
    }

    /// Count query; `count_projection` replaces the counted expression when given.
    pub fn create_count_query(&self, count_projection: Option<&str>) -> String {
        HqlQueryTransformer::counting(count_projection.map(str::to_string))
            .transform(&self.tree)
            .render()
    }

    pub fn detect_alias(&self) -> Option<String> {
        self.inspect().alias().map(str::to_string)
    }

    /// The outer query's selection list as text.
    pub fn projection(&self) -> String {
        self.inspect().projection_text()
    }

    pub fn has_constructor_expression(&self) -> bool {
        self.inspect().has_constructor_expression()
    }

    /// The query normalized through the default renderer.
    pub fn render(&self) -> String {
        render_tree(&self.tree)
    }

    fn inspect(&self) -> TransformedQuery {
        HqlQueryTransformer::default().transform(&self.tree)
    }
}
