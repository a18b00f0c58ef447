//! One-shot rewriting of a query string according to a [`RewriteConfig`].

use hql_core::parse;
use serde::Serialize;
use tracing::info;

use crate::config::RewriteConfig;
use crate::error::RewriteResult;

/// Rewritten query plus what the traversal learned about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteOutput {
    pub query: String,
    pub alias: Option<String>,
    pub projection: String,
    pub constructor_expression: bool,
}

pub fn rewrite(query: &str, config: &RewriteConfig) -> RewriteResult<RewriteOutput> {
    let tree = parse(query)?;
    let result = config.transformer()?.transform(&tree);

    let output = RewriteOutput {
        query: result.render(),
        alias: result.alias().map(str::to_string),
        projection: result.projection_text(),
        constructor_expression: result.has_constructor_expression(),
    };

    info!(
        count = config.count,
        orders = config.sort.len(),
        alias = ?output.alias,
        "Rewrote query"
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RewriteError;
    use hql_core::Order;

    #[test]
    fn test_rewrite_with_sort() {
        let config = RewriteConfig {
            sort: vec![Order::desc("age")],
            ..RewriteConfig::default()
        };
        let output = rewrite("select p.name from Person p", &config).unwrap();
        assert_eq!(output.query, "select p.name from Person p order by p.age desc");
        assert_eq!(output.alias.as_deref(), Some("p"));
        assert_eq!(output.projection, "p.name");
        assert!(!output.constructor_expression);
    }

    #[test]
    fn test_rewrite_json_shape() {
        let config = RewriteConfig {
            count: true,
            ..RewriteConfig::default()
        };
        let output = rewrite("from Person p", &config).unwrap();
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "query": "select count(p) from Person p",
                "alias": "p",
                "projection": "",
                "constructor_expression": false,
            })
        );
    }

    #[test]
    fn test_rewrite_reports_parse_errors() {
        let err = rewrite("select from", &RewriteConfig::default()).unwrap_err();
        assert!(matches!(err, RewriteError::Query(_)));
    }
}
