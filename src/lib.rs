pub mod config;
pub mod error;
pub mod rewrite;

pub use config::RewriteConfig;
pub use error::{RewriteError, RewriteResult};
pub use rewrite::{rewrite, RewriteOutput};

pub use hql_core::{
    parse, Direction, HqlError, HqlQueryRenderer, HqlQueryTransformer, Order, QueryEnhancer,
    QueryTree, Sort, TransformedQuery,
};
