//! HQL Core - parsing, rendering and rewriting of HQL/JPQL queries.
//!
//! This crate parses HQL query strings into a [`QueryTree`] and renders them
//! back to text through a [`QueryVisitor`]. The [`HqlQueryTransformer`] uses the
//! same traversal to inject a sort order or to turn the outer query into a
//! count query, leaving subqueries untouched. It has no I/O and no storage
//! dependencies.
//!
//! # Main Components
//!
//! - **Lexer / Parser**: turn query text into a [`QueryTree`]
//! - **Renderer**: reproduces a tree as query text
//! - **Transformer**: sort injection, count queries, alias and projection detection
//! - **Enhancer**: string-in, string-out facade over the above
//!
//! # Example
//!
//! ```rust
//! use hql_core::{QueryEnhancer, Sort};
//!
//! let enhancer = QueryEnhancer::parse("select e from Employee e").unwrap();
//!
//! assert_eq!(
//!     enhancer.apply_sorting(&Sort::by(["lastName"])),
//!     "select e from Employee e order by e.lastName asc"
//! );
//! assert_eq!(
//!     enhancer.create_count_query(None),
//!     "select count(e) from Employee e"
//! );
//! assert_eq!(enhancer.detect_alias().as_deref(), Some("e"));
//! ```

pub mod ast;
pub mod enhancer;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod renderer;
pub mod sort;
pub mod token;
pub mod transformer;

// Re-export main types for convenience
pub use ast::{NodeId, NodeKind, QueryTree, TreeBuilder};
pub use enhancer::QueryEnhancer;
pub use error::{HqlError, HqlResult};
pub use lexer::{HqlLexer, Token};
pub use parser::{parse, Parser};
pub use renderer::{render_tree, HqlQueryRenderer, QueryVisitor};
pub use sort::{Direction, Order, Sort};
pub use token::{Deferred, QueryToken};
pub use transformer::{HqlQueryTransformer, ResolvedState, TransformedQuery};
