//! Parser module for the HQL query language.
//!
//! Converts tokenized input into a [`QueryTree`]. Nodes are pushed bottom-up
//! through a [`TreeBuilder`], so every child exists before the node that
//! references it and parent links are assigned as the tree grows.

mod clauses;
mod expressions;
#[cfg(test)]
mod tests;

use crate::ast::{NodeId, NodeKind, QueryTree, TreeBuilder};
use crate::error::{HqlError, HqlResult};
use crate::lexer::{HqlLexer, Token};

/// Words that end a clause and therefore never start an implicit variable.
const RESERVED_WORDS: &[&str] = &[
    "all", "and", "any", "as", "asc", "between", "by", "case", "cross", "desc", "distinct",
    "else", "end", "escape", "except", "exists", "fetch", "from", "full", "group", "having",
    "ilike", "in", "inner", "intersect", "is", "join", "lateral", "left", "like", "limit",
    "new", "not", "nulls", "offset", "on", "or", "order", "outer", "right", "select", "some",
    "then", "union", "when", "where", "with",
];

/// Parse an HQL query into a validated tree.
pub fn parse(input: &str) -> HqlResult<QueryTree> {
    let mut parser = Parser::new(input)?;
    parser.parse()
}

/// Parser for HQL queries
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) builder: TreeBuilder,
}

impl Parser {
    /// Create a new parser from an input string
    pub fn new(input: &str) -> HqlResult<Self> {
        let mut lexer = HqlLexer::new(input);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
            builder: TreeBuilder::new(),
        })
    }

    /// Get the current token
    pub(crate) fn current_token(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    /// Peek at a token at a given offset from the current position
    pub(crate) fn peek_token(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.position + offset)
            .unwrap_or(&Token::Eof)
    }

    /// Advance to the next token
    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Expect a specific token and advance, or return an error
    pub(crate) fn expect(&mut self, expected: Token) -> HqlResult<()> {
        if self.current_token() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(HqlError::ParseError(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.current_token().is_keyword(keyword)
    }

    pub(crate) fn peek_keyword(&self, offset: usize, keyword: &str) -> bool {
        self.peek_token(offset).is_keyword(keyword)
    }

    /// Consume `keyword` if it is next, returning its spelling.
    pub(crate) fn accept_keyword(&mut self, keyword: &str) -> Option<String> {
        if self.at_keyword(keyword) {
            let text = self.current_token().text().to_string();
            self.advance();
            Some(text)
        } else {
            None
        }
    }

    /// Consume a sequence of keywords, returning them as written joined by single spaces.
    pub(crate) fn expect_keywords(&mut self, keywords: &[&str]) -> HqlResult<String> {
        let mut words = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            match self.accept_keyword(keyword) {
                Some(word) => words.push(word),
                None => {
                    return Err(HqlError::ParseError(format!(
                        "Expected {}, got {:?}",
                        keyword.to_uppercase(),
                        self.current_token()
                    )))
                }
            }
        }
        Ok(words.join(" "))
    }

    pub(crate) fn is_reserved(token: &Token) -> bool {
        match token {
            Token::Word(word) => RESERVED_WORDS
                .iter()
                .any(|reserved| word.eq_ignore_ascii_case(reserved)),
            _ => false,
        }
    }

    /// Identifier, including reserved words (entity names such as `Order` are legal).
    pub(crate) fn expect_identifier(&mut self) -> HqlResult<String> {
        match self.current_token().clone() {
            Token::Word(name) | Token::QuotedIdentifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(HqlError::ParseError(format!(
                "Expected identifier, got {:?}",
                other
            ))),
        }
    }

    /// Dotted name such as `com.example.Person` or `e.address.city`.
    pub(crate) fn expect_dotted_name(&mut self) -> HqlResult<String> {
        let mut name = self.expect_identifier()?;
        while *self.current_token() == Token::Dot {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }
        Ok(name)
    }

    pub(crate) fn push(&mut self, kind: NodeKind) -> NodeId {
        self.builder.push(kind)
    }

    pub fn parse(&mut self) -> HqlResult<QueryTree> {
        let query_expression = self.parse_query_expression()?;

        if *self.current_token() == Token::Semicolon {
            self.advance();
        }

        if *self.current_token() != Token::Eof {
            return Err(HqlError::ParseError(format!(
                "Unexpected token after end of query: {:?}",
                self.current_token()
            )));
        }

        let root = self.push(NodeKind::SelectStatement { query_expression });
        let builder = std::mem::take(&mut self.builder);
        builder.finish(root)
    }

    /// queryExpression : orderedQuery (setOperator orderedQuery)*
    pub(crate) fn parse_query_expression(&mut self) -> HqlResult<NodeId> {
        let first = self.parse_ordered_query()?;

        let mut rest = Vec::new();
        while let Some(operator) = self.parse_set_operator() {
            let query = self.parse_ordered_query()?;
            rest.push((operator, query));
        }

        Ok(self.push(NodeKind::QueryExpression { first, rest }))
    }

    fn parse_set_operator(&mut self) -> Option<String> {
        let mut operator = ["union", "intersect", "except"]
            .iter()
            .find_map(|keyword| self.accept_keyword(keyword))?;

        if let Some(all) = self.accept_keyword("all") {
            operator.push(' ');
            operator.push_str(&all);
        }

        Some(operator)
    }

    /// orderedQuery : (query | '(' queryExpression ')') queryOrder?
    fn parse_ordered_query(&mut self) -> HqlResult<NodeId> {
        let (body, parenthesized) = if *self.current_token() == Token::LeftParen {
            self.advance();
            let inner = self.parse_query_expression()?;
            self.expect(Token::RightParen)?;
            (inner, true)
        } else {
            (self.parse_query()?, false)
        };

        let query_order = self.parse_query_order()?;

        Ok(self.push(NodeKind::OrderedQuery {
            body,
            parenthesized,
            query_order,
        }))
    }

    /// query : selectClause fromClause? ... | fromClause ... selectClause?
    fn parse_query(&mut self) -> HqlResult<NodeId> {
        if self.at_keyword("select") {
            let select_clause = self.parse_select_clause()?;
            let from_clause = if self.at_keyword("from") {
                Some(self.parse_from_clause()?)
            } else {
                None
            };
            let where_clause = self.parse_optional_where_clause()?;
            let group_by_clause = self.parse_optional_group_by_clause()?;
            let having_clause = self.parse_optional_having_clause()?;

            Ok(self.push(NodeKind::SelectQuery {
                select_clause,
                from_clause,
                where_clause,
                group_by_clause,
                having_clause,
            }))
        } else if self.at_keyword("from") {
            let from_clause = self.parse_from_clause()?;
            let where_clause = self.parse_optional_where_clause()?;
            let group_by_clause = self.parse_optional_group_by_clause()?;
            let having_clause = self.parse_optional_having_clause()?;
            let select_clause = if self.at_keyword("select") {
                Some(self.parse_select_clause()?)
            } else {
                None
            };

            Ok(self.push(NodeKind::FromQuery {
                from_clause,
                where_clause,
                group_by_clause,
                having_clause,
                select_clause,
            }))
        } else {
            Err(HqlError::ParseError(format!(
                "Expected SELECT or FROM, got {:?}",
                self.current_token()
            )))
        }
    }

    /// subquery : queryExpression
    pub(crate) fn parse_subquery(&mut self) -> HqlResult<NodeId> {
        let query_expression = self.parse_query_expression()?;
        Ok(self.push(NodeKind::Subquery { query_expression }))
    }

    /// True when the tokens after an opening parenthesis start a subquery.
    pub(crate) fn subquery_follows(&self, offset: usize) -> bool {
        let mut index = offset;
        // Nested parentheses: ((select ...) union (select ...))
        while *self.peek_token(index) == Token::LeftParen {
            index += 1;
        }
        self.peek_keyword(index, "select") || self.peek_keyword(index, "from")
    }
}
