//! Expression parsing for HQL.
//!
//! Precedence, lowest first:
//! - `OR`
//! - `AND`
//! - `NOT`
//! - predicates (comparison, `IS NULL`, `BETWEEN`, `IN`, `LIKE`, `EXISTS`)
//! - additive (`+`, `-`, `||`)
//! - multiplicative (`*`, `/`, `%`)
//! - unary sign
//! - primary

mod operators;
mod primary;

use crate::ast::{NodeId, NodeKind};
use crate::error::HqlResult;
use crate::lexer::Token;
use crate::parser::Parser;

impl Parser {
    /// Parse an expression (entry point)
    pub(crate) fn parse_expression(&mut self) -> HqlResult<NodeId> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> HqlResult<NodeId> {
        let mut left = self.parse_and_expression()?;

        while let Some(operator) = self.accept_keyword("or") {
            let right = self.parse_and_expression()?;
            left = self.push(NodeKind::Binary {
                left,
                operator,
                right,
            });
        }

        Ok(left)
    }

    fn parse_and_expression(&mut self) -> HqlResult<NodeId> {
        let mut left = self.parse_not_expression()?;

        while let Some(operator) = self.accept_keyword("and") {
            let right = self.parse_not_expression()?;
            left = self.push(NodeKind::Binary {
                left,
                operator,
                right,
            });
        }

        Ok(left)
    }

    fn parse_not_expression(&mut self) -> HqlResult<NodeId> {
        if let Some(operator) = self.accept_keyword("not") {
            let operand = self.parse_not_expression()?;
            return Ok(self.push(NodeKind::Unary { operator, operand }));
        }
        self.parse_predicate()
    }

    pub(crate) fn parse_additive_expression(&mut self) -> HqlResult<NodeId> {
        let mut left = self.parse_multiplicative_expression()?;

        while matches!(
            self.current_token(),
            Token::Plus | Token::Minus | Token::Concat
        ) {
            let operator = self.current_token().text().to_string();
            self.advance();
            let right = self.parse_multiplicative_expression()?;
            left = self.push(NodeKind::Binary {
                left,
                operator,
                right,
            });
        }

        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> HqlResult<NodeId> {
        let mut left = self.parse_unary_expression()?;

        while matches!(
            self.current_token(),
            Token::Star | Token::Slash | Token::Percent
        ) {
            let operator = self.current_token().text().to_string();
            self.advance();
            let right = self.parse_unary_expression()?;
            left = self.push(NodeKind::Binary {
                left,
                operator,
                right,
            });
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> HqlResult<NodeId> {
        if matches!(self.current_token(), Token::Minus | Token::Plus) {
            let operator = self.current_token().text().to_string();
            self.advance();
            let operand = self.parse_unary_expression()?;
            return Ok(self.push(NodeKind::Unary { operator, operand }));
        }
        self.parse_primary_expression()
    }
}
