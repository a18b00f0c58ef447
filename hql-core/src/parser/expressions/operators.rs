//! Predicate parsing for HQL.
//!
//! Handles:
//! - Comparison: `=`, `!=`, `<>`, `^=`, `<`, `<=`, `>`, `>=`, optionally
//!   against `ALL`/`ANY`/`SOME (subquery)`
//! - Null tests: `IS [NOT] NULL`, `IS [NOT] EMPTY`
//! - Ranges: `[NOT] BETWEEN low AND high`
//! - Membership: `[NOT] IN (list | subquery)`, `IN :param`
//! - Pattern matching: `[NOT] LIKE`/`ILIKE pattern [ESCAPE e]`
//! - `EXISTS (subquery)`

use crate::ast::{InTarget, NodeId, NodeKind};
use crate::error::{HqlError, HqlResult};
use crate::lexer::Token;
use crate::parser::Parser;

impl Parser {
    pub(super) fn parse_predicate(&mut self) -> HqlResult<NodeId> {
        if self.at_keyword("exists") && *self.peek_token(1) == Token::LeftParen {
            return self.parse_exists();
        }

        let left = self.parse_additive_expression()?;

        if let Some(operator) = self.parse_comparison_operator() {
            let right = self.parse_comparison_operand()?;
            return Ok(self.push(NodeKind::Binary {
                left,
                operator,
                right,
            }));
        }

        if self.at_keyword("is") {
            return self.parse_is_null(left);
        }

        let negated_keyword_follows = ["between", "in", "like", "ilike"]
            .iter()
            .any(|kw| self.peek_keyword(1, kw));
        let not = if self.at_keyword("not") && negated_keyword_follows {
            self.accept_keyword("not")
        } else {
            None
        };

        if let Some(between_kw) = self.accept_keyword("between") {
            let low = self.parse_additive_expression()?;
            let and_kw = self.expect_keywords(&["and"])?;
            let high = self.parse_additive_expression()?;
            return Ok(self.push(NodeKind::Between {
                expression: left,
                not,
                between_kw,
                low,
                and_kw,
                high,
            }));
        }

        if let Some(in_kw) = self.accept_keyword("in") {
            let target = self.parse_in_target()?;
            return Ok(self.push(NodeKind::InList {
                expression: left,
                not,
                in_kw,
                target,
            }));
        }

        if let Some(like_kw) = ["like", "ilike"]
            .iter()
            .find_map(|kw| self.accept_keyword(kw))
        {
            let pattern = self.parse_additive_expression()?;
            let escape = match self.accept_keyword("escape") {
                Some(escape_kw) => Some((escape_kw, self.parse_primary_expression()?)),
                None => None,
            };
            return Ok(self.push(NodeKind::Like {
                expression: left,
                not,
                like_kw,
                pattern,
                escape,
            }));
        }

        Ok(left)
    }

    /// Parse a comparison operator if present, returning it as written.
    fn parse_comparison_operator(&mut self) -> Option<String> {
        let operator = match self.current_token() {
            Token::Equal
            | Token::NotEqual(_)
            | Token::LessThan
            | Token::LessThanEq
            | Token::GreaterThan
            | Token::GreaterThanEq => self.current_token().text().to_string(),
            _ => return None,
        };
        self.advance();
        Some(operator)
    }

    /// Right-hand side of a comparison: `ALL|ANY|SOME (subquery)` or an expression.
    fn parse_comparison_operand(&mut self) -> HqlResult<NodeId> {
        let quantified = ["all", "any", "some"]
            .iter()
            .any(|kw| self.at_keyword(kw))
            && *self.peek_token(1) == Token::LeftParen
            && self.subquery_follows(2);

        if !quantified {
            return self.parse_additive_expression();
        }

        let quantifier = self.current_token().text().to_string();
        self.advance();
        self.expect(Token::LeftParen)?;
        let subquery = self.parse_subquery()?;
        self.expect(Token::RightParen)?;

        Ok(self.push(NodeKind::Quantified {
            quantifier,
            subquery,
        }))
    }

    fn parse_is_null(&mut self, expression: NodeId) -> HqlResult<NodeId> {
        let mut words = vec![self.expect_keywords(&["is"])?];
        if let Some(not) = self.accept_keyword("not") {
            words.push(not);
        }
        let tail = ["null", "empty"]
            .iter()
            .find_map(|kw| self.accept_keyword(kw))
            .ok_or_else(|| {
                HqlError::ParseError(format!(
                    "Expected NULL or EMPTY after IS, got {:?}",
                    self.current_token()
                ))
            })?;
        words.push(tail);

        Ok(self.push(NodeKind::IsNull {
            expression,
            keyword: words.join(" "),
        }))
    }

    fn parse_in_target(&mut self) -> HqlResult<InTarget> {
        match self.current_token() {
            Token::LeftParen if self.subquery_follows(1) => {
                self.advance();
                let subquery = self.parse_subquery()?;
                self.expect(Token::RightParen)?;
                Ok(InTarget::Subquery(subquery))
            }
            Token::LeftParen => {
                self.advance();
                let items = self.parse_expression_list()?;
                self.expect(Token::RightParen)?;
                Ok(InTarget::List(items))
            }
            Token::Parameter(_) => Ok(InTarget::Parameter(self.parse_primary_expression()?)),
            other => Err(HqlError::ParseError(format!(
                "Expected list, subquery or parameter after IN, got {:?}",
                other
            ))),
        }
    }

    fn parse_exists(&mut self) -> HqlResult<NodeId> {
        let keyword = self.expect_keywords(&["exists"])?;
        self.expect(Token::LeftParen)?;
        let subquery = self.parse_subquery()?;
        self.expect(Token::RightParen)?;

        Ok(self.push(NodeKind::Exists { keyword, subquery }))
    }
}
