//! Primary expression parsing for HQL: literals, parameters, paths, function
//! calls, `CASE` and parenthesized expressions or subqueries.

use crate::ast::{NodeId, NodeKind, WhenClause};
use crate::error::{HqlError, HqlResult};
use crate::lexer::Token;
use crate::parser::Parser;

/// Reserved words that still name functions when followed by `(`.
const RESERVED_FUNCTION_NAMES: &[&str] = &["left", "right"];

impl Parser {
    /// Parse primary expression (highest precedence)
    pub(crate) fn parse_primary_expression(&mut self) -> HqlResult<NodeId> {
        match self.current_token() {
            Token::String(text) | Token::Number(text) => {
                let text = text.clone();
                self.advance();
                Ok(self.push(NodeKind::Literal(text)))
            }
            Token::Parameter(name) => {
                let name = name.clone();
                self.advance();
                Ok(self.push(NodeKind::Parameter(name)))
            }
            Token::LeftParen => self.parse_parenthesized_expression(),
            Token::Word(word) if word.eq_ignore_ascii_case("case") => self.parse_case_expression(),
            Token::Word(word)
                if ["null", "true", "false"]
                    .iter()
                    .any(|literal| word.eq_ignore_ascii_case(literal)) =>
            {
                let text = word.clone();
                self.advance();
                Ok(self.push(NodeKind::Literal(text)))
            }
            Token::Word(_) | Token::QuotedIdentifier(_) => self.parse_identifier_expression(),
            _ => Err(HqlError::ParseError(format!(
                "Unexpected token in expression: {:?}",
                self.current_token()
            ))),
        }
    }

    /// Parse identifier: path or function call
    fn parse_identifier_expression(&mut self) -> HqlResult<NodeId> {
        let token = self.current_token();
        let callable = *self.peek_token(1) == Token::LeftParen
            && (!Self::is_reserved(token)
                || RESERVED_FUNCTION_NAMES
                    .iter()
                    .any(|name| token.is_keyword(name)));

        if callable {
            return self.parse_function_call();
        }

        if Self::is_reserved(token) {
            return Err(HqlError::ParseError(format!(
                "Unexpected keyword in expression: {:?}",
                token
            )));
        }

        let path = self.expect_dotted_name()?;
        Ok(self.push(NodeKind::Path(path)))
    }

    /// function : name '(' (DISTINCT? expression (',' expression)* | '*')? ')'
    fn parse_function_call(&mut self) -> HqlResult<NodeId> {
        let name = self.expect_identifier()?;
        self.expect(Token::LeftParen)?;

        let mut distinct = None;
        let mut star = false;
        let mut arguments = Vec::new();

        match self.current_token() {
            Token::Star => {
                self.advance();
                star = true;
            }
            Token::RightParen => {}
            _ if name.eq_ignore_ascii_case("cast") => {
                // cast(expression as Type)
                let left = self.parse_expression()?;
                let operator = self.expect_keywords(&["as"])?;
                let target = self.expect_dotted_name()?;
                let right = self.push(NodeKind::Path(target));
                arguments.push(self.push(NodeKind::Binary {
                    left,
                    operator,
                    right,
                }));
            }
            _ => {
                distinct = self.accept_keyword("distinct");
                arguments = self.parse_expression_list()?;
            }
        }
        self.expect(Token::RightParen)?;

        Ok(self.push(NodeKind::Function {
            name,
            distinct,
            star,
            arguments,
        }))
    }

    /// Parse parenthesized expression or subquery
    fn parse_parenthesized_expression(&mut self) -> HqlResult<NodeId> {
        let inner = if self.subquery_follows(1) {
            self.advance(); // consume '('
            self.parse_subquery()?
        } else {
            self.advance(); // consume '('
            self.parse_expression()?
        };
        self.expect(Token::RightParen)?;

        Ok(self.push(NodeKind::Parenthesized(inner)))
    }

    /// CASE operand? (WHEN condition THEN result)+ (ELSE result)? END
    fn parse_case_expression(&mut self) -> HqlResult<NodeId> {
        let case_kw = self.expect_keywords(&["case"])?;

        let operand = if self.at_keyword("when") {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let mut whens = Vec::new();
        while let Some(when_kw) = self.accept_keyword("when") {
            let condition = self.parse_expression()?;
            let then_kw = self.expect_keywords(&["then"])?;
            let result = self.parse_expression()?;
            whens.push(WhenClause {
                when_kw,
                condition,
                then_kw,
                result,
            });
        }

        if whens.is_empty() {
            return Err(HqlError::ParseError(
                "CASE requires at least one WHEN branch".to_string(),
            ));
        }

        let else_branch = match self.accept_keyword("else") {
            Some(else_kw) => Some((else_kw, self.parse_expression()?)),
            None => None,
        };
        let end_kw = self.expect_keywords(&["end"])?;

        Ok(self.push(NodeKind::Case {
            case_kw,
            operand,
            whens,
            else_branch,
            end_kw,
        }))
    }
}
