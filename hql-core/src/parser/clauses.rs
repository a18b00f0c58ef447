//! Clause parsing for HQL: SELECT, FROM (roots and joins), WHERE, GROUP BY,
//! HAVING, ORDER BY, LIMIT, OFFSET and FETCH.

use crate::ast::{FromTarget, NodeId, NodeKind};
use crate::error::{HqlError, HqlResult};
use crate::lexer::Token;
use crate::parser::Parser;

impl Parser {
    /// selectClause : SELECT DISTINCT? selectionList
    pub(super) fn parse_select_clause(&mut self) -> HqlResult<NodeId> {
        let keyword = self.expect_keywords(&["select"])?;
        let distinct = self.accept_keyword("distinct");

        let mut items = Vec::new();
        loop {
            items.push(self.parse_selection()?);
            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        let selection_list = self.push(NodeKind::SelectionList { items });

        Ok(self.push(NodeKind::SelectClause {
            keyword,
            distinct,
            selection_list,
        }))
    }

    fn parse_selection(&mut self) -> HqlResult<NodeId> {
        let expression = if self.at_keyword("new") {
            self.parse_instantiation()?
        } else if self.at_keyword("object") && *self.peek_token(1) == Token::LeftParen {
            let keyword = self.current_token().text().to_string();
            self.advance();
            self.expect(Token::LeftParen)?;
            let identifier = self.expect_identifier()?;
            self.expect(Token::RightParen)?;
            self.push(NodeKind::ObjectSelection {
                keyword,
                identifier,
            })
        } else {
            self.parse_expression()?
        };

        let variable = self.parse_optional_variable()?;

        Ok(self.push(NodeKind::Selection {
            expression,
            variable,
        }))
    }

    /// instantiation : NEW (LIST | MAP | dottedName) '(' instantiationArgument (',' ...)* ')'
    fn parse_instantiation(&mut self) -> HqlResult<NodeId> {
        let new_kw = self.expect_keywords(&["new"])?;
        let target = self.expect_dotted_name()?;
        self.expect(Token::LeftParen)?;

        let mut arguments = Vec::new();
        loop {
            let expression = if self.at_keyword("new") {
                self.parse_instantiation()?
            } else {
                self.parse_expression()?
            };
            let variable = self.parse_optional_variable()?;
            arguments.push(self.push(NodeKind::InstantiationArgument {
                expression,
                variable,
            }));

            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RightParen)?;

        Ok(self.push(NodeKind::Instantiation {
            new_kw,
            target,
            arguments,
        }))
    }

    /// variable : AS identifier | identifier
    pub(super) fn parse_optional_variable(&mut self) -> HqlResult<Option<NodeId>> {
        if let Some(as_kw) = self.accept_keyword("as") {
            let name = self.expect_identifier()?;
            return Ok(Some(self.push(NodeKind::Variable {
                as_kw: Some(as_kw),
                name,
            })));
        }

        match self.current_token().clone() {
            Token::Word(name) | Token::QuotedIdentifier(name)
                if !Self::is_reserved(self.current_token()) =>
            {
                self.advance();
                Ok(Some(self.push(NodeKind::Variable { as_kw: None, name })))
            }
            _ => Ok(None),
        }
    }

    /// alias : AS? identifier
    fn parse_optional_alias(&mut self) -> HqlResult<Option<NodeId>> {
        if let Some(as_kw) = self.accept_keyword("as") {
            let name = self.expect_identifier()?;
            return Ok(Some(self.push(NodeKind::Alias {
                as_kw: Some(as_kw),
                name,
            })));
        }

        match self.current_token().clone() {
            Token::Word(name) | Token::QuotedIdentifier(name)
                if !Self::is_reserved(self.current_token()) =>
            {
                self.advance();
                Ok(Some(self.push(NodeKind::Alias { as_kw: None, name })))
            }
            _ => Ok(None),
        }
    }

    /// fromClause : FROM entityWithJoins (',' entityWithJoins)*
    pub(super) fn parse_from_clause(&mut self) -> HqlResult<NodeId> {
        let keyword = self.expect_keywords(&["from"])?;

        let mut roots = Vec::new();
        loop {
            let root = self.parse_from_root()?;

            let mut joins = Vec::new();
            loop {
                if self.join_follows() {
                    joins.push(self.parse_join()?);
                } else if self.at_keyword("cross") {
                    joins.push(self.parse_cross_join()?);
                } else if *self.current_token() == Token::Comma
                    && self.peek_keyword(1, "in")
                    && *self.peek_token(2) == Token::LeftParen
                {
                    joins.push(self.parse_collection_join()?);
                } else {
                    break;
                }
            }
            roots.push(self.push(NodeKind::EntityWithJoins { root, joins }));

            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        Ok(self.push(NodeKind::FromClause { keyword, roots }))
    }

    /// fromRoot : dottedName variable? | LATERAL? '(' subquery ')' variable?
    fn parse_from_root(&mut self) -> HqlResult<NodeId> {
        let target = if self.at_keyword("lateral") || *self.current_token() == Token::LeftParen {
            self.parse_subquery_target()?
        } else {
            FromTarget::Entity(self.expect_dotted_name()?)
        };
        let variable = self.parse_optional_variable()?;

        Ok(self.push(NodeKind::FromRoot { target, variable }))
    }

    fn parse_subquery_target(&mut self) -> HqlResult<FromTarget> {
        let lateral = self.accept_keyword("lateral");
        self.expect(Token::LeftParen)?;
        let subquery = self.parse_subquery()?;
        self.expect(Token::RightParen)?;
        Ok(FromTarget::Subquery { lateral, subquery })
    }

    fn join_follows(&self) -> bool {
        let mut offset = 0;
        if ["left", "right", "full"]
            .iter()
            .any(|kw| self.peek_keyword(offset, kw))
        {
            offset += 1;
            if self.peek_keyword(offset, "outer") {
                offset += 1;
            }
        } else if self.peek_keyword(offset, "inner") {
            offset += 1;
        }
        self.peek_keyword(offset, "join")
    }

    /// join : joinType JOIN FETCH? joinTarget joinRestriction?
    fn parse_join(&mut self) -> HqlResult<NodeId> {
        let mut words = Vec::new();
        for kw in ["inner", "left", "right", "full", "outer"] {
            if let Some(word) = self.accept_keyword(kw) {
                words.push(word);
            }
        }
        words.push(self.expect_keywords(&["join"])?);
        let keyword = words.join(" ");

        let fetch = self.accept_keyword("fetch");

        let target = if self.at_keyword("lateral") || *self.current_token() == Token::LeftParen {
            self.parse_subquery_target()?
        } else {
            let path = self.expect_dotted_name()?;
            FromTarget::Path(self.push(NodeKind::Path(path)))
        };
        let variable = self.parse_optional_variable()?;

        let restriction = match ["on", "with"]
            .iter()
            .find_map(|kw| self.accept_keyword(kw))
        {
            Some(kw) => Some((kw, self.parse_expression()?)),
            None => None,
        };

        Ok(self.push(NodeKind::Join {
            keyword,
            fetch,
            target,
            variable,
            restriction,
        }))
    }

    /// crossJoin : CROSS JOIN dottedName alias?
    fn parse_cross_join(&mut self) -> HqlResult<NodeId> {
        let keyword = self.expect_keywords(&["cross", "join"])?;
        let entity = self.expect_dotted_name()?;
        let alias = self.parse_optional_alias()?;

        Ok(self.push(NodeKind::CrossJoin {
            keyword,
            entity,
            alias,
        }))
    }

    /// collectionJoin : ',' IN '(' path ')' alias?
    fn parse_collection_join(&mut self) -> HqlResult<NodeId> {
        self.expect(Token::Comma)?;
        let in_kw = self.expect_keywords(&["in"])?;
        self.expect(Token::LeftParen)?;
        let path = self.expect_dotted_name()?;
        let path = self.push(NodeKind::Path(path));
        self.expect(Token::RightParen)?;
        let alias = self.parse_optional_alias()?;

        Ok(self.push(NodeKind::CollectionJoin { in_kw, path, alias }))
    }

    pub(super) fn parse_optional_where_clause(&mut self) -> HqlResult<Option<NodeId>> {
        match self.accept_keyword("where") {
            Some(keyword) => {
                let predicate = self.parse_expression()?;
                Ok(Some(self.push(NodeKind::WhereClause { keyword, predicate })))
            }
            None => Ok(None),
        }
    }

    pub(super) fn parse_optional_group_by_clause(&mut self) -> HqlResult<Option<NodeId>> {
        if !(self.at_keyword("group") && self.peek_keyword(1, "by")) {
            return Ok(None);
        }
        let keyword = self.expect_keywords(&["group", "by"])?;
        let items = self.parse_expression_list()?;
        Ok(Some(self.push(NodeKind::GroupByClause { keyword, items })))
    }

    pub(super) fn parse_optional_having_clause(&mut self) -> HqlResult<Option<NodeId>> {
        match self.accept_keyword("having") {
            Some(keyword) => {
                let predicate = self.parse_expression()?;
                Ok(Some(self.push(NodeKind::HavingClause { keyword, predicate })))
            }
            None => Ok(None),
        }
    }

    /// queryOrder : orderByClause? limitClause? offsetClause? fetchClause?
    pub(super) fn parse_query_order(&mut self) -> HqlResult<Option<NodeId>> {
        let order_by_clause = if self.at_keyword("order") && self.peek_keyword(1, "by") {
            Some(self.parse_order_by_clause()?)
        } else {
            None
        };

        let limit_clause = match self.accept_keyword("limit") {
            Some(keyword) => {
                let value = self.parse_additive_expression()?;
                Some(self.push(NodeKind::LimitClause { keyword, value }))
            }
            None => None,
        };

        let offset_clause = match self.accept_keyword("offset") {
            Some(keyword) => {
                let value = self.parse_additive_expression()?;
                let rows = ["rows", "row"]
                    .iter()
                    .find_map(|kw| self.accept_keyword(kw));
                Some(self.push(NodeKind::OffsetClause {
                    keyword,
                    value,
                    rows,
                }))
            }
            None => None,
        };

        let fetch_clause = if self.at_keyword("fetch") {
            Some(self.parse_fetch_clause()?)
        } else {
            None
        };

        if order_by_clause.is_none()
            && limit_clause.is_none()
            && offset_clause.is_none()
            && fetch_clause.is_none()
        {
            return Ok(None);
        }

        Ok(Some(self.push(NodeKind::QueryOrder {
            order_by_clause,
            limit_clause,
            offset_clause,
            fetch_clause,
        })))
    }

    /// orderByClause : ORDER BY sortedItem (',' sortedItem)*
    fn parse_order_by_clause(&mut self) -> HqlResult<NodeId> {
        let keyword = self.expect_keywords(&["order", "by"])?;

        let mut items = Vec::new();
        loop {
            let expression = self.parse_expression()?;
            let direction = ["asc", "desc", "ascending", "descending"]
                .iter()
                .find_map(|kw| self.accept_keyword(kw));
            let nulls = match self.accept_keyword("nulls") {
                Some(nulls_kw) => {
                    let precedence = ["first", "last"]
                        .iter()
                        .find_map(|kw| self.accept_keyword(kw))
                        .ok_or_else(|| {
                            HqlError::ParseError(
                                "Expected FIRST or LAST after NULLS".to_string(),
                            )
                        })?;
                    Some(format!("{} {}", nulls_kw, precedence))
                }
                None => None,
            };

            items.push(self.push(NodeKind::SortedItem {
                expression,
                direction,
                nulls,
            }));

            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        Ok(self.push(NodeKind::OrderByClause { keyword, items }))
    }

    /// fetchClause : FETCH (FIRST | NEXT) expression '%'? (ROW | ROWS) (ONLY | WITH TIES)
    fn parse_fetch_clause(&mut self) -> HqlResult<NodeId> {
        let fetch = self.expect_keywords(&["fetch"])?;
        let position = ["first", "next"]
            .iter()
            .find_map(|kw| self.accept_keyword(kw))
            .ok_or_else(|| HqlError::ParseError("Expected FIRST or NEXT after FETCH".to_string()))?;
        let keyword = format!("{} {}", fetch, position);

        let value = self.parse_primary_expression()?;
        let percent = if *self.current_token() == Token::Percent {
            self.advance();
            true
        } else {
            false
        };

        let rows = ["rows", "row"]
            .iter()
            .find_map(|kw| self.accept_keyword(kw))
            .ok_or_else(|| HqlError::ParseError("Expected ROW or ROWS in FETCH".to_string()))?;
        let ending = if let Some(only) = self.accept_keyword("only") {
            only
        } else {
            self.expect_keywords(&["with", "ties"])?
        };

        Ok(self.push(NodeKind::FetchClause {
            keyword,
            value,
            percent,
            trailing: format!("{} {}", rows, ending),
        }))
    }

    pub(super) fn parse_expression_list(&mut self) -> HqlResult<Vec<NodeId>> {
        let mut items = Vec::new();
        loop {
            items.push(self.parse_expression()?);
            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        Ok(items)
    }
}
