//! Rendered query tokens.
//!
//! Rendering a query tree produces a flat `Vec<QueryToken>`. A token is either
//! literal text or a [`Deferred`] value that is resolved from the transformer's
//! final state when the stream is turned into a string. Each token records
//! whether a space follows it.

use std::borrow::Cow;

use crate::transformer::ResolvedState;

/// Token text computed from the finished traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// The primary alias; empty when none was found.
    PrimaryAlias,
    /// A sort property, qualified with the primary alias when it should be.
    SortProperty(String),
}

impl Deferred {
    pub fn resolve(&self, state: &ResolvedState) -> String {
        match self {
            Deferred::PrimaryAlias => state.alias().unwrap_or_default().to_string(),
            Deferred::SortProperty(property) => {
                match state.alias() {
                    Some(alias) if state.should_alias(property) => {
                        format!("{}.{}", alias, property)
                    }
                    _ => property.clone(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    Literal(Cow<'static, str>),
    Deferred(Deferred),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    value: TokenValue,
    space: bool,
}

pub const TOKEN_COMMA: QueryToken = QueryToken::constant(",", true);
pub const TOKEN_OPEN_PAREN: QueryToken = QueryToken::constant("(", false);
pub const TOKEN_CLOSE_PAREN: QueryToken = QueryToken::constant(")", true);
pub const TOKEN_ORDER_BY: QueryToken = QueryToken::constant("order by", true);
pub const TOKEN_LOWER_FUNC: QueryToken = QueryToken::constant("lower(", false);
pub const TOKEN_SELECT_COUNT: QueryToken = QueryToken::constant("select count(", false);
pub const TOKEN_COUNT_FUNC: QueryToken = QueryToken::constant("count(", false);
pub const TOKEN_ASC: QueryToken = QueryToken::constant("asc", false);
pub const TOKEN_DESC: QueryToken = QueryToken::constant("desc", false);
pub const TOKEN_STAR: QueryToken = QueryToken::constant("*", true);
pub const TOKEN_PERCENT: QueryToken = QueryToken::constant("%", true);

impl QueryToken {
    const fn constant(text: &'static str, space: bool) -> Self {
        Self {
            value: TokenValue::Literal(Cow::Borrowed(text)),
            space,
        }
    }

    /// Literal text followed by a space.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_space(text, true)
    }

    pub fn with_space(text: impl Into<String>, space: bool) -> Self {
        Self {
            value: TokenValue::Literal(Cow::Owned(text.into())),
            space,
        }
    }

    pub fn deferred(value: Deferred, space: bool) -> Self {
        Self {
            value: TokenValue::Deferred(value),
            space,
        }
    }

    pub fn value(&self) -> &TokenValue {
        &self.value
    }

    pub fn space(&self) -> bool {
        self.space
    }

    pub fn set_space(&mut self, space: bool) {
        self.space = space;
    }

    /// Text of a literal token; `None` for deferred tokens.
    pub fn literal(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Literal(text) => Some(text.as_ref()),
            TokenValue::Deferred(_) => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.value, TokenValue::Deferred(_))
    }

    pub fn text(&self, state: &ResolvedState) -> Cow<'_, str> {
        match &self.value {
            TokenValue::Literal(text) => Cow::Borrowed(text.as_ref()),
            TokenValue::Deferred(deferred) => Cow::Owned(deferred.resolve(state)),
        }
    }
}

/// Make the last token emit a trailing space.
pub fn space(tokens: &mut [QueryToken]) {
    if let Some(last) = tokens.last_mut() {
        last.set_space(true);
    }
}

/// Strip the trailing space from the last token.
pub fn nospace(tokens: &mut [QueryToken]) {
    if let Some(last) = tokens.last_mut() {
        last.set_space(false);
    }
}

/// Drop the last token.
pub fn clip(tokens: &mut Vec<QueryToken>) {
    tokens.pop();
}

/// Append `items` separated by commas.
pub fn join_with_commas(tokens: &mut Vec<QueryToken>, items: Vec<Vec<QueryToken>>) {
    let count = items.len();
    for (index, mut item) in items.into_iter().enumerate() {
        if index + 1 < count {
            nospace(&mut item);
            item.push(TOKEN_COMMA);
        }
        tokens.extend(item);
    }
}

/// Render tokens into a query string, resolving deferred values against `state`.
pub fn render(tokens: &[QueryToken], state: &ResolvedState) -> String {
    let mut result = String::new();
    for token in tokens {
        result.push_str(&token.text(state));
        if token.space() {
            result.push(' ');
        }
    }
    result.trim().to_string()
}
