use crate::error::{HqlError, HqlResult};

/// Lexical tokens of the HQL dialect.
///
/// Keywords are not classified here: HQL lets most reserved words double as
/// identifiers (`from Order o`), so the parser matches words case-insensitively
/// in context. Literal and parameter tokens keep their source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Words and literals
    Word(String),
    QuotedIdentifier(String), // `name` or "name", quotes included
    String(String),           // 'text', quotes included
    Number(String),
    Parameter(String), // ?, ?1 or :name

    // Operators
    Equal,            // =
    NotEqual(String), // != or <> or ^=
    LessThan,         // <
    LessThanEq,       // <=
    GreaterThan,      // >
    GreaterThanEq,    // >=
    Plus,             // +
    Minus,            // -
    Star,             // *
    Slash,            // /
    Percent,          // %
    Concat,           // ||

    // Delimiters
    Comma,      // ,
    Dot,        // .
    LeftParen,  // (
    RightParen, // )
    Semicolon,  // ;

    // Special
    Eof,
}

impl Token {
    /// Source text of the token as it is written back out.
    pub fn text(&self) -> &str {
        match self {
            Token::Word(s)
            | Token::QuotedIdentifier(s)
            | Token::String(s)
            | Token::Number(s)
            | Token::Parameter(s)
            | Token::NotEqual(s) => s,
            Token::Equal => "=",
            Token::LessThan => "<",
            Token::LessThanEq => "<=",
            Token::GreaterThan => ">",
            Token::GreaterThanEq => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Concat => "||",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::Semicolon => ";",
            Token::Eof => "",
        }
    }

    /// True if this token is the given keyword, compared case-insensitively.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

pub struct HqlLexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl HqlLexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> HqlResult<()> {
        self.advance(); // skip /
        self.advance(); // skip *
        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(HqlError::ParseError("Unterminated block comment".to_string()))
    }

    fn read_number(&mut self) -> HqlResult<Token> {
        let mut num_str = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Decimal part, only when a digit follows the dot (x.1 style paths never start with a digit)
        if self.current_char == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            num_str.push('.');
            self.advance();
            while let Some(ch) = self.current_char {
                if ch.is_ascii_digit() {
                    num_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if matches!(self.current_char, Some('e') | Some('E')) {
            let exponent_follows = match self.peek() {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => self
                    .input
                    .get(self.position + 2)
                    .is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if exponent_follows {
                num_str.push(self.current_char.unwrap_or('e'));
                self.advance();
                while let Some(ch) = self.current_char {
                    if ch.is_ascii_digit() || ch == '+' || ch == '-' {
                        num_str.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        // Java-style type suffixes: 10L, 1.5F, 2D, 100BI, 3.14BD
        match (self.current_char, self.peek()) {
            (Some(b), Some(s))
                if b.eq_ignore_ascii_case(&'b')
                    && (s.eq_ignore_ascii_case(&'d') || s.eq_ignore_ascii_case(&'i')) =>
            {
                num_str.push(b);
                num_str.push(s);
                self.advance();
                self.advance();
            }
            (Some(c), _) if matches!(c, 'l' | 'L' | 'd' | 'D' | 'f' | 'F') => {
                num_str.push(c);
                self.advance();
            }
            _ => {}
        }

        if self
            .current_char
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(HqlError::ParseError(format!(
                "Invalid number literal: {}{}",
                num_str,
                self.current_char.unwrap_or_default()
            )));
        }

        Ok(Token::Number(num_str))
    }

    fn read_string(&mut self) -> HqlResult<Token> {
        let quote = '\'';
        let mut literal = String::from(quote);
        self.advance(); // Skip opening quote

        while let Some(ch) = self.current_char {
            if ch == quote {
                // Doubled quote is an escaped quote
                if self.peek() == Some(quote) {
                    literal.push(quote);
                    literal.push(quote);
                    self.advance();
                    self.advance();
                } else {
                    literal.push(quote);
                    self.advance(); // Skip closing quote
                    return Ok(Token::String(literal));
                }
            } else {
                literal.push(ch);
                self.advance();
            }
        }

        Err(HqlError::ParseError("Unterminated string".to_string()))
    }

    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::Word(ident)
    }

    fn read_quoted_identifier(&mut self) -> HqlResult<Token> {
        let quote = self.current_char.unwrap_or('`');
        let mut ident = String::from(quote);
        self.advance(); // Skip opening quote

        while let Some(ch) = self.current_char {
            ident.push(ch);
            self.advance();
            if ch == quote {
                return Ok(Token::QuotedIdentifier(ident));
            }
        }

        Err(HqlError::ParseError("Unterminated quoted identifier".to_string()))
    }

    fn read_parameter(&mut self) -> HqlResult<Token> {
        let prefix = self.current_char.unwrap_or('?');
        let mut name = String::from(prefix);
        self.advance();

        if prefix == '?' {
            while let Some(ch) = self.current_char {
                if ch.is_ascii_digit() {
                    name.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            return Ok(Token::Parameter(name));
        }

        // :name style
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if name.len() == 1 {
            return Err(HqlError::ParseError(
                "Expected parameter name after ':'".to_string(),
            ));
        }

        Ok(Token::Parameter(name))
    }

    pub fn next_token(&mut self) -> HqlResult<Token> {
        loop {
            self.skip_whitespace();

            match self.current_char {
                None => return Ok(Token::Eof),
                Some('-') if self.peek() == Some('-') => {
                    self.skip_line_comment();
                    continue;
                }
                Some('/') if self.peek() == Some('*') => {
                    self.skip_block_comment()?;
                    continue;
                }
                _ => break,
            }
        }

        let token = match self.current_char {
            None => Token::Eof,

            Some(ch) if ch.is_ascii_digit() => {
                return self.read_number();
            }

            Some('\'') => {
                return self.read_string();
            }

            Some('`') | Some('"') => {
                return self.read_quoted_identifier();
            }

            Some(ch) if ch.is_alphabetic() || ch == '_' || ch == '$' => {
                return Ok(self.read_identifier());
            }

            Some('?') | Some(':') => {
                return self.read_parameter();
            }

            Some('=') => {
                self.advance();
                Token::Equal
            }

            Some('!') if self.peek() == Some('=') => {
                self.advance();
                self.advance();
                Token::NotEqual("!=".to_string())
            }

            Some('^') if self.peek() == Some('=') => {
                self.advance();
                self.advance();
                Token::NotEqual("^=".to_string())
            }

            Some('<') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::LessThanEq
                } else if self.current_char == Some('>') {
                    self.advance();
                    Token::NotEqual("<>".to_string())
                } else {
                    Token::LessThan
                }
            }

            Some('>') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::GreaterThanEq
                } else {
                    Token::GreaterThan
                }
            }

            Some('|') if self.peek() == Some('|') => {
                self.advance();
                self.advance();
                Token::Concat
            }

            Some('+') => {
                self.advance();
                Token::Plus
            }
            Some('-') => {
                self.advance();
                Token::Minus
            }
            Some('*') => {
                self.advance();
                Token::Star
            }
            Some('/') => {
                self.advance();
                Token::Slash
            }
            Some('%') => {
                self.advance();
                Token::Percent
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('.') => {
                self.advance();
                Token::Dot
            }
            Some('(') => {
                self.advance();
                Token::LeftParen
            }
            Some(')') => {
                self.advance();
                Token::RightParen
            }
            Some(';') => {
                self.advance();
                Token::Semicolon
            }

            Some(ch) => {
                return Err(HqlError::ParseError(format!("Unexpected character: {}", ch)));
            }
        };

        Ok(token)
    }

    pub fn tokenize(&mut self) -> HqlResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }
}
