use crate::error::LexError;
use miette::{NamedSource, SourceSpan};
use std::fmt;

/// Represents the different kinds of tokens that the lexer can produce.
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    // == Special Tokens ==
    /// Represents the end of the input.
    Eof,

    // == Literals ==
    /// A string literal, enclosed in double quotes.
    /// The associated `String` holds the content with escapes decoded.
    String(String),
    /// A number without a fraction or exponent.
    Integer(i64),
    /// A number with a fraction, an exponent, or both.
    Float(f64),

    // == Keywords ==
    True,
    False,
    Null,

    // == Punctuation ==
    /// Left Brace: `{`
    LBrace,
    /// Right Brace: `}`
    RBrace,
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,
    /// Comma: `,`
    Comma,
    /// Colon: `:`
    Colon,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Eof => write!(f, "end of input"),
            TokenType::String(s) => write!(f, "string {s:?}"),
            TokenType::Integer(i) => write!(f, "integer {i}"),
            TokenType::Float(x) => write!(f, "float {x:?}"),
            TokenType::True => write!(f, "'true'"),
            TokenType::False => write!(f, "'false'"),
            TokenType::Null => write!(f, "'null'"),
            TokenType::LBrace => write!(f, "'{{'"),
            TokenType::RBrace => write!(f, "'}}'"),
            TokenType::LBracket => write!(f, "'['"),
            TokenType::RBracket => write!(f, "']'"),
            TokenType::Comma => write!(f, "','"),
            TokenType::Colon => write!(f, "':'"),
        }
    }
}

/// A token with its type and position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ttype: TokenType,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Token {
    pub fn new(ttype: TokenType, pos_start: usize, pos_end: usize) -> Token {
        Token {
            ttype,
            pos_start,
            pos_end,
        }
    }

    pub fn span(&self) -> SourceSpan {
        (self.pos_start, self.pos_end - self.pos_start).into()
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0B' | '\r' | '\n' | '\x0C')
}

fn is_delimiter(c: char) -> bool {
    is_whitespace(c) || matches!(c, '{' | '}' | '[' | ']' | ',' | ':' | '"')
}

/// Single forward pass over the input. The only state is the cursor.
pub struct Lexer<'a> {
    input: &'a str,
    name: String,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_name(input, "source.json".to_string())
    }

    /// `name` identifies the source in diagnostics.
    pub fn with_name(input: &'a str, name: String) -> Self {
        Self {
            input,
            name,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Scans the whole input. The last token is always `Eof`.
    ///
    /// # Errors
    /// Returns the first `LexError` encountered; nothing is returned for the tokens
    /// before it.
    pub fn lex(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.ttype == TokenType::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start_pos = self.position;

        let ttype = if let Some(char) = self.advance() {
            match char {
                '{' => TokenType::LBrace,
                '}' => TokenType::RBrace,
                '[' => TokenType::LBracket,
                ']' => TokenType::RBracket,
                ',' => TokenType::Comma,
                ':' => TokenType::Colon,
                '"' => self.read_string(start_pos)?,
                c if c == '-' || c.is_ascii_digit() => self.read_number(c, start_pos)?,
                c => self.read_bare_word(c, start_pos)?,
            }
        } else {
            TokenType::Eof
        };

        Ok(Token::new(ttype, start_pos, self.position))
    }

    fn advance(&mut self) -> Option<char> {
        let char = self.chars.next();
        if let Some(c) = char {
            self.position += c.len_utf8();
        }
        char
    }

    fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(&expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if !is_whitespace(c) {
                break;
            }
            self.advance();
        }
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.input.to_string())
    }

    fn span_from(&self, start: usize) -> SourceSpan {
        (start, self.position - start).into()
    }

    fn read_string(&mut self, start: usize) -> Result<TokenType, LexError> {
        let mut value = String::new();
        loop {
            let Some(c) = self.advance() else {
                return Err(LexError::UnterminatedString {
                    src: self.source(),
                    span: self.span_from(start),
                });
            };
            match c {
                '"' => return Ok(TokenType::String(value)),
                '\\' => {
                    let escape_start = self.position - 1;
                    let Some(escaped_char) = self.advance() else {
                        return Err(LexError::UnterminatedString {
                            src: self.source(),
                            span: self.span_from(start),
                        });
                    };
                    match escaped_char {
                        '"' => value.push('"'),
                        '\\' => value.push('\\'),
                        '/' => value.push('/'),
                        'b' => value.push('\u{8}'),
                        'f' => value.push('\u{c}'),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        't' => value.push('\t'),
                        'u' => value.push(self.read_unicode_escape(escape_start)?),
                        other => {
                            return Err(LexError::UnknownEscape {
                                src: self.source(),
                                span: self.span_from(escape_start),
                                found: other,
                            })
                        }
                    }
                }
                c => value.push(c),
            }
        }
    }

    /// Reads the four hex digits of a `\u` escape whose backslash is at `escape_start`.
    fn read_hex_quad(&mut self, escape_start: usize) -> Result<u16, LexError> {
        let mut code: u16 = 0;
        for _ in 0..4 {
            let digit_start = self.position;
            match self.peek().copied() {
                None | Some('"') => {
                    return Err(LexError::TruncatedUnicodeEscape {
                        src: self.source(),
                        span: self.span_from(escape_start),
                    })
                }
                Some(c) => {
                    self.advance();
                    let Some(digit) = c.to_digit(16) else {
                        return Err(LexError::InvalidHexDigit {
                            src: self.source(),
                            span: self.span_from(digit_start),
                            found: c,
                        });
                    };
                    code = (code << 4) | digit as u16;
                }
            }
        }
        Ok(code)
    }

    // A high surrogate must be followed directly by an escaped low surrogate; the pair
    // decodes to one supplementary-plane character.
    fn read_unicode_escape(&mut self, escape_start: usize) -> Result<char, LexError> {
        let code = self.read_hex_quad(escape_start)?;
        match code {
            0xD800..=0xDBFF => {
                let low_start = self.position;
                if !(self.advance_if('\\') && self.advance_if('u')) {
                    return Err(self.invalid_surrogate(escape_start, code));
                }
                let low = self.read_hex_quad(low_start)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.invalid_surrogate(low_start, low));
                }
                let scalar = 0x10000 + ((u32::from(code) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                char::from_u32(scalar).ok_or_else(|| self.invalid_surrogate(escape_start, code))
            }
            0xDC00..=0xDFFF => Err(self.invalid_surrogate(escape_start, code)),
            _ => char::from_u32(u32::from(code))
                .ok_or_else(|| self.invalid_surrogate(escape_start, code)),
        }
    }

    fn invalid_surrogate(&self, start: usize, code: u16) -> LexError {
        LexError::InvalidSurrogate {
            src: self.source(),
            span: self.span_from(start),
            code,
        }
    }

    /// Appends a run of ASCII digits, returning whether there was at least one.
    fn read_digits(&mut self, text: &mut String) -> bool {
        let mut any = false;
        while let Some(&c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
            any = true;
        }
        any
    }

    fn read_number(&mut self, first_char: char, start: usize) -> Result<TokenType, LexError> {
        let mut number_str = String::new();
        number_str.push(first_char);
        let mut is_float = false;
        let mut well_formed = self.read_digits(&mut number_str) || first_char != '-';

        if well_formed && self.advance_if('.') {
            is_float = true;
            number_str.push('.');
            well_formed = self.read_digits(&mut number_str);
        }

        if well_formed && matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            if let Some(e) = self.advance() {
                number_str.push(e);
            }
            // Check for optional sign after 'e' or 'E'
            if let Some(&sign) = self.peek() {
                if sign == '+' || sign == '-' {
                    number_str.push(sign);
                    self.advance();
                }
            }
            well_formed = self.read_digits(&mut number_str);
        }

        let ttype = if !well_formed {
            None
        } else if is_float {
            number_str
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(TokenType::Float)
        } else {
            number_str.parse::<i64>().ok().map(TokenType::Integer)
        };

        ttype.ok_or_else(|| LexError::InvalidNumber {
            src: self.source(),
            span: self.span_from(start),
            text: number_str,
        })
    }

    fn read_bare_word(&mut self, first_char: char, start: usize) -> Result<TokenType, LexError> {
        let mut word = String::new();
        word.push(first_char);

        while let Some(&c) = self.peek() {
            if is_delimiter(c) {
                break;
            }
            word.push(c);
            self.advance();
        }

        match word.as_str() {
            "true" => Ok(TokenType::True),
            "false" => Ok(TokenType::False),
            "null" => Ok(TokenType::Null),
            _ => Err(LexError::UnrecognizedToken {
                src: self.source(),
                span: self.span_from(start),
                text: word,
            }),
        }
    }
}
