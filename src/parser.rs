use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenType};
use crate::map::NodeMap;
use crate::node::Node;
use log::{debug, trace};
use miette::NamedSource;
use std::sync::Arc;

/// How many lists and maps may enclose one another before parsing stops.
pub const MAX_DEPTH: usize = 128;

/// A recursive descent parser over the token stream of one document.
///
/// ```text
/// value  := object | array | string | integer | float | true | false | null
/// object := '{' ( pair (',' pair)* )? '}'
/// pair   := string ':' value
/// array  := '[' ( value (',' value)* )? ']'
/// ```
#[derive(Debug)]
pub struct Parser {
    source: Arc<NamedSource<String>>,
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    /// Scans `source_text` up front.
    ///
    /// # Errors
    /// Returns `ParseError::Lex` if the text cannot be tokenized.
    pub fn new(source_text: &str) -> Result<Self, ParseError> {
        Self::new_with_name(source_text, "source.json".to_string())
    }

    pub fn new_with_name(source_text: &str, name: String) -> Result<Self, ParseError> {
        let tokens = Lexer::with_name(source_text, name.clone()).lex()?;
        let source = Arc::new(NamedSource::new(name, source_text.to_string()));

        Ok(Self {
            source,
            tokens,
            position: 0,
            depth: 0,
        })
    }

    // === Main Parsing Methods ===

    /// Parses exactly one value followed by the end of input.
    pub fn parse_document(&mut self) -> Result<Node, ParseError> {
        trace!("parsing {} ({} tokens)", self.source.name(), self.tokens.len());
        let root = self.parse_value()?;

        let token = self.current_token()?;
        if token.ttype != TokenType::Eof {
            return Err(ParseError::TrailingData {
                src: (*self.source).clone(),
                span: token.span(),
            });
        }
        trace!("parsed {} as {}", self.source.name(), root.type_as_string());
        Ok(root)
    }

    /// Value ::= Object | Array | String | Integer | Float | True | False | Null
    fn parse_value(&mut self) -> Result<Node, ParseError> {
        let token = self.current_token()?.clone();
        let value = match token.ttype {
            TokenType::LBrace => return self.nested(Self::parse_object),
            TokenType::LBracket => return self.nested(Self::parse_array),
            TokenType::String(s) => Node::String(s),
            TokenType::Integer(i) => Node::Integer(i),
            TokenType::Float(f) => Node::Float(f),
            TokenType::True => Node::Bool(true),
            TokenType::False => Node::Bool(false),
            TokenType::Null => Node::Null,
            _ => return self.err_unexpected("a value"),
        };
        self.advance();
        Ok(value)
    }

    /// Object ::= "{" [ Pair { "," Pair } ] "}"
    fn parse_object(&mut self) -> Result<Node, ParseError> {
        let open = self.current_token()?.clone();
        self.expect(TokenType::LBrace)?;
        let mut map = NodeMap::new();
        if !self.check(TokenType::RBrace) {
            loop {
                let (key, value) = self.parse_pair()?;
                if map.insert(key, value).is_some() {
                    debug!("duplicate key in object at offset {}, keeping the last value", open.pos_start);
                }
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect_closing(&open, TokenType::RBrace, "',' or '}'")?;
        Ok(Node::Map(map))
    }

    /// Array ::= "[" [ Value { "," Value } ] "]"
    fn parse_array(&mut self) -> Result<Node, ParseError> {
        let open = self.current_token()?.clone();
        self.expect(TokenType::LBracket)?;
        let mut values = Vec::new();
        if !self.check(TokenType::RBracket) {
            loop {
                values.push(self.parse_value()?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect_closing(&open, TokenType::RBracket, "',' or ']'")?;
        Ok(Node::List(values))
    }

    /// Pair ::= String ":" Value
    fn parse_pair(&mut self) -> Result<(Node, Node), ParseError> {
        let key = match &self.current_token()?.ttype {
            TokenType::String(s) => s.clone(),
            _ => return self.err_unexpected("a string key"),
        };
        self.advance();

        if !self.match_token(TokenType::Colon) {
            let token = self.current_token()?;
            return Err(ParseError::MissingColon {
                src: (*self.source).clone(),
                span: token.span(),
            });
        }

        let value = self.parse_value()?;
        Ok((Node::String(key), value))
    }

    // Runs `parse` one nesting level deeper, refusing to go past `MAX_DEPTH`.
    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Node, ParseError>,
    ) -> Result<Node, ParseError> {
        if self.depth >= MAX_DEPTH {
            let token = self.current_token()?;
            return Err(ParseError::TooDeep {
                src: (*self.source).clone(),
                span: token.span(),
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // === Tokenizer Helper Methods ===

    fn current_token(&self) -> Result<&Token, ParseError> {
        self.tokens.get(self.position).ok_or_else(|| {
            let pos = self.tokens.last().map_or(0, |t| t.pos_end);
            ParseError::UnexpectedEof {
                src: (*self.source).clone(),
                span: (pos, 0).into(),
                expected: "more input".to_string(),
            }
        })
    }

    // Never moves past the trailing `Eof`.
    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: TokenType) -> Result<(), ParseError> {
        if self.match_token(expected.clone()) {
            Ok(())
        } else {
            self.err_unexpected(&expected.to_string())
        }
    }

    /// Consumes the delimiter closing `open`. Running out of input instead reports the
    /// delimiter as unclosed.
    fn expect_closing(
        &mut self,
        open: &Token,
        closing: TokenType,
        expected: &str,
    ) -> Result<(), ParseError> {
        if self.match_token(closing.clone()) {
            return Ok(());
        }
        let token = self.current_token()?;
        if token.ttype == TokenType::Eof {
            let (delimiter, closing) = if closing == TokenType::RBrace {
                ('{', '}')
            } else {
                ('[', ']')
            };
            return Err(ParseError::Unclosed {
                src: (*self.source).clone(),
                open: open.span(),
                span: token.span(),
                delimiter,
                closing,
            });
        }
        self.err_unexpected(expected)
    }

    fn match_token(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, ttype: TokenType) -> bool {
        if let Ok(token) = self.current_token() {
            std::mem::discriminant(&token.ttype) == std::mem::discriminant(&ttype)
        } else {
            false
        }
    }

    fn err_unexpected<T>(&self, expected: &str) -> Result<T, ParseError> {
        let token = self.current_token()?;
        if token.ttype == TokenType::Eof {
            return Err(ParseError::UnexpectedEof {
                src: (*self.source).clone(),
                span: token.span(),
                expected: expected.to_string(),
            });
        }
        Err(ParseError::UnexpectedToken {
            src: (*self.source).clone(),
            span: token.span(),
            expected: expected.to_string(),
            found: token.ttype.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    fn parse_ok(source: &str) -> Node {
        let result =
            Parser::new_with_name(source, "test.json".to_string()).and_then(|mut p| p.parse_document());
        match result {
            Ok(node) => node,
            Err(err) => {
                let report = Report::from(err);
                panic!("{:?}", report);
            }
        }
    }

    fn parse_err(source: &str) -> ParseError {
        match Parser::new(source).and_then(|mut p| p.parse_document()) {
            Ok(node) => panic!("expected a parse error for {source:?}, got {node:?}"),
            Err(err) => err,
        }
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(parse_ok("{}"), Node::new_map());
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(parse_ok(" [ ] "), Node::new_list());
    }

    #[test]
    fn test_scalars_at_top_level() {
        assert_eq!(parse_ok("123"), Node::Integer(123));
        assert_eq!(parse_ok("123.0"), Node::Float(123.0));
        assert_eq!(parse_ok("1e3"), Node::Float(1000.0));
        assert_eq!(parse_ok("1.5e-2"), Node::Float(0.015));
        assert_eq!(parse_ok("-0"), Node::Integer(0));
        assert_eq!(parse_ok("true"), Node::Bool(true));
        assert_eq!(parse_ok("null"), Node::Null);
        assert_eq!(parse_ok(r#""x""#), Node::from("x"));
    }

    #[test]
    fn test_nested_document() {
        let node = parse_ok(r#"{"a":1,"b":[1,2,3],"c":{"d":true}}"#);
        assert_eq!(node.len(), 3);
        assert_eq!(node.get("a").unwrap().as_int().unwrap(), 1);
        let b = node.get("b").unwrap().as_list().unwrap();
        assert_eq!(b, &[Node::from(1), Node::from(2), Node::from(3)]);
        let c = node.get("c").unwrap();
        assert!(c.has_key("d"));
        assert!(c.get("d").unwrap().as_bool().unwrap());
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let node = parse_ok(r#"{"k": 1, "other": 2, "k": 3}"#);
        let map = node.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(node.get("k").unwrap(), &Node::from(3));
        let keys: Vec<&Node> = map.keys().collect();
        assert_eq!(keys, vec![&Node::from("k"), &Node::from("other")]);
    }

    #[test]
    fn test_preserves_member_order() {
        let node = parse_ok(r#"{"z": 0, "a": 1, "m": 2}"#);
        let keys: Vec<String> = node
            .as_map()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_missing_value() {
        match parse_err(r#"{"a":}"#) {
            ParseError::UnexpectedToken {
                expected, found, ..
            } => {
                assert_eq!(expected, "a value");
                assert_eq!(found, "'}'");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_colon() {
        assert!(matches!(
            parse_err(r#"{"a" 1}"#),
            ParseError::MissingColon { .. }
        ));
    }

    #[test]
    fn test_unclosed_delimiters() {
        match parse_err(r#"{"a": [1, 2"#) {
            ParseError::Unclosed {
                delimiter, open, ..
            } => {
                assert_eq!(delimiter, '[');
                assert_eq!(open.offset(), 6);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(
            parse_err(r#"{"a": 1"#),
            ParseError::Unclosed { delimiter: '{', .. }
        ));
    }

    #[test]
    fn test_wrong_closing_delimiter() {
        match parse_err("[1, 2}") {
            ParseError::UnexpectedToken { expected, .. } => assert_eq!(expected, "',' or ']'"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_trailing_commas_are_rejected() {
        assert!(matches!(
            parse_err("[1,]"),
            ParseError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            parse_err(r#"{"a":1,}"#),
            ParseError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_non_string_key() {
        match parse_err("{1: 2}") {
            ParseError::UnexpectedToken { expected, .. } => assert_eq!(expected, "a string key"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_trailing_data() {
        match parse_err("{} []") {
            ParseError::TrailingData { span, .. } => assert_eq!(span.offset(), 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            parse_err("   "),
            ParseError::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let depth = 10_000;
        let source = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        match parse_err(&source) {
            ParseError::TooDeep { span, limit, .. } => {
                assert_eq!(limit, MAX_DEPTH);
                assert_eq!(span.offset(), MAX_DEPTH);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let deep_map = format!("{}1{}", r#"{"k":"#.repeat(depth), "}".repeat(depth));
        assert!(matches!(parse_err(&deep_map), ParseError::TooDeep { .. }));
    }

    #[test]
    fn test_nesting_at_the_limit() {
        let source = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        let mut node = &parse_ok(&source);
        for _ in 1..MAX_DEPTH {
            node = &node[0];
        }
        assert_eq!(node, &Node::new_list());
    }

    #[test]
    fn test_lex_error_is_wrapped() {
        assert!(matches!(
            parse_err(r#"{"a": "unterminated}"#),
            ParseError::Lex(_)
        ));
        assert_eq!(parse_err("[1, nope]").offset(), 4);
    }
}
