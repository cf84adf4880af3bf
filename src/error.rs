use crate::node::TypeTag;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used by the crate-level entry points.
pub type Result<T, E = JsonError> = std::result::Result<T, E>;

#[derive(Error, Debug, Diagnostic)]
pub enum JsonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Key(#[from] KeyError),

    #[error("Failed to read {}", .path.display())]
    #[diagnostic(
        code(fs::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<LexError> for JsonError {
    fn from(err: LexError) -> Self {
        JsonError::Parse(ParseError::Lex(err))
    }
}

/// Errors raised by the scanner. Any of these aborts the whole scan.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexError {
    #[error("Unterminated string literal")]
    #[diagnostic(
        code(lexer::unterminated_string),
        help("Strings must be closed with a matching '\"' before the end of the input.")
    )]
    UnterminatedString {
        #[source_code]
        src: NamedSource<String>,
        #[label("string starts here and never ends")]
        span: SourceSpan,
    },

    #[error("Truncated unicode escape")]
    #[diagnostic(
        code(lexer::truncated_unicode_escape),
        help("A \\u escape must be followed by exactly four hexadecimal digits.")
    )]
    TruncatedUnicodeEscape {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected four hex digits after this")]
        span: SourceSpan,
    },

    #[error("Invalid hex digit '{found}' in unicode escape")]
    #[diagnostic(code(lexer::invalid_hex_digit))]
    InvalidHexDigit {
        #[source_code]
        src: NamedSource<String>,
        #[label("not a hex digit")]
        span: SourceSpan,
        found: char,
    },

    #[error("Unknown escape sequence '\\{found}'")]
    #[diagnostic(
        code(lexer::unknown_escape),
        help("Valid escapes are \\\" \\\\ \\/ \\b \\f \\n \\r \\t and \\uXXXX.")
    )]
    UnknownEscape {
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown escape")]
        span: SourceSpan,
        found: char,
    },

    #[error("Invalid surrogate \\u{code:04X}")]
    #[diagnostic(
        code(lexer::invalid_surrogate),
        help("A high surrogate (D800-DBFF) must be immediately followed by a \\u escape for a low surrogate (DC00-DFFF).")
    )]
    InvalidSurrogate {
        #[source_code]
        src: NamedSource<String>,
        #[label("this escape does not form a valid surrogate pair")]
        span: SourceSpan,
        code: u16,
    },

    #[error("Invalid number '{text}'")]
    #[diagnostic(
        code(lexer::invalid_number),
        help("Numbers are an optional '-', digits, an optional fraction and an optional exponent, and must fit in 64 bits.")
    )]
    InvalidNumber {
        #[source_code]
        src: NamedSource<String>,
        #[label("cannot be read as a number")]
        span: SourceSpan,
        text: String,
    },

    #[error("Unrecognized token '{text}'")]
    #[diagnostic(
        code(lexer::unrecognized_token),
        help("Bare words other than true, false and null must be quoted.")
    )]
    UnrecognizedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("unrecognized")]
        span: SourceSpan,
        text: String,
    },
}

impl LexError {
    /// Byte offset in the source where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnterminatedString { span, .. }
            | LexError::TruncatedUnicodeEscape { span, .. }
            | LexError::InvalidHexDigit { span, .. }
            | LexError::UnknownEscape { span, .. }
            | LexError::InvalidSurrogate { span, .. }
            | LexError::InvalidNumber { span, .. }
            | LexError::UnrecognizedToken { span, .. } => span.offset(),
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error("Unexpected token")]
    #[diagnostic(
        code(parser::unexpected_token),
        help("The parser found a token it did not expect in this position.")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected}, but found {found}")]
        span: SourceSpan,
        expected: String,
        found: String,
    },

    #[error("Missing ':' after object key")]
    #[diagnostic(
        code(parser::missing_colon),
        help("Every key in an object must be followed by ':' and a value.")
    )]
    MissingColon {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected ':' here")]
        span: SourceSpan,
    },

    #[error("Unclosed '{delimiter}'")]
    #[diagnostic(
        code(parser::unclosed_delimiter),
        help("Add the missing '{closing}'.")
    )]
    Unclosed {
        #[source_code]
        src: NamedSource<String>,
        #[label("opened here")]
        open: SourceSpan,
        #[label("expected '{closing}' here")]
        span: SourceSpan,
        delimiter: char,
        closing: char,
    },

    #[error("Unexpected end of file")]
    #[diagnostic(
        code(parser::unexpected_eof),
        help("The input ended unexpectedly. The parser expected {expected}.")
    )]
    UnexpectedEof {
        #[source_code]
        src: NamedSource<String>,
        #[label("Input ended here")]
        span: SourceSpan,
        expected: String,
    },

    #[error("Trailing data after the document")]
    #[diagnostic(
        code(parser::trailing_data),
        help("A document holds exactly one top-level value.")
    )]
    TrailingData {
        #[source_code]
        src: NamedSource<String>,
        #[label("Unexpected data after the top-level value")]
        span: SourceSpan,
    },

    #[error("Nesting is deeper than {limit} levels")]
    #[diagnostic(
        code(parser::too_deep),
        help("Flatten the document; lists and maps may nest at most {limit} levels.")
    )]
    TooDeep {
        #[source_code]
        src: NamedSource<String>,
        #[label("This delimiter opens one level too many")]
        span: SourceSpan,
        limit: usize,
    },
}

impl ParseError {
    /// Byte offset in the source where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lex(err) => err.offset(),
            ParseError::UnexpectedToken { span, .. }
            | ParseError::MissingColon { span, .. }
            | ParseError::Unclosed { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::TrailingData { span, .. }
            | ParseError::TooDeep { span, .. } => span.offset(),
        }
    }
}

/// A coercion or borrow was attempted between tags the conversion matrix does not allow.
#[derive(Error, Debug, Diagnostic, Clone, Copy, PartialEq, Eq)]
#[error("Cannot convert {from} to {to}")]
#[diagnostic(code(node::type_error))]
pub struct TypeError {
    pub from: TypeTag,
    pub to: TypeTag,
}

#[derive(Error, Debug, Diagnostic, Clone, Copy, PartialEq, Eq)]
#[error("Index {index} out of range for list of length {len}")]
#[diagnostic(code(node::index_error))]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("Key {key} not found in map")]
#[diagnostic(code(node::key_error))]
pub struct KeyError {
    /// Compact textual rendering of the missing key.
    pub key: String,
}
