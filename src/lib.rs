pub mod api;
pub mod error;
pub mod fs;
pub mod lexer;
pub mod map;
pub mod node;
pub mod parser;
pub mod utils;
pub mod writer;
mod serialization;

pub use api::{parse, parse_from_file, parse_from_source, parse_named};
pub use error::{IndexError, JsonError, KeyError, LexError, ParseError, Result, TypeError};
pub use map::NodeMap;
pub use node::{Node, TypeTag};
pub use writer::{to_string, to_string_pretty, write};
