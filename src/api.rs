use crate::error::{JsonError, ParseError, Result};
use crate::fs::{DiskFiles, FileSource};
use crate::node::Node;
use crate::parser::Parser;
use crate::utils::get_line_and_column;
use log::debug;
use std::path::Path;

/// Parses a document into a [`Node`] tree.
///
/// This is the primary entry point for reading text. Diagnostics name the source
/// `source.json`; use [`parse_named`] to choose the name.
///
/// # Errors
///
/// Returns `JsonError::Parse` at the first lexical or grammar error. No partial tree is
/// returned.
pub fn parse(source: &str) -> Result<Node> {
    parse_named(source, "source.json")
}

/// Parses a document, using `file_name` to identify it in diagnostics.
///
/// # Errors
///
/// Returns `JsonError::Parse` at the first lexical or grammar error.
pub fn parse_named(source: &str, file_name: &str) -> Result<Node> {
    parse_document(source, file_name).map_err(|err| {
        let (line, column) = get_line_and_column(source, err.offset());
        debug!("failed to parse {file_name} at line {line}, column {column}: {err}");
        JsonError::from(err)
    })
}

fn parse_document(source: &str, file_name: &str) -> Result<Node, ParseError> {
    let mut parser = Parser::new_with_name(source, file_name.to_string())?;
    parser.parse_document()
}

/// Reads `path` from the local filesystem and parses it.
///
/// # Errors
///
/// Returns `JsonError::Read` if the file cannot be read, or `JsonError::Parse` if its
/// contents are malformed.
pub fn parse_from_file(path: impl AsRef<Path>) -> Result<Node> {
    parse_from_source(&DiskFiles, path)
}

/// Reads `path` through `files` and parses it.
///
/// # Errors
///
/// Returns `JsonError::Read` if `files` fails, or `JsonError::Parse` if the text is
/// malformed.
pub fn parse_from_source<F: FileSource + ?Sized>(
    files: &F,
    path: impl AsRef<Path>,
) -> Result<Node> {
    let path = path.as_ref();
    let text = files.read(path).map_err(|source| JsonError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_named(&text, &path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::path::PathBuf;

    struct MemoryFiles(HashMap<PathBuf, String>);

    impl FileSource for MemoryFiles {
        fn read(&self, path: &Path) -> io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    #[test]
    fn test_parse_from_source() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("world/settings.json"),
            r#"{"chunk_size": 16, "seed": 42}"#.to_string(),
        );
        let files = MemoryFiles(files);

        let node = parse_from_source(&files, "world/settings.json").unwrap();
        assert_eq!(node.get("chunk_size").unwrap().as_int().unwrap(), 16);

        match parse_from_source(&files, "missing.json") {
            Err(JsonError::Read { path, source }) => {
                assert_eq!(path, PathBuf::from("missing.json"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected a read error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_named_reports_the_name() {
        let err = parse_named("{", "broken.json").unwrap_err();
        let report = format!("{:?}", miette::Report::new(err));
        assert!(report.contains("broken.json"));
    }
}
