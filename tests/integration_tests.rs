// Integration tests for json-node using test fixtures
use json_node::{parse, parse_from_file, JsonError, LexError, Node, ParseError};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

fn get_test_file_path(subdir: &str, filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join(subdir)
        .join(filename)
}

fn read_test_file(subdir: &str, filename: &str) -> String {
    let path = get_test_file_path(subdir, filename);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read test file: {:?}", path))
}

fn parse_error(subdir: &str, filename: &str) -> ParseError {
    match parse_from_file(get_test_file_path(subdir, filename)) {
        Err(JsonError::Parse(err)) => err,
        other => panic!("Expected a parse error for {filename}, got {other:?}"),
    }
}

// Tests for valid files that should parse successfully
mod ok_tests {
    use super::*;

    #[test]
    fn test_primitives() {
        let content = read_test_file("ok", "primitives.json");
        let result = parse(&content);
        assert!(result.is_ok(), "Should parse successfully: {:?}", result.err());

        let node = result.unwrap();
        assert!(node["null_value"].is_null());
        assert!(node["yes"].as_bool().unwrap());
        assert!(!node["no"].as_bool().unwrap());
        assert_eq!(node["integer"], Node::Integer(42));
        assert_eq!(node["negative"].as_int().unwrap(), -17);
        assert_eq!(node["zero"], Node::Integer(0));
        assert_eq!(node["float"], Node::Float(3.25));
        assert_eq!(node["exponent"], Node::Float(1000.0));
        assert!(node["small"].is_float());
        assert_eq!(node["text"].as_str().unwrap(), "hello");
    }

    #[test]
    fn test_collections() {
        let node = parse(&read_test_file("ok", "collections.json")).unwrap();
        assert!(node["empty_list"].as_list().unwrap().is_empty());
        assert!(node["empty_map"].as_map().unwrap().is_empty());
        assert_eq!(node["mixed"].len(), 7);
        assert_eq!(node["mixed"][6]["five"], Node::Integer(5));
        assert_eq!(
            node["nested"]["level1"]["level2"]["level3"][0].as_str().unwrap(),
            "deep"
        );
    }

    #[test]
    fn test_world_settings() {
        let node = parse_from_file(get_test_file_path("ok", "world.json")).unwrap();
        assert_eq!(node["chunk_size"].as_int().unwrap(), 32);
        assert_eq!(node["camera"]["fov"].as_float().unwrap(), 70.0);

        let gravity: Vec<f64> = node["gravity"]
            .as_list()
            .unwrap()
            .iter()
            .map(|n| n.as_float().unwrap())
            .collect();
        assert_eq!(gravity, vec![0.0, -9.81, 0.0]);

        let blocks = node["blocks"].as_list().unwrap();
        let solid: Vec<&str> = blocks
            .iter()
            .filter(|b| b["solid"].as_bool().unwrap())
            .map(|b| b["name"].as_str().unwrap())
            .collect();
        assert_eq!(solid, vec!["stone", "glass"]);
        assert_eq!(node["shaders"]["vertex"].as_str().unwrap(), "shaders/cube.vert");
    }

    #[test]
    fn test_strings() {
        let node = parse(&read_test_file("ok", "strings.json")).unwrap();
        let strings: Vec<&str> = node
            .as_list()
            .unwrap()
            .iter()
            .map(|n| n.as_str().unwrap())
            .collect();
        assert_eq!(
            strings,
            vec![
                "plain",
                "quote \" inside",
                "back\\slash",
                "line\nbreak\ttab\rreturn",
                "\u{8}\u{c}",
                "Aé€",
                "\u{1F600}",
                "",
                "true",
                "null",
                "123",
            ]
        );
    }

    #[test]
    fn test_parse_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"written": [1, 2.5, "x"]}}"#).unwrap();

        let node = parse_from_file(file.path()).unwrap();
        assert_eq!(node["written"].len(), 3);
        assert_eq!(node["written"][1], Node::Float(2.5));
    }
}

// Tests for invalid files that should fail with a specific error
mod bad_tests {
    use super::*;

    #[test]
    fn test_mismatched_delimiter() {
        assert!(matches!(
            parse_error("bad", "mismatched.json"),
            ParseError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_missing_colon() {
        assert!(matches!(
            parse_error("bad", "missing_colon.json"),
            ParseError::MissingColon { .. }
        ));
    }

    #[test]
    fn test_trailing_document() {
        assert!(matches!(
            parse_error("bad", "trailing.json"),
            ParseError::TrailingData { .. }
        ));
    }

    #[test]
    fn test_unclosed() {
        assert!(matches!(
            parse_error("bad", "unclosed.json"),
            ParseError::Unclosed { delimiter: '[', .. }
        ));
    }

    #[test]
    fn test_bad_escape() {
        assert!(matches!(
            parse_error("bad", "bad_escape.json"),
            ParseError::Lex(LexError::UnknownEscape { found: 'q', .. })
        ));
    }

    #[test]
    fn test_bare_word() {
        assert!(matches!(
            parse_error("bad", "bare_word.json"),
            ParseError::Lex(LexError::UnrecognizedToken { .. })
        ));
    }
}
