use crate::node::Node;
use log::warn;
use std::fmt::{self, Write};
use std::io;

const INDENT: &str = "  ";

/// Writes `node` as text to `out`. Pretty output puts every element and pair on its own
/// line, indented two spaces per nesting level; compact output has no whitespace.
///
/// # Errors
/// Returns any error raised by `out`.
pub fn write<W: io::Write + ?Sized>(out: &mut W, node: &Node, pretty: bool) -> io::Result<()> {
    write_indented(out, node, pretty, 0)
}

/// Like [`write`], but treats `node` as sitting `indent` levels deep, for embedding the
/// output inside an already indented document.
pub fn write_indented<W: io::Write + ?Sized>(
    out: &mut W,
    node: &Node,
    pretty: bool,
    indent: usize,
) -> io::Result<()> {
    let mut text = String::new();
    format_node(&mut text, node, pretty, indent).map_err(io::Error::other)?;
    out.write_all(text.as_bytes())
}

pub fn to_string(node: &Node) -> String {
    node.to_string()
}

pub fn to_string_pretty(node: &Node) -> String {
    format!("{node:#}")
}

pub(crate) fn format_node<W: Write>(
    out: &mut W,
    node: &Node,
    pretty: bool,
    level: usize,
) -> fmt::Result {
    match node {
        Node::Null => out.write_str("null"),
        Node::Bool(b) => out.write_str(if *b { "true" } else { "false" }),
        Node::Integer(i) => write!(out, "{i}"),
        Node::Float(f) if f.is_finite() => out.write_str(&format_float(*f)),
        Node::Float(f) => {
            warn!("float {f} has no textual form, writing null");
            out.write_str("null")
        }
        Node::String(s) => write_escaped(out, s),
        Node::List(items) => {
            if items.is_empty() {
                return out.write_str("[]");
            }
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                newline(out, pretty, level + 1)?;
                format_node(out, item, pretty, level + 1)?;
            }
            newline(out, pretty, level)?;
            out.write_char(']')
        }
        Node::Map(map) => {
            if map.is_empty() {
                return out.write_str("{}");
            }
            out.write_char('{')?;
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                newline(out, pretty, level + 1)?;
                write_key(out, key)?;
                out.write_str(if pretty { ": " } else { ":" })?;
                format_node(out, value, pretty, level + 1)?;
            }
            newline(out, pretty, level)?;
            out.write_char('}')
        }
    }
}

/// Shortest text that reads back as the same float. Always carries a `.` or an
/// exponent so it is never mistaken for an integer.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_finite() {
        format!("{f:?}")
    } else {
        f.to_string()
    }
}

fn newline<W: Write>(out: &mut W, pretty: bool, level: usize) -> fmt::Result {
    if pretty {
        out.write_char('\n')?;
        for _ in 0..level {
            out.write_str(INDENT)?;
        }
    }
    Ok(())
}

// Keys are always written as strings; non-string keys use their compact text.
fn write_key<W: Write>(out: &mut W, key: &Node) -> fmt::Result {
    match key {
        Node::String(s) => write_escaped(out, s),
        other => write_escaped(out, &other.to_string()),
    }
}

fn write_escaped<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
