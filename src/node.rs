use crate::error::{IndexError, JsonError, KeyError, TypeError};
use crate::map::NodeMap;
use crate::writer;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

/// The tag of a [`Node`].
///
/// The declaration order is the primary key of the total order over nodes: a node of
/// an earlier tag sorts before every node of a later tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeTag {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Map,
    List,
}

impl TypeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Null => "null",
            TypeTag::Bool => "bool",
            TypeTag::Integer => "int",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::Map => "map",
            TypeTag::List => "list",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically-typed value: the tree every parsed document is materialized into.
///
/// A node owns its children, so cloning a node deep-copies the subtree. The tag of a
/// node never changes; lists and maps are mutated through [`Node::as_mutable_list`] and
/// [`Node::as_mutable_map`].
///
/// Nodes are totally ordered (see the [`Ord`] impl) and compare equal exactly when
/// they are structurally equal.
#[derive(Debug, Clone, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Node>),
    Map(NodeMap),
}

impl Node {
    pub fn null() -> Self {
        Node::Null
    }

    pub fn from_bool(b: bool) -> Self {
        Node::Bool(b)
    }

    pub fn new_list() -> Self {
        Node::List(Vec::new())
    }

    pub fn new_map() -> Self {
        Node::Map(NodeMap::new())
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Node::Null => TypeTag::Null,
            Node::Bool(_) => TypeTag::Bool,
            Node::Integer(_) => TypeTag::Integer,
            Node::Float(_) => TypeTag::Float,
            Node::String(_) => TypeTag::String,
            Node::List(_) => TypeTag::List,
            Node::Map(_) => TypeTag::Map,
        }
    }

    pub fn type_as_string(&self) -> &'static str {
        self.type_tag().as_str()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Node::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Node::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Node::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Node::String(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Node::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }

    /// Number of elements of a list or map, or the byte length of a string. Zero for
    /// every other tag.
    pub fn len(&self) -> usize {
        match self {
            Node::String(s) => s.len(),
            Node::List(items) => items.len(),
            Node::Map(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn type_error(&self, to: TypeTag) -> TypeError {
        TypeError {
            from: self.type_tag(),
            to,
        }
    }

    // === Coercions ===

    /// Integer as itself, Float truncated toward zero (saturating at the `i64` bounds),
    /// Bool as 0 or 1.
    ///
    /// # Errors
    /// Returns a `TypeError` for any other tag, and for a NaN float.
    pub fn as_int(&self) -> Result<i64, TypeError> {
        match self {
            Node::Integer(i) => Ok(*i),
            Node::Float(f) if !f.is_nan() => Ok(f.trunc() as i64),
            Node::Bool(b) => Ok(i64::from(*b)),
            _ => Err(self.type_error(TypeTag::Integer)),
        }
    }

    /// # Errors
    /// Returns a `TypeError` unless the node is an Integer, Float or Bool.
    pub fn as_float(&self) -> Result<f64, TypeError> {
        match self {
            Node::Integer(i) => Ok(*i as f64),
            Node::Float(f) => Ok(*f),
            Node::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            _ => Err(self.type_error(TypeTag::Float)),
        }
    }

    /// Numbers are true when nonzero; strings, lists and maps when nonempty.
    ///
    /// # Errors
    /// Returns a `TypeError` for Null.
    pub fn as_bool(&self) -> Result<bool, TypeError> {
        match self {
            Node::Bool(b) => Ok(*b),
            Node::Integer(i) => Ok(*i != 0),
            Node::Float(f) => Ok(*f != 0.0),
            Node::String(s) => Ok(!s.is_empty()),
            Node::List(items) => Ok(!items.is_empty()),
            Node::Map(map) => Ok(!map.is_empty()),
            Node::Null => Err(self.type_error(TypeTag::Bool)),
        }
    }

    /// A String as itself, Integer and Float as their decimal text.
    ///
    /// # Errors
    /// Returns a `TypeError` for any other tag.
    pub fn as_string(&self) -> Result<String, TypeError> {
        match self {
            Node::String(s) => Ok(s.clone()),
            Node::Integer(i) => Ok(i.to_string()),
            Node::Float(f) => Ok(writer::format_float(*f)),
            _ => Err(self.type_error(TypeTag::String)),
        }
    }

    /// Borrows the payload of a String node.
    pub fn as_str(&self) -> Result<&str, TypeError> {
        match self {
            Node::String(s) => Ok(s),
            _ => Err(self.type_error(TypeTag::String)),
        }
    }

    pub fn as_int_or(&self, fallback: i64) -> i64 {
        self.as_int().unwrap_or(fallback)
    }

    pub fn as_float_or(&self, fallback: f64) -> f64 {
        self.as_float().unwrap_or(fallback)
    }

    pub fn as_bool_or(&self, fallback: bool) -> bool {
        self.as_bool().unwrap_or(fallback)
    }

    pub fn as_string_or(&self, fallback: impl Into<String>) -> String {
        self.as_string().unwrap_or_else(|_| fallback.into())
    }

    // === Borrows ===

    pub fn as_list(&self) -> Result<&[Node], TypeError> {
        match self {
            Node::List(items) => Ok(items),
            _ => Err(self.type_error(TypeTag::List)),
        }
    }

    pub fn as_mutable_list(&mut self) -> Result<&mut Vec<Node>, TypeError> {
        match self {
            Node::List(items) => Ok(items),
            _ => Err(self.type_error(TypeTag::List)),
        }
    }

    pub fn as_map(&self) -> Result<&NodeMap, TypeError> {
        match self {
            Node::Map(map) => Ok(map),
            _ => Err(self.type_error(TypeTag::Map)),
        }
    }

    pub fn as_mutable_map(&mut self) -> Result<&mut NodeMap, TypeError> {
        match self {
            Node::Map(map) => Ok(map),
            _ => Err(self.type_error(TypeTag::Map)),
        }
    }

    /// Appends to a List node.
    pub fn push(&mut self, value: impl Into<Node>) -> Result<(), TypeError> {
        self.as_mutable_list()?.push(value.into());
        Ok(())
    }

    /// Inserts into a Map node, returning the value previously stored under `key`.
    pub fn insert(
        &mut self,
        key: impl Into<Node>,
        value: impl Into<Node>,
    ) -> Result<Option<Node>, TypeError> {
        Ok(self.as_mutable_map()?.insert(key, value))
    }

    // === Lookup ===

    /// Element `index` of a List node.
    ///
    /// # Errors
    /// `TypeError` if the node is not a list, `IndexError` if `index` is out of range.
    pub fn at(&self, index: usize) -> Result<&Node, JsonError> {
        let items = self.as_list()?;
        items.get(index).ok_or_else(|| {
            IndexError {
                index,
                len: items.len(),
            }
            .into()
        })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut Node, JsonError> {
        let items = self.as_mutable_list()?;
        let len = items.len();
        items
            .get_mut(index)
            .ok_or_else(|| IndexError { index, len }.into())
    }

    /// The value stored under `key` in a Map node. Keys may be any node; string
    /// slices convert implicitly.
    ///
    /// # Errors
    /// `TypeError` if the node is not a map, `KeyError` if the key is absent.
    pub fn get(&self, key: impl Into<Node>) -> Result<&Node, JsonError> {
        let key = key.into();
        self.as_map()?.get(&key).ok_or_else(|| {
            KeyError {
                key: key.to_string(),
            }
            .into()
        })
    }

    pub fn get_mut(&mut self, key: impl Into<Node>) -> Result<&mut Node, JsonError> {
        let key = key.into();
        self.as_mutable_map()?.get_mut(&key).ok_or_else(|| {
            KeyError {
                key: key.to_string(),
            }
            .into()
        })
    }

    /// True if this is a Map node containing `key`. Never fails.
    pub fn has_key(&self, key: impl Into<Node>) -> bool {
        match self {
            Node::Map(map) => map.contains_key(&key.into()),
            _ => false,
        }
    }
}

/// Compares floats numerically, with `-0.0 == 0.0` and every NaN equal to every other
/// NaN and greater than all other floats.
pub(crate) fn compare_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Nodes of different tags order by [`TypeTag`]. Within a tag: bools by value, numbers
/// numerically, strings byte-wise, lists lexicographically element by element (a
/// prefix sorts first), maps by entry count and then by their entries in key order.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Node::Null, Node::Null) => Ordering::Equal,
            (Node::Bool(a), Node::Bool(b)) => a.cmp(b),
            (Node::Integer(a), Node::Integer(b)) => a.cmp(b),
            (Node::Float(a), Node::Float(b)) => compare_floats(*a, *b),
            (Node::String(a), Node::String(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Node::List(a), Node::List(b)) => a.iter().cmp(b.iter()),
            (Node::Map(a), Node::Map(b)) => a.cmp(b),
            _ => self.type_tag().cmp(&other.type_tag()),
        }
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

/// Compact text; the alternate flag (`{:#}`) pretty-prints.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = f.alternate();
        writer::format_node(f, self, pretty, 0)
    }
}

/// # Panics
/// Panics if the node is not a list or `index` is out of range. Use [`Node::at`] to
/// handle those cases.
impl Index<usize> for Node {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        match self.at(index) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }
}

/// # Panics
/// Panics if the node is not a map or the key is absent. Use [`Node::get`] to handle
/// those cases.
impl Index<&str> for Node {
    type Output = Node;

    fn index(&self, key: &str) -> &Node {
        match self.get(key) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i32> for Node {
    fn from(i: i32) -> Self {
        Node::Integer(i64::from(i))
    }
}

impl From<u32> for Node {
    fn from(i: u32) -> Self {
        Node::Integer(i64::from(i))
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Integer(i)
    }
}

impl From<f32> for Node {
    fn from(f: f32) -> Self {
        Node::Float(f64::from(f))
    }
}

impl From<f64> for Node {
    fn from(f: f64) -> Self {
        Node::Float(f)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::List(items)
    }
}

impl From<NodeMap> for Node {
    fn from(map: NodeMap) -> Self {
        Node::Map(map)
    }
}

impl From<&Node> for Node {
    fn from(node: &Node) -> Self {
        node.clone()
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Null, Into::into)
    }
}

impl<T: Into<Node>> FromIterator<T> for Node {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Node::List(iter.into_iter().map(Into::into).collect())
    }
}
