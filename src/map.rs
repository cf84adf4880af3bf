use crate::node::Node;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// An association of `Node` keys to `Node` values.
///
/// Keys are unique under the total order of [`Node`]: inserting a key that compares
/// equal to an existing one replaces the value in place. Entries are kept in
/// insertion order so a serialized map reads back the way it was written, while a
/// sorted index serves lookups.
#[derive(Clone, Default)]
pub struct NodeMap {
    entries: Vec<(Node, Node)>,
    index: BTreeMap<Node, usize>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a pair, returning the previous value if the key was already present.
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, key: impl Into<Node>, value: impl Into<Node>) -> Option<Node> {
        let key = key.into();
        let value = value.into();
        if let Some(&slot) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &Node) -> Option<&Node> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn get_mut(&mut self, key: &Node) -> Option<&mut Node> {
        let slot = *self.index.get(key)?;
        Some(&mut self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &Node) -> bool {
        self.index.contains_key(key)
    }

    /// Removes a key, returning its value. The remaining entries keep their relative order.
    pub fn remove(&mut self, key: &Node) -> Option<Node> {
        let slot = self.index.remove(key)?;
        let (_, value) = self.entries.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Some(value)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &Node> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Node> + '_ {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Node> + '_ {
        self.entries.iter_mut().map(|(_, value)| value)
    }

    /// Entries in key order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&Node, &Node)> + '_ {
        self.index
            .iter()
            .map(|(key, &slot)| (key, &self.entries[slot].1))
    }
}

pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (Node, Node)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Node, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, value)| (key, value))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a NodeMap {
    type Item = (&'a Node, &'a Node);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for NodeMap {
    type Item = (Node, Node);
    type IntoIter = std::vec::IntoIter<(Node, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<Node>, V: Into<Node>> Extend<(K, V)> for NodeMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<Node>, V: Into<Node>> FromIterator<(K, V)> for NodeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = NodeMap::new();
        map.extend(iter);
        map
    }
}

// Maps order by entry count first, then by their entries taken in key order.
impl Ord for NodeMap {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.iter_sorted().cmp(other.iter_sorted()))
    }
}

impl PartialOrd for NodeMap {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeMap {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeMap {}

impl fmt::Debug for NodeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
