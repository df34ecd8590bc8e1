//! Relationship values and raw attribute dumps

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Type-erased value held by a relationship
///
/// The empty value is what a reader sees before anything was populated or
/// set. Clones share the underlying value.
#[derive(Clone, Default)]
pub struct RelationValue(Option<Arc<dyn Any + Send + Sync>>);

impl RelationValue {
    /// The neutral, unset value
    pub const fn empty() -> Self {
        Self(None)
    }

    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Check whether the held value is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// Borrow the held value as a `T`, if it is one
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref()?.downcast_ref::<T>()
    }

    /// True if both values are empty or share the same allocation
    pub fn ptr_eq(&self, other: &RelationValue) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for RelationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(f, "RelationValue(<empty>)"),
            Some(_) => write!(f, "RelationValue(<value>)"),
        }
    }
}

/// Flat key/value dump of a machine's attributes
///
/// Keys are lower-cased, so lookups are case-insensitive. The relationship
/// system never looks inside a dump; it only hands it to populate hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeDump {
    attributes: BTreeMap<String, String>,
}

impl AttributeDump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `VBoxManage showvminfo --machinereadable` output
    ///
    /// Each line is `key=value`; either side may be double-quoted. Lines
    /// without a key are ignored.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .filter_map(parse_line)
            .collect()
    }

    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.attributes
            .insert(key.as_ref().to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(&key.to_lowercase())
            .map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for AttributeDump {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dump = AttributeDump::new();
        for (key, value) in iter {
            dump.insert(key, value);
        }
        dump
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();

    // Quoted keys may contain '='
    let (key, value) = if let Some(rest) = line.strip_prefix('"') {
        let (key, rest) = unquote(rest)?;
        (key, rest.strip_prefix('=')?)
    } else {
        let (key, value) = line.split_once('=')?;
        (key.trim().to_string(), value)
    };

    if key.trim().is_empty() {
        return None;
    }

    let value = value.trim();
    let value = match value.strip_prefix('"').and_then(unquote) {
        Some((value, _)) => value,
        None => value.to_string(),
    };

    Some((key, value))
}

/// Read a quoted string up to its closing quote, resolving `\"` and `\\`
///
/// `text` starts just after the opening quote. Returns the unescaped string
/// and the remainder after the closing quote, or `None` if it never closes.
fn unquote(text: &str) -> Option<(String, &str)> {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.char_indices();

    while let Some((index, c)) = chars.next() {
        match c {
            '"' => return Some((unescaped, &text[index + 1..])),
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\\'))) => unescaped.push(escaped),
                Some((_, other)) => {
                    unescaped.push('\\');
                    unescaped.push(other);
                }
                None => unescaped.push('\\'),
            },
            c => unescaped.push(c),
        }
    }

    None
}
