use std::fmt::{
    self,
    Write,
};
use std::str::FromStr;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Keys written at the front of the attribute column, in this order.
pub const ATTR_ORDER: [&str; 4] = ["gene_id", "transcript_id", "locus", "repName"];

static ATTR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)(\S+)\s+"(.+?)";"#).expect("attribute pattern is valid")
});

/// Typed attribute value. Text is inferred as integer first, then float,
/// and falls back to a plain string.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    pub fn infer(s: &str) -> Self {
        if let Ok(v) = s.parse::<i64>() {
            AttrValue::Int(v)
        }
        else if let Ok(v) = s.parse::<f64>() {
            AttrValue::Float(v)
        }
        else {
            AttrValue::Str(s.to_string())
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::Str(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "integer",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "string",
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            // Debug keeps the ".0" on integral floats, so values survive a
            // read/write cycle unchanged.
            AttrValue::Float(v) => write!(f, "{:?}", v),
            AttrValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self { AttrValue::Int(value) }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self { AttrValue::Int(value as i64) }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self { AttrValue::Float(value) }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self { AttrValue::Str(value.to_string()) }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self { AttrValue::Str(value) }
}

/// Insertion-ordered attribute bag of a GTF record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    inner: IndexMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self { Self::default() }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&AttrValue> {
        self.inner.get(key)
    }

    pub fn insert<V: Into<AttrValue>>(
        &mut self,
        key: &str,
        value: V,
    ) -> Option<AttrValue> {
        self.inner.insert(key.to_string(), value.into())
    }

    pub fn remove(
        &mut self,
        key: &str,
    ) -> Option<AttrValue> {
        self.inner.shift_remove(key)
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.inner.contains_key(key)
    }

    pub fn clear(&mut self) { self.inner.clear() }

    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> { self.inner.iter() }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Attributes {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let preferred = ATTR_ORDER
            .iter()
            .filter_map(|key| self.inner.get_key_value(*key));
        let others = self
            .inner
            .iter()
            .filter(|(key, _)| !ATTR_ORDER.contains(&key.as_str()));

        let mut serialized = String::with_capacity(128);
        for (key, value) in preferred.chain(others) {
            if !serialized.is_empty() {
                serialized.push(' ');
            }
            write!(serialized, "{} \"{}\";", key, value)?;
        }
        f.write_str(&serialized)
    }
}

impl FromStr for Attributes {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ATTR_PATTERN
            .captures_iter(s)
            .map(|caps| (caps[1].to_string(), AttrValue::infer(&caps[2])))
            .collect())
    }
}
