// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Normalized record model shared by the normalizer, merger and renderers.
//!
//! A [`Record`] is an ordered mapping from string keys to [`Value`]s. Values
//! are restricted to three shapes (a scalar, a list of scalars, or a mapping of
//! string keys to scalars) so every encoding can rely on at most one level of
//! nesting. Key order is insertion order and survives serialization.

use std::{fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
};

/// Leaf value stored in a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
#[serde(untagged)]
pub enum Scalar
{
    /// Absent or explicitly empty upstream value.
    Null,
    /// Boolean flag.
    Bool(bool,),
    /// Integral number.
    Int(i64,),
    /// Floating point number.
    Float(f64,),
    /// Text.
    Str(String,),
}

impl Scalar
{
    /// Returns `true` for [`Scalar::Null`].
    pub fn is_null(&self,) -> bool
    {
        matches!(self, Self::Null)
    }

    /// Quoted representation used when a scalar is printed inside a collection.
    pub fn repr(&self,) -> String
    {
        match self {
            Self::Null => "null".to_owned(),
            Self::Str(text,) => format!("{text:?}"),
            other => other.to_string(),
        }
    }
}

/// Natural string form: text is unquoted, floats keep their fractional part
/// and null renders as an empty string.
impl fmt::Display for Scalar
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self {
            Self::Null => Ok((),),
            Self::Bool(flag,) => write!(f, "{flag}"),
            Self::Int(number,) => write!(f, "{number}"),
            Self::Float(number,) => write!(f, "{number:?}"),
            Self::Str(text,) => f.write_str(text,),
        }
    }
}

impl From<&str,> for Scalar
{
    fn from(value: &str,) -> Self
    {
        Self::Str(value.to_owned(),)
    }
}

impl From<String,> for Scalar
{
    fn from(value: String,) -> Self
    {
        Self::Str(value,)
    }
}

impl From<i64,> for Scalar
{
    fn from(value: i64,) -> Self
    {
        Self::Int(value,)
    }
}

impl From<f64,> for Scalar
{
    fn from(value: f64,) -> Self
    {
        Self::Float(value,)
    }
}

impl From<bool,> for Scalar
{
    fn from(value: bool,) -> Self
    {
        Self::Bool(value,)
    }
}

/// Insertion-ordered string-keyed map with replace-in-place semantics.
///
/// Inserting an existing key overwrites the value but keeps the key at its
/// original position.
#[derive(Debug, Clone, PartialEq,)]
pub struct Fields<V,>
{
    entries: Vec<(String, V,),>,
}

impl<V,> Default for Fields<V,>
{
    fn default() -> Self
    {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V,> Fields<V,>
{
    /// Creates an empty map.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String,>, value: V,) -> Option<V,>
    {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _,)| *existing == key,) {
            Some((_, slot,),) => Some(std::mem::replace(slot, value,),),
            None => {
                self.entries.push((key, value,),);
                None
            }
        }
    }

    pub fn get(&self, key: &str,) -> Option<&V,>
    {
        self.entries.iter().find(|(existing, _,)| existing == key,).map(|(_, value,)| value,)
    }

    pub fn contains_key(&self, key: &str,) -> bool
    {
        self.get(key,).is_some()
    }

    pub fn keys(&self,) -> impl Iterator<Item = &str,>
    {
        self.entries.iter().map(|(key, _,)| key.as_str(),)
    }

    pub fn iter(&self,) -> impl Iterator<Item = (&str, &V,),>
    {
        self.entries.iter().map(|(key, value,)| (key.as_str(), value,),)
    }

    pub fn len(&self,) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }
}

impl<K: Into<String,>, V,> FromIterator<(K, V,),> for Fields<V,>
{
    fn from_iter<I: IntoIterator<Item = (K, V,),>,>(iter: I,) -> Self
    {
        let mut fields = Self::new();
        for (key, value,) in iter {
            fields.insert(key, value,);
        }
        fields
    }
}

impl<V,> IntoIterator for Fields<V,>
{
    type IntoIter = std::vec::IntoIter<(String, V,),>;
    type Item = (String, V,);

    fn into_iter(self,) -> Self::IntoIter
    {
        self.entries.into_iter()
    }
}

impl<V: Serialize,> Serialize for Fields<V,>
{
    fn serialize<S: Serializer,>(&self, serializer: S,) -> Result<S::Ok, S::Error,>
    {
        serializer.collect_map(self.iter(),)
    }
}

impl<'de, V: Deserialize<'de,>,> Deserialize<'de,> for Fields<V,>
{
    fn deserialize<D: Deserializer<'de,>,>(deserializer: D,) -> Result<Self, D::Error,>
    {
        struct FieldsVisitor<V,>(PhantomData<V,>,);

        impl<'de, V: Deserialize<'de,>,> Visitor<'de,> for FieldsVisitor<V,>
        {
            type Value = Fields<V,>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_,>,) -> fmt::Result
            {
                formatter.write_str("a map with string keys",)
            }

            fn visit_map<A: MapAccess<'de,>,>(self, mut access: A,) -> Result<Self::Value, A::Error,>
            {
                let mut fields = Fields::new();
                while let Some((key, value,),) = access.next_entry::<String, V>()? {
                    fields.insert(key, value,);
                }
                Ok(fields,)
            }
        }

        deserializer.deserialize_map(FieldsVisitor(PhantomData,),)
    }
}

/// Mapping of string keys to scalars, e.g. a language breakdown.
pub type Mapping = Fields<Scalar,>;

/// One field value of a [`Record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
#[serde(untagged)]
pub enum Value
{
    Scalar(Scalar,),
    List(Vec<Scalar,>,),
    Mapping(Mapping,),
}

impl Value
{
    /// Low-fidelity single-line form used by the text encoding. Collections
    /// keep their brackets and quoted elements instead of being flattened.
    pub fn to_text(&self,) -> String
    {
        match self {
            Self::Scalar(scalar,) => scalar.to_string(),
            Self::List(items,) => {
                let inner: Vec<String,> = items.iter().map(Scalar::repr,).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Mapping(mapping,) => {
                let inner: Vec<String,> = mapping
                    .iter()
                    .map(|(key, value,)| format!("{key:?}: {}", value.repr()),)
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

macro_rules! scalar_value_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source,> for Value
            {
                fn from(value: $source,) -> Self
                {
                    Self::Scalar(value.into(),)
                }
            }
        )+
    };
}

scalar_value_from!(Scalar, &str, String, i64, f64, bool);

impl From<Vec<Scalar,>,> for Value
{
    fn from(value: Vec<Scalar,>,) -> Self
    {
        Self::List(value,)
    }
}

impl From<Mapping,> for Value
{
    fn from(value: Mapping,) -> Self
    {
        Self::Mapping(value,)
    }
}

/// Normalized key-value view of one fetched resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize,)]
#[serde(transparent)]
pub struct Record
{
    fields: Fields<Value,>,
}

impl Record
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Inserts or replaces a field, keeping the original key position.
    pub fn insert(&mut self, key: impl Into<String,>, value: impl Into<Value,>,)
    {
        self.fields.insert(key, value.into(),);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String,>, value: impl Into<Value,>,) -> Self
    {
        self.insert(key, value,);
        self
    }

    pub fn get(&self, key: &str,) -> Option<&Value,>
    {
        self.fields.get(key,)
    }

    pub fn contains_key(&self, key: &str,) -> bool
    {
        self.fields.contains_key(key,)
    }

    pub fn keys(&self,) -> impl Iterator<Item = &str,>
    {
        self.fields.keys()
    }

    pub fn iter(&self,) -> impl Iterator<Item = (&str, &Value,),>
    {
        self.fields.iter()
    }

    pub fn len(&self,) -> usize
    {
        self.fields.len()
    }

    pub fn is_empty(&self,) -> bool
    {
        self.fields.is_empty()
    }

    /// Shallow merge: every field of `other` replaces the field of the same
    /// key wholesale. Nested mappings are never combined.
    pub fn merge(&mut self, other: Record,)
    {
        for (key, value,) in other.fields {
            self.fields.insert(key, value,);
        }
    }
}

impl<K: Into<String,>,> FromIterator<(K, Value,),> for Record
{
    fn from_iter<I: IntoIterator<Item = (K, Value,),>,>(iter: I,) -> Self
    {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn sample() -> Record
    {
        Record::new()
            .with("name", "Test",)
            .with("array", vec![Scalar::from("item1"), Scalar::from("item2")],)
            .with("dict", [("k1", Scalar::from("v1"),), ("k2", Scalar::from("v2"),)].into_iter().collect::<Mapping>(),)
    }

    #[test]
    fn insert_replaces_value_in_place()
    {
        let mut record = Record::new().with("a", 1_i64,).with("b", 2_i64,);
        record.insert("a", "replaced",);

        assert_eq!(record.keys().collect::<Vec<_,>>(), vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&Value::from("replaced")));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn json_preserves_key_order_and_shapes()
    {
        let json = serde_json::to_string(&sample(),).expect("serialize",);
        assert_eq!(
            json,
            r#"{"name":"Test","array":["item1","item2"],"dict":{"k1":"v1","k2":"v2"}}"#
        );

        let decoded: Record = serde_json::from_str(&json,).expect("deserialize",);
        assert_eq!(decoded, sample());
    }

    #[test]
    fn untagged_scalars_keep_numeric_kinds()
    {
        let decoded: Record =
            serde_json::from_str(r#"{"stars":3004,"share":58.1,"license":null,"fork":false}"#,)
                .expect("deserialize",);

        assert_eq!(decoded.get("stars"), Some(&Value::Scalar(Scalar::Int(3004,),)));
        assert_eq!(decoded.get("share"), Some(&Value::Scalar(Scalar::Float(58.1,),)));
        assert_eq!(decoded.get("license"), Some(&Value::Scalar(Scalar::Null,)));
        assert_eq!(decoded.get("fork"), Some(&Value::Scalar(Scalar::Bool(false,),)));
    }

    #[test]
    fn text_form_keeps_collections_unflattened()
    {
        let record = sample();
        assert_eq!(record.get("array").map(Value::to_text).as_deref(), Some(r#"["item1", "item2"]"#));
        assert_eq!(
            record.get("dict").map(Value::to_text).as_deref(),
            Some(r#"{"k1": "v1", "k2": "v2"}"#)
        );
        assert_eq!(Value::from(Scalar::Null).to_text(), "");
        assert_eq!(Value::from(100.0).to_text(), "100.0");
    }

    #[test]
    fn merge_overwrites_whole_values()
    {
        let mut base = Record::new()
            .with("owner", [("login", Scalar::from("octocat"),)].into_iter().collect::<Mapping>(),)
            .with("stars", 1_i64,);
        let update = Record::new()
            .with("owner", [("type", Scalar::from("User"),)].into_iter().collect::<Mapping>(),);

        base.merge(update,);

        let owner = match base.get("owner",) {
            Some(Value::Mapping(mapping,),) => mapping,
            other => panic!("unexpected owner value: {other:?}"),
        };
        assert!(!owner.contains_key("login"));
        assert_eq!(owner.get("type"), Some(&Scalar::from("User")));
        assert_eq!(base.keys().collect::<Vec<_,>>(), vec!["owner", "stars"]);
    }
}
