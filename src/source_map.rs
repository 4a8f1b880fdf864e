use std::fmt::{self, Display, Formatter};

use indexmap::{IndexMap, IndexSet};
use serde_derive::{Serialize, Deserialize};

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    /// The obfuscated name of the declaring class
    pub class: String,
    /// The obfuscated name of the field
    pub name: String
}
impl FieldKey {
    #[inline]
    pub fn new<C: Into<String>, N: Into<String>>(class: C, name: N) -> FieldKey {
        FieldKey { class: class.into(), name: name.into() }
    }
}
impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.name)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MethodKey {
    /// The obfuscated name of the declaring class
    pub class: String,
    /// The obfuscated name of the method
    pub name: String,
    /// The method descriptor, which only references obfuscated class names
    pub descriptor: String
}
impl MethodKey {
    #[inline]
    pub fn new<C, N, D>(class: C, name: N, descriptor: D) -> MethodKey
        where C: Into<String>, N: Into<String>, D: Into<String> {
        MethodKey { class: class.into(), name: name.into(), descriptor: descriptor.into() }
    }
}
impl Display for MethodKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.name, self.descriptor)
    }
}

/// Identifies a single entry of a [`SourceMap`], qualified by its category
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum MappingKey {
    Class(String),
    Field(FieldKey),
    Method(MethodKey)
}
impl Display for MappingKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            MappingKey::Class(ref name) => write!(f, "class {}", name),
            MappingKey::Field(ref key) => write!(f, "field {}", key),
            MappingKey::Method(ref key) => write!(f, "method {}", key),
        }
    }
}

/// The readable names of the classes and members of an obfuscated program
///
/// Everything is keyed by obfuscated names, and iterates in the order of the original document.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SourceMap {
    classes: IndexMap<String, String>,
    #[serde(with = "pairs")]
    fields: IndexMap<FieldKey, String>,
    #[serde(with = "pairs")]
    methods: IndexMap<MethodKey, String>
}
impl SourceMap {
    /// The readable class names, keyed by obfuscated class name
    #[inline]
    pub fn classes(&self) -> &IndexMap<String, String> {
        &self.classes
    }
    #[inline]
    pub fn fields(&self) -> &IndexMap<FieldKey, String> {
        &self.fields
    }
    #[inline]
    pub fn methods(&self) -> &IndexMap<MethodKey, String> {
        &self.methods
    }
    #[inline]
    pub fn get_class(&self, obf_class: &str) -> Option<&str> {
        self.classes.get(obf_class).map(String::as_str)
    }
    #[inline]
    pub fn get_field(&self, obf_class: &str, obf_name: &str) -> Option<&str> {
        self.fields.get(&FieldKey::new(obf_class, obf_name)).map(String::as_str)
    }
    #[inline]
    pub fn get_method(&self, obf_class: &str, obf_name: &str, descriptor: &str) -> Option<&str> {
        self.methods.get(&MethodKey::new(obf_class, obf_name, descriptor)).map(String::as_str)
    }
    /// The total number of classes, fields, and methods
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len() + self.fields.len() + self.methods.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn contains_key(&self, key: &MappingKey) -> bool {
        match *key {
            MappingKey::Class(ref name) => self.classes.contains_key(name),
            MappingKey::Field(ref key) => self.fields.contains_key(key),
            MappingKey::Method(ref key) => self.methods.contains_key(key),
        }
    }
    pub fn keys<'a>(&'a self) -> impl Iterator<Item=MappingKey> + 'a {
        self.classes.keys().cloned().map(MappingKey::Class)
            .chain(self.fields.keys().cloned().map(MappingKey::Field))
            .chain(self.methods.keys().cloned().map(MappingKey::Method))
    }
    /// Find the keys which are only present in one of the maps
    pub fn compare_keys(&self, other: &SourceMap) -> KeyComparison {
        KeyComparison {
            left_only: self.keys().filter(|key| !other.contains_key(key)).collect(),
            right_only: other.keys().filter(|key| !self.contains_key(key)).collect()
        }
    }
    /// The names of classes which declare members but don't have a mapping of their own
    pub fn undeclared_classes(&self) -> IndexSet<&str> {
        self.fields.keys().map(|key| &*key.class)
            .chain(self.methods.keys().map(|key| &*key.class))
            .filter(|class| !self.classes.contains_key(*class))
            .collect()
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyComparison {
    pub left_only: IndexSet<MappingKey>,
    pub right_only: IndexSet<MappingKey>
}
impl KeyComparison {
    #[inline]
    pub fn is_identical(&self) -> bool {
        self.left_only.is_empty() && self.right_only.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SourceMapBuilder {
    classes: IndexMap<String, String>,
    fields: IndexMap<FieldKey, String>,
    methods: IndexMap<MethodKey, String>
}
impl SourceMapBuilder {
    #[inline]
    pub fn new() -> SourceMapBuilder {
        SourceMapBuilder::default()
    }
    #[inline]
    pub fn classes(&self) -> &IndexMap<String, String> {
        &self.classes
    }
    #[inline]
    pub fn set_class_name<O: Into<String>, R: Into<String>>(&mut self, obf: O, readable: R) -> Option<String> {
        self.classes.insert(obf.into(), readable.into())
    }
    #[inline]
    pub fn set_field_name<R: Into<String>>(&mut self, key: FieldKey, readable: R) -> Option<String> {
        self.fields.insert(key, readable.into())
    }
    #[inline]
    pub fn set_method_name<R: Into<String>>(&mut self, key: MethodKey, readable: R) -> Option<String> {
        self.methods.insert(key, readable.into())
    }
    #[inline]
    pub fn frozen(self) -> SourceMap {
        let SourceMapBuilder { classes, fields, methods } = self;
        SourceMap { classes, fields, methods }
    }
}

/// Serializes tuple-keyed maps as a sequence of `[key, value]` pairs
mod pairs {
    use std::hash::Hash;

    use indexmap::IndexMap;
    use serde::{Serialize, Serializer, Deserialize, Deserializer};

    pub fn serialize<K, V, S>(map: &IndexMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
        where K: Serialize + Hash + Eq, V: Serialize, S: Serializer {
        serializer.collect_seq(map.iter())
    }
    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<IndexMap<K, V>, D::Error>
        where K: Deserialize<'de> + Hash + Eq, V: Deserialize<'de>, D: Deserializer<'de> {
        let pairs = Vec::<(K, V)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn example() -> SourceMap {
        let mut builder = SourceMapBuilder::new();
        builder.set_class_name("c", "a/Foo");
        builder.set_field_name(FieldKey::new("c", "f"), "field");
        builder.set_method_name(MethodKey::new("c", "m", "()V"), "method");
        builder.frozen()
    }

    #[test]
    fn lookup() {
        let map = example();
        assert_eq!(map.get_class("c"), Some("a/Foo"));
        assert_eq!(map.get_class("a/Foo"), None);
        assert_eq!(map.get_field("c", "f"), Some("field"));
        assert_eq!(map.get_method("c", "m", "()V"), Some("method"));
        assert_eq!(map.get_method("c", "m", "(I)V"), None);
        assert_eq!(map.len(), 3);
        assert!(!map.is_empty());
        assert!(SourceMap::default().is_empty());
        assert!(map.undeclared_classes().is_empty());
    }
    #[test]
    fn compare_keys() {
        let mut builder = SourceMapBuilder::new();
        builder.set_class_name("c", "a/Foo");
        builder.set_class_name("d", "a/Bar");
        builder.set_field_name(FieldKey::new("c", "f"), "renamedField");
        let other = builder.frozen();
        let comparison = example().compare_keys(&other);
        assert_eq!(
            comparison.left_only.into_iter().collect::<Vec<_>>(),
            vec![MappingKey::Method(MethodKey::new("c", "m", "()V"))]
        );
        assert_eq!(
            comparison.right_only.into_iter().collect::<Vec<_>>(),
            vec![MappingKey::Class("d".into())]
        );
        assert!(example().compare_keys(&example()).is_identical());
    }
    #[test]
    fn undeclared_classes() {
        let mut builder = SourceMapBuilder::new();
        builder.set_class_name("c", "a/Foo");
        builder.set_field_name(FieldKey::new("d", "f"), "field");
        builder.set_method_name(MethodKey::new("d", "m", "()V"), "method");
        assert_eq!(builder.frozen().undeclared_classes().into_iter().collect::<Vec<_>>(), vec!["d"]);
    }
    #[test]
    fn display_keys() {
        assert_eq!(format!("{}", MappingKey::Class("c".into())), "class c");
        assert_eq!(format!("{}", MappingKey::Field(FieldKey::new("c", "f"))), "field c.f");
        assert_eq!(format!("{}", MappingKey::Method(MethodKey::new("c", "m", "(I)V"))), "method c.m(I)V");
    }
    #[test]
    fn serialize() {
        let map = example();
        let json = ::serde_json::to_value(&map).unwrap();
        assert_eq!(json["classes"]["c"], "a/Foo");
        assert_eq!(json["fields"][0][0]["name"], "f");
        assert_eq!(json["methods"][0][0]["descriptor"], "()V");
        assert_eq!(json["methods"][0][1], "method");
        let parsed: SourceMap = ::serde_json::from_value(json).unwrap();
        assert_eq!(parsed, map);
    }
}
