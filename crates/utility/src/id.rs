use std::{borrow::Cow, fmt, hash, marker::PhantomData};

use schemars::{
    gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject, StringValidation},
    JsonSchema,
};
use serde::{Deserialize, Serialize};

pub trait HasId {
    type IdType;
}

/// Subjects whose ids are human readable strings like `STN-1A2B3C4D`.
pub trait PrefixedId: HasId<IdType = String> {
    const PREFIX: &'static str;
    const RANDOM_LEN: usize = 8;
}

pub struct Id<T: HasId>(T::IdType, PhantomData<T>);

impl<T: HasId> Id<T> {
    pub fn new(inner: T::IdType) -> Self {
        Self(inner, PhantomData)
    }
}

impl<T: HasId> Id<T>
where
    T::IdType: Clone,
{
    pub fn raw(&self) -> T::IdType {
        self.0.clone()
    }

    pub fn raw_ref<'a, R>(&'a self) -> &'a R
    where
        T::IdType: AsRef<R>,
        R: ?Sized,
    {
        self.0.as_ref()
    }
}

impl<T: PrefixedId> Id<T> {
    /// Builds an id from the leading hex digits of `entropy`, e.g. a simple
    /// formatted uuid.
    pub fn from_entropy(entropy: &str) -> Self {
        let suffix = entropy
            .chars()
            .filter(|c| c.is_ascii_hexdigit())
            .take(T::RANDOM_LEN)
            .collect::<String>()
            .to_ascii_uppercase();
        Self::new(format!("{}-{}", T::PREFIX, suffix))
    }

    /// Accepts ids in any letter case, as they are typed into or copied from
    /// links. Returns `None` if the input can not be an id of `T`.
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_ascii_uppercase();
        let suffix = normalized.strip_prefix(T::PREFIX)?.strip_prefix('-')?;
        if suffix.len() != T::RANDOM_LEN
            || !suffix.chars().all(|c| c.is_ascii_hexdigit())
        {
            return None;
        }
        Some(Self::new(normalized))
    }
}

impl<T: HasId> fmt::Debug for Id<T>
where
    T::IdType: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.0).finish()
    }
}

impl<T: HasId> fmt::Display for Id<T>
where
    T::IdType: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: HasId> Clone for Id<T>
where
    T::IdType: Clone,
{
    fn clone(&self) -> Self {
        Self(self.0.clone(), PhantomData)
    }
}

impl<T: HasId> Copy for Id<T> where T::IdType: Copy {}

impl<T: HasId> hash::Hash for Id<T>
where
    T::IdType: hash::Hash,
{
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T: HasId> PartialEq for Id<T>
where
    T::IdType: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<T: HasId> Eq for Id<T> where T::IdType: Eq {}

impl<'de, T: HasId> Deserialize<'de> for Id<T>
where
    T::IdType: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::IdType::deserialize(deserializer).map(Id::new)
    }
}

impl<T: HasId> Serialize for Id<T>
where
    T::IdType: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T: HasId + JsonSchema> JsonSchema for Id<T>
where
    T::IdType: JsonSchema,
{
    fn schema_name() -> String {
        // Exclude the module path to make the name in generated schemas clearer.
        format!("{}Id", T::schema_name())
    }

    fn schema_id() -> Cow<'static, str> {
        // Include the module, in case a type with the same name is in another module/crate
        Cow::Borrowed(concat!(module_path!(), "::Id"))
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = T::IdType::json_schema(gen).into_object();
        if schema.instance_type == Some(InstanceType::String.into()) {
            schema.format = Some("id".to_owned());
        }
        schema.into()
    }
}

/// Schema for an id of a [`PrefixedId`] subject, including the pattern.
pub fn prefixed_id_schema<T: PrefixedId>() -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        format: Some("id".to_owned()),
        string: Some(Box::new(StringValidation {
            pattern: Some(format!("^{}-[0-9A-F]{{{}}}$", T::PREFIX, T::RANDOM_LEN)),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing;

    impl HasId for Thing {
        type IdType = String;
    }

    impl PrefixedId for Thing {
        const PREFIX: &'static str = "THG";
    }

    #[test]
    fn from_entropy_takes_leading_hex_digits() {
        let id = Id::<Thing>::from_entropy("9f1c-2b7e4d0a-ffff");
        assert_eq!(id.raw(), "THG-9F1C2B7E");
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let id = Id::<Thing>::parse(" thg-9f1c2b7e ").unwrap();
        assert_eq!(id.raw(), "THG-9F1C2B7E");
    }

    #[test]
    fn parse_rejects_foreign_or_malformed_ids() {
        assert!(Id::<Thing>::parse("STN-9F1C2B7E").is_none());
        assert!(Id::<Thing>::parse("THG-9F1C").is_none());
        assert!(Id::<Thing>::parse("THG-9F1C2B7X").is_none());
        assert!(Id::<Thing>::parse("THG9F1C2B7E").is_none());
    }

    #[test]
    fn serializes_as_bare_value() {
        let id = Id::<Thing>::new("THG-0000000A".to_owned());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"THG-0000000A\"");
        let back: Id<Thing> = serde_json::from_str("\"THG-0000000A\"").unwrap();
        assert_eq!(back, id);
    }
}
