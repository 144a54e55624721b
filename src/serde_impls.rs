use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::fmt::{self, Formatter};
use std::marker::PhantomData;

use crate::IntOpenHashMap;

const NAME: &str = "IntOpenHashMap";
const FIELDS: &[&str] = &["default_return_value", "entries"];

/// The entries of a map as a sequence of `(key, value)` pairs.
struct Entries<'a, V>(&'a IntOpenHashMap<V>);

impl<V: Serialize> Serialize for Entries<'_, V> {
    fn serialize<Sr>(&self, serializer: Sr) -> Result<Sr::Ok, Sr::Error>
    where
        Sr: Serializer,
    {
        serializer.collect_seq(self.0.iter())
    }
}

impl<V: Serialize> Serialize for IntOpenHashMap<V> {
    fn serialize<Sr>(&self, serializer: Sr) -> Result<Sr::Ok, Sr::Error>
    where
        Sr: Serializer,
    {
        let mut state = serializer.serialize_struct(NAME, 2)?;
        state.serialize_field("default_return_value", &self.default_value)?;
        state.serialize_field("entries", &Entries(self))?;
        state.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for IntOpenHashMap<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_struct(NAME, FIELDS, MapVisitor::new())
    }
}

#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "snake_case")]
enum Field {
    DefaultReturnValue,
    Entries,
}

struct MapVisitor<V> {
    _marker: PhantomData<IntOpenHashMap<V>>,
}

impl<V> MapVisitor<V> {
    pub(crate) fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

/// Rebuild a map sized for exactly its entries.
fn rebuild<V, E: de::Error>(
    default_value: Option<V>,
    entries: Vec<(i32, V)>,
) -> Result<IntOpenHashMap<V>, E> {
    let mut map = IntOpenHashMap::with_capacity(entries.len()).map_err(E::custom)?;
    map.set_default_return_value(default_value);
    for (key, value) in entries {
        map.insert(key, value);
    }
    Ok(map)
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for MapVisitor<V> {
    type Value = IntOpenHashMap<V>;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "an int-keyed map with a default return value")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let default_value = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let entries = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        rebuild(default_value, entries)
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut default_value: Option<Option<V>> = None;
        let mut entries: Option<Vec<(i32, V)>> = None;
        while let Some(field) = access.next_key()? {
            match field {
                Field::DefaultReturnValue => {
                    if default_value.is_some() {
                        return Err(de::Error::duplicate_field("default_return_value"));
                    }
                    default_value = Some(access.next_value()?);
                }
                Field::Entries => {
                    if entries.is_some() {
                        return Err(de::Error::duplicate_field("entries"));
                    }
                    entries = Some(access.next_value()?);
                }
            }
        }
        let entries = entries.ok_or_else(|| de::Error::missing_field("entries"))?;
        rebuild(default_value.flatten(), entries)
    }
}
