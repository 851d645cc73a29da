use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// One dataset record: an ordered JSON object
///
/// Field order is preserved so that written datasets keep the layout of the
/// input. Apart from the answer field, which the enricher owns, every field is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetItem {
    fields: Map<String, Json>,
}

impl DatasetItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Json>) -> Self {
        Self { fields }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Json::as_str)
    }

    /// Sets a field; an existing key keeps its position
    pub fn set(&mut self, key: &str, value: Json) {
        match self.fields.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                self.fields.insert(key.to_string(), value);
            }
        }
    }

    /// Answer text, `None` when absent or null
    pub fn answer(&self, answer_field: &str) -> Option<&str> {
        self.get_str(answer_field)
    }

    /// Short database name: the `database` field after its last `_`
    ///
    /// `neo4jlabs_demo_db_movies` -> `movies`
    pub fn database_alias(&self) -> Option<&str> {
        self.get_str("database")
            .map(|db| db.rsplit_once('_').map_or(db, |(_, alias)| alias))
    }

    /// Whether this item belongs to the given source
    pub fn matches_source(&self, source: &str) -> bool {
        self.database_alias().is_some_and(|alias| alias.contains(source))
    }

    pub fn as_map(&self) -> &Map<String, Json> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Json> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Json>> for DatasetItem {
    fn from(fields: Map<String, Json>) -> Self {
        Self::from_map(fields)
    }
}
