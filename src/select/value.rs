use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::Entity;

/// Primitive identity of a selectable option
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionId {
    Int(i64),
    Str(String),
}

impl OptionId {
    /// Integers are recognized, everything else is kept as a string
    pub fn parse(s: &str) -> Self {
        s.parse::<i64>()
            .map(OptionId::Int)
            .unwrap_or_else(|_| OptionId::Str(s.to_string()))
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionId::Int(i) => write!(f, "{}", i),
            OptionId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for OptionId {
    fn from(i: i64) -> Self {
        OptionId::Int(i)
    }
}

impl From<&str> for OptionId {
    fn from(s: &str) -> Self {
        OptionId::Str(s.to_string())
    }
}

impl From<String> for OptionId {
    fn from(s: String) -> Self {
        OptionId::Str(s)
    }
}

/// A value handed to a select control: either a bare identity or a full entity
#[derive(Debug, Clone, PartialEq)]
pub enum SelectValue<T> {
    Id(OptionId),
    Entity(T),
}

impl<T> From<OptionId> for SelectValue<T> {
    fn from(id: OptionId) -> Self {
        SelectValue::Id(id)
    }
}

/// One member of a selection, normalized to an identity.
///
/// `entity` is `None` when the caller supplied only an identity and no option
/// with that identity has been loaded yet.
#[derive(Debug, Clone)]
pub struct Selected<T> {
    pub id: OptionId,
    pub entity: Option<T>,
}

impl<T> Selected<T> {
    pub fn from_value(value: SelectValue<T>, accessors: &OptionAccessors<T>) -> Self {
        match value {
            SelectValue::Id(id) => Self { id, entity: None },
            SelectValue::Entity(entity) => Self::from_entity(entity, accessors),
        }
    }

    pub fn from_entity(entity: T, accessors: &OptionAccessors<T>) -> Self {
        Self {
            id: accessors.value(&entity),
            entity: Some(entity),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.entity.is_some()
    }

    /// Entity label, or the bare identity while unresolved
    pub fn label(&self, accessors: &OptionAccessors<T>) -> String {
        self.entity
            .as_ref()
            .map(|entity| accessors.label(entity))
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Identity comparison only
impl<T> PartialEq for Selected<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

type LabelFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
type ValueFn<T> = Arc<dyn Fn(&T) -> OptionId + Send + Sync>;

/// Caller-supplied label and identity extraction
pub struct OptionAccessors<T> {
    label: LabelFn<T>,
    value: ValueFn<T>,
}

impl<T> OptionAccessors<T> {
    pub fn new(
        label: impl Fn(&T) -> String + Send + Sync + 'static,
        value: impl Fn(&T) -> OptionId + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: Arc::new(label),
            value: Arc::new(value),
        }
    }

    pub fn label(&self, item: &T) -> String {
        (self.label)(item)
    }

    pub fn value(&self, item: &T) -> OptionId {
        (self.value)(item)
    }
}

impl<T: Entity> OptionAccessors<T> {
    pub fn from_entity() -> Self {
        Self::new(|item: &T| item.label(), |item: &T| item.id())
    }
}

impl<T> Clone for OptionAccessors<T> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> fmt::Debug for OptionAccessors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OptionAccessors")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        key: String,
        title: String,
    }

    fn accessors() -> OptionAccessors<Tag> {
        OptionAccessors::new(|t: &Tag| t.title.clone(), |t: &Tag| t.key.as_str().into())
    }

    #[test]
    fn test_option_id_parse_and_serde() {
        assert_eq!(OptionId::parse("42"), OptionId::Int(42));
        assert_eq!(OptionId::parse("abc"), OptionId::Str("abc".to_string()));
        assert_eq!(serde_json::to_string(&OptionId::Int(3)).unwrap(), "3");
        let parsed: OptionId = serde_json::from_str(r#""x1""#).unwrap();
        assert_eq!(parsed, OptionId::from("x1"));
    }

    #[test]
    fn test_values_normalize_to_identity() {
        let accessors = accessors();
        let by_id = Selected::from_value(SelectValue::Id("rust".into()), &accessors);
        let by_entity = Selected::from_value(
            SelectValue::Entity(Tag {
                key: "rust".to_string(),
                title: "Rust".to_string(),
            }),
            &accessors,
        );

        assert_eq!(by_id, by_entity);
        assert!(!by_id.is_resolved());
        assert_eq!(by_id.label(&accessors), "rust");
        assert_eq!(by_entity.label(&accessors), "Rust");
    }

    #[test]
    fn test_selected_equality_ignores_entity_contents() {
        let accessors = accessors();
        let a = Selected::from_entity(
            Tag {
                key: "k".to_string(),
                title: "Old".to_string(),
            },
            &accessors,
        );
        let b = Selected::from_entity(
            Tag {
                key: "k".to_string(),
                title: "Renamed".to_string(),
            },
            &accessors,
        );
        assert_eq!(a, b);
    }
}
