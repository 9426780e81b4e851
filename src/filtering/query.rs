use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// A single query parameter as it arrived on the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// `?species=a,b`
    Single(String),
    /// `?species=a&species=b` or `?species[]=a`
    Many(Vec<String>),
}

impl QueryValue {
    /// The value used by scalar filter kinds. A repeated parameter yields its
    /// first non-empty occurrence.
    #[must_use]
    pub fn first(&self) -> &str {
        match self {
            Self::Single(value) => value,
            Self::Many(values) => values
                .iter()
                .find(|value| !value.is_empty())
                .map_or("", String::as_str),
        }
    }

    /// True when no occurrence carries a value. The filter builder treats
    /// such a parameter as absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(value) => value.is_empty(),
            Self::Many(values) => values.iter().all(String::is_empty),
        }
    }
}

/// Query parameters of one request, keyed by parameter name.
///
/// Repeated keys and keys with a trailing `[]` collapse into
/// [`QueryValue::Many`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: HashMap<String, QueryValue>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `(key, value)` pairs in URL order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.push(key.into(), value.into());
        }
        params
    }

    pub fn push(&mut self, key: String, value: String) {
        let (key, is_list) = match key.strip_suffix("[]") {
            Some(base) => (base.to_string(), true),
            None => (key, false),
        };

        match self.values.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(if is_list {
                    QueryValue::Many(vec![value])
                } else {
                    QueryValue::Single(value)
                });
            }
            Entry::Occupied(mut slot) => {
                let merged = match slot.get_mut() {
                    QueryValue::Many(values) => {
                        values.push(value);
                        return;
                    }
                    QueryValue::Single(previous) => {
                        QueryValue::Many(vec![std::mem::take(previous), value])
                    }
                };
                slot.insert(merged);
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.values.get(key)
    }

    /// Scalar view of a parameter, see [`QueryValue::first`].
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).map(QueryValue::first)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
