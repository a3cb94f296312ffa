use serde::{Deserialize, Serialize};

/// Storage for one attribute array, flattened tuple by tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values")]
pub enum AttributeValues {
    Float(Vec<f64>),
    UChar(Vec<u8>),
}

impl AttributeValues {
    pub fn len(&self) -> usize {
        match self {
            AttributeValues::Float(v) => v.len(),
            AttributeValues::UChar(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named per-vertex attribute with a fixed number of components per tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointArray {
    pub name: String,
    pub components: usize,
    pub values: AttributeValues,
}

impl PointArray {
    pub fn float(name: impl Into<String>, components: usize, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            components,
            values: AttributeValues::Float(values),
        }
    }

    pub fn uchar(name: impl Into<String>, components: usize, values: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            components,
            values: AttributeValues::UChar(values),
        }
    }

    pub fn tuple_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components
        }
    }

    pub fn is_uchar(&self) -> bool {
        matches!(self.values, AttributeValues::UChar(_))
    }

    /// Component `c` of tuple `i` widened to f64.
    pub fn component(&self, i: usize, c: usize) -> Option<f64> {
        if c >= self.components {
            return None;
        }
        let k = i * self.components + c;
        match &self.values {
            AttributeValues::Float(v) => v.get(k).copied(),
            AttributeValues::UChar(v) => v.get(k).map(|&b| b as f64),
        }
    }
}

/// Ordered collection of point attributes keyed by name.
///
/// Inserting an array whose name already exists replaces it in place, so
/// attribute order stays stable across re-runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointData {
    arrays: Vec<PointArray>,
}

impl PointData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an array, returning the replaced one.
    pub fn insert(&mut self, array: PointArray) -> Option<PointArray> {
        match self.arrays.iter_mut().find(|a| a.name == array.name) {
            Some(slot) => Some(std::mem::replace(slot, array)),
            None => {
                self.arrays.push(array);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PointArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<PointArray> {
        let pos = self.arrays.iter().position(|a| a.name == name)?;
        Some(self.arrays.remove(pos))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.iter().map(|a| a.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointArray> {
        self.arrays.iter()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}
