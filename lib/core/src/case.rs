use serde::{Deserialize, Serialize};

/// A raw attribute-name → value record, as exchanged at the boundaries
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Stable identity of a case: its position in the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub usize);

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for CaseId {
    fn from(i: usize) -> Self {
        CaseId(i)
    }
}

/// Position of a declared attribute inside [`Features`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSlot {
    Numeric(usize),
    Categorical(usize),
}

/// Validated feature values, laid out in schema declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    numeric: Vec<f64>,
    categorical: Vec<String>,
}

impl Features {
    #[inline]
    #[must_use]
    pub fn new(numeric: Vec<f64>, categorical: Vec<String>) -> Self {
        Self { numeric, categorical }
    }

    #[inline]
    pub fn numeric(&self) -> &[f64] {
        &self.numeric
    }

    #[inline]
    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    #[inline]
    pub fn number(&self, slot: usize) -> Option<f64> {
        self.numeric.get(slot).copied()
    }

    #[inline]
    pub fn category(&self, slot: usize) -> Option<&str> {
        self.categorical.get(slot).map(String::as_str)
    }
}

/// A historical record with a known outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub features: Features,
    pub target: f64,
}

impl Case {
    #[inline]
    #[must_use]
    pub fn new(id: CaseId, features: Features, target: f64) -> Self {
        Self { id, features, target }
    }
}

/// Ordered, immutable collection of cases indexed by identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    cases: Vec<Case>,
}

impl Corpus {
    /// Build a corpus from `(features, target)` rows. Identities are
    /// assigned from row position.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Features, f64)>,
    {
        let cases = rows
            .into_iter()
            .enumerate()
            .map(|(i, (features, target))| Case::new(CaseId(i), features, target))
            .collect();
        Self { cases }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, id: CaseId) -> Option<&Case> {
        self.cases.get(id.0)
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Case> {
        self.cases.iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Case;
    type IntoIter = std::slice::Iter<'a, Case>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}
