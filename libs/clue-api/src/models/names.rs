use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A set-valued field (variants, workloads).
///
/// The deployer accepts and returns these comma-joined (`"a,b"`), while some
/// endpoints answer with a JSON array. Both forms deserialize; serialization
/// always produces the comma-joined form the deploy endpoints expect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameList(pub Vec<String>);

impl NameList {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn parse(joined: &str) -> Self {
        Self(
            joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }
}

impl From<Vec<String>> for NameList {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl fmt::Display for NameList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl Serialize for NameList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.joined())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNames {
    Joined(String),
    List(Vec<NamedOrString>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamedOrString {
    Plain(String),
    Named { name: String },
}

impl<'de> Deserialize<'de> for NameList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawNames>::deserialize(deserializer)?;
        Ok(match raw {
            None => NameList::default(),
            Some(RawNames::Joined(s)) => NameList::parse(&s),
            Some(RawNames::List(items)) => NameList(
                items
                    .into_iter()
                    .map(|item| match item {
                        NamedOrString::Plain(s) => s,
                        NamedOrString::Named { name } => name,
                    })
                    .collect(),
            ),
        })
    }
}
