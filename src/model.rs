//! Movie, director and change-event records with their JSON mappings.

use serde::{Deserialize, Deserializer, Serialize};

/// A movie as exposed over HTTP. `id == 0` means not yet persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub director: Director,
}

// `null` decodes like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Movie {
    pub fn new(isbn: impl Into<String>, title: impl Into<String>, director: Director) -> Self {
        Movie {
            id: 0,
            isbn: isbn.into(),
            title: title.into(),
            director,
        }
    }

    /// Copy with the given id, used once the store has assigned one.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

/// Director of a movie: a flat display name or a first/last name pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Director {
    Name(String),
    Person {
        #[serde(rename = "firstName", default)]
        first_name: String,
        #[serde(rename = "lastName", default)]
        last_name: String,
    },
}

impl Default for Director {
    fn default() -> Self {
        Director::Name(String::new())
    }
}

impl Director {
    pub fn person(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Director::Person {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// "First Last" for a person, the name itself otherwise.
    pub fn full_name(&self) -> String {
        match self {
            Director::Name(name) => name.clone(),
            Director::Person {
                first_name,
                last_name,
            } => format!("{} {}", first_name, last_name).trim().to_string(),
        }
    }

    /// First and last name. A flat name splits at its first run of whitespace.
    pub fn split_name(&self) -> (String, String) {
        match self {
            Director::Person {
                first_name,
                last_name,
            } => (first_name.clone(), last_name.clone()),
            Director::Name(name) => {
                let name = name.trim();
                match name.split_once(char::is_whitespace) {
                    Some((first, last)) => (first.to_string(), last.trim_start().to_string()),
                    None => (name.to_string(), String::new()),
                }
            }
        }
    }
}

/// Snapshot published after a movie is created. Never mutated once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieEvent {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub director: String,
}

impl MovieEvent {
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

impl From<&Movie> for MovieEvent {
    fn from(movie: &Movie) -> Self {
        MovieEvent {
            id: movie.id,
            isbn: movie.isbn.clone(),
            title: movie.title.clone(),
            director: movie.director.full_name(),
        }
    }
}
