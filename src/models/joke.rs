//! Joke model and identifier generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of random bytes in a generated identifier.
const ID_BYTES: usize = 3;

/// A short text item with a popularity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Joke {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub score: i64,
}

impl Joke {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        score: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            score,
        }
    }

    /// Case-insensitive substring match against title or body.
    ///
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.body.to_lowercase().contains(needle)
    }
}

/// Form body for creating a joke.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJokeRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Generate a short random hex identifier.
pub fn generate_id() -> String {
    let bytes: [u8; ID_BYTES] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_short_hex() {
        let id = generate_id();
        assert_eq!(id.len(), ID_BYTES * 2);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let joke = Joke::new("1", "Knock Knock", "Who's there?", 0);
        assert!(joke.matches("knock"));
        assert!(joke.matches("there"));
        assert!(!joke.matches("banana"));
    }

    #[test]
    fn test_score_defaults_to_zero() {
        let joke: Joke =
            serde_json::from_str(r#"{"id":"abc123","title":"T","body":"B"}"#).unwrap();
        assert_eq!(joke.score, 0);
    }
}
