//! In-memory joke collection shared by the memory and file backends.

use std::cmp::Reverse;

use rand::Rng;

use super::{Listing, MAX_ID_ATTEMPTS};
use crate::errors::AppError;
use crate::models::{generate_id, Joke};

/// Owned sequence of jokes in insertion order.
#[derive(Debug, Clone, Default)]
pub struct JokeCollection {
    jokes: Vec<Joke>,
}

impl JokeCollection {
    pub fn new(jokes: Vec<Joke>) -> Self {
        Self { jokes }
    }

    pub fn as_slice(&self) -> &[Joke] {
        &self.jokes
    }

    pub fn len(&self) -> usize {
        self.jokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jokes.is_empty()
    }

    pub fn list(&self) -> Listing {
        Listing::whole(self.jokes.clone())
    }

    pub fn find_by_text(&self, text: &str) -> Result<Listing, AppError> {
        let needle = text.to_lowercase();
        let matches: Vec<Joke> = self
            .jokes
            .iter()
            .filter(|joke| joke.matches(&needle))
            .cloned()
            .collect();

        if matches.is_empty() {
            return Err(AppError::NotFound(format!("No jokes matching {:?}", text)));
        }
        Ok(Listing::whole(matches))
    }

    pub fn find_by_id(&self, id: &str) -> Result<Joke, AppError> {
        self.jokes
            .iter()
            .find(|joke| joke.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Joke {} not found", id)))
    }

    /// Draw up to `size` jokes uniformly at random, with replacement.
    pub fn sample_random(&self, size: usize) -> Listing {
        self.sample_random_with(size, &mut rand::thread_rng())
    }

    pub fn sample_random_with<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Listing {
        if self.jokes.is_empty() {
            return Listing::default();
        }

        let sample = (0..size.min(self.jokes.len()))
            .map(|_| self.jokes[rng.gen_range(0..self.jokes.len())].clone())
            .collect();
        Listing::whole(sample)
    }

    pub fn list_by_score_desc(&self) -> Listing {
        let mut sorted = self.jokes.clone();
        sorted.sort_by_key(|joke| Reverse(joke.score));
        Listing::whole(sorted)
    }

    pub fn insert(&mut self, title: &str, body: &str, score: i64) -> Result<Joke, AppError> {
        self.insert_with(title, body, score, generate_id)
    }

    /// Append a joke, drawing identifiers from `next_id` until one is unused.
    pub fn insert_with(
        &mut self,
        title: &str,
        body: &str,
        score: i64,
        mut next_id: impl FnMut() -> String,
    ) -> Result<Joke, AppError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = next_id();
            if self.jokes.iter().any(|joke| joke.id == id) {
                tracing::debug!("Identifier {} already taken, drawing again", id);
                continue;
            }

            let joke = Joke::new(id, title, body, score);
            self.jokes.push(joke.clone());
            return Ok(joke);
        }

        Err(AppError::Storage(format!(
            "Could not generate a unique identifier after {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }
}
