//! Fixture-backed story repository.
//!
//! Serves stories from a JSON file, filtered by a case-insensitive title
//! match and split into fixed-size pages, with an optional simulated latency.

use std::future::Future;
use std::path::Path;
use std::time::Duration;
use storysearch::dispatch::SearchRepository;
use storysearch::story::RawStory;
use thiserror::Error;

/// Errors loading a fixture file.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixtures '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixtures '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors returned by a fixture search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("page {0} is out of range, pages start at 1")]
    InvalidPage(u32),
}

/// In-memory story source.
#[derive(Debug, Clone)]
pub struct FixtureRepository {
    stories: Vec<RawStory>,
    page_size: usize,
    latency: Duration,
}

impl FixtureRepository {
    pub fn new(stories: Vec<RawStory>, page_size: usize, latency: Duration) -> Self {
        Self {
            stories,
            page_size: page_size.max(1),
            latency,
        }
    }

    /// Loads a JSON array of raw stories.
    pub fn load(path: &Path, page_size: usize, latency: Duration) -> Result<Self, FixtureError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: display.clone(),
            source,
        })?;
        let stories: Vec<RawStory> =
            serde_json::from_str(&content).map_err(|source| FixtureError::Parse {
                path: display,
                source,
            })?;

        tracing::debug!(path = %path.display(), stories = stories.len(), "Loaded fixtures");
        Ok(Self::new(stories, page_size, latency))
    }

    /// Number of stories available.
    pub fn story_count(&self) -> usize {
        self.stories.len()
    }

    fn page_of(&self, query: &str, page: u32) -> Result<Vec<RawStory>, SearchError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if page == 0 {
            return Err(SearchError::InvalidPage(page));
        }

        let skip = (page as usize - 1).saturating_mul(self.page_size);
        Ok(self
            .stories
            .iter()
            .filter(|story| story.title.to_lowercase().contains(&needle))
            .skip(skip)
            .take(self.page_size)
            .cloned()
            .collect())
    }
}

impl SearchRepository for FixtureRepository {
    type Item = RawStory;
    type Error = SearchError;

    fn search(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<Vec<RawStory>, SearchError>> + Send {
        let result = self.page_of(query, page);
        let latency = self.latency;
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        }
    }
}
