//! Collaborator seams consumed by the dispatcher.
//!
//! The dispatcher knows nothing about where stories come from or what they
//! look like. It depends on two abstractions:
//!
//! - [`SearchRepository`]: the asynchronous, fallible fetch
//! - [`ItemMapper`]: the pure raw-to-domain conversion, applied item by item

use std::future::Future;

/// Asynchronous source of raw search results.
///
/// # Example
///
/// ```ignore
/// struct HttpStories { client: reqwest::Client }
///
/// impl SearchRepository for HttpStories {
///     type Item = RawStory;
///     type Error = StoriesError;
///
///     fn search(&self, query: &str, page: u32)
///         -> impl Future<Output = Result<Vec<RawStory>, StoriesError>> + Send
///     {
///         let request = self.client.get(url(query, page));
///         async move { /* ... */ }
///     }
/// }
/// ```
pub trait SearchRepository: Send + Sync + 'static {
    /// Raw item type returned by the source.
    type Item: Send + 'static;

    /// Failure cause; passed to callbacks unchanged.
    type Error: Send + 'static;

    /// Fetches one page of results for `query`.
    ///
    /// May suspend; the dispatcher races it against cancellation.
    fn search(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<Vec<Self::Item>, Self::Error>> + Send;
}

/// Pure conversion from a raw item to a domain item.
///
/// Implemented for every `Fn(R) -> D`, so a plain function works:
///
/// ```ignore
/// let dispatcher = SearchDispatcher::new(repo, to_story, contexts);
/// ```
pub trait ItemMapper<R>: Send + Sync + 'static {
    /// Domain item type.
    type Output: Send + 'static;

    /// Maps one raw item.
    fn map(&self, raw: R) -> Self::Output;
}

impl<R, D, F> ItemMapper<R> for F
where
    F: Fn(R) -> D + Send + Sync + 'static,
    D: Send + 'static,
{
    type Output = D;

    fn map(&self, raw: R) -> D {
        self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_mapper() {
        fn apply<M: ItemMapper<u32>>(mapper: &M, raw: u32) -> M::Output {
            mapper.map(raw)
        }

        assert_eq!(apply(&|n: u32| n.to_string(), 42), "42");
    }
}
