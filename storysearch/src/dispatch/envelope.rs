//! Result types handed to search callbacks.

/// Outcome of one search request.
///
/// Match it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult<T, E> {
    /// The repository answered; items are mapped, in repository order.
    Success(Vec<T>),
    /// The repository failed; the cause is passed through untouched.
    Error(E),
}

impl<T, E> SearchResult<T, E> {
    /// Returns true for [`SearchResult::Success`].
    pub fn is_success(&self) -> bool {
        match self {
            SearchResult::Success(_) => true,
            SearchResult::Error(_) => false,
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<Vec<T>, E> {
        match self {
            SearchResult::Success(items) => Ok(items),
            SearchResult::Error(cause) => Err(cause),
        }
    }
}

impl<T, E> From<Result<Vec<T>, E>> for SearchResult<T, E> {
    fn from(result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(items) => SearchResult::Success(items),
            Err(cause) => SearchResult::Error(cause),
        }
    }
}

/// A search result together with the request it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEnvelope<T, E> {
    /// Success or error.
    pub result: SearchResult<T, E>,
    /// Page that was requested.
    pub page: u32,
    /// Query string that was requested.
    pub source: String,
}

impl<T, E> ResultEnvelope<T, E> {
    /// Creates an envelope.
    pub fn new(result: SearchResult<T, E>, page: u32, source: impl Into<String>) -> Self {
        Self {
            result,
            page,
            source: source.into(),
        }
    }

    /// Hands the envelope to `callback` as `(result, page, source)`.
    pub fn deliver<C>(self, callback: C)
    where
        C: FnOnce(SearchResult<T, E>, u32, String),
    {
        callback(self.result, self.page, self.source)
    }
}
