//! Search run: wires the fixture repository to a dispatcher, issues the
//! requested searches, applies cancellations and collects the deliveries.

use crate::fixtures::{FixtureRepository, SearchError};
use std::sync::Arc;
use storysearch::context::{ChannelForeground, DispatchContexts, TokioBackground};
use storysearch::dispatch::{DispatcherConfig, RequestKey, SearchDispatcher, SearchResult};
use storysearch::story::{to_story, RawStory, Story};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What to search and what to cancel.
#[derive(Debug, Clone, Default)]
pub struct SearchPlan {
    pub queries: Vec<String>,
    pub pages: u32,
    pub cancel: Vec<String>,
    pub cancel_all: bool,
}

impl SearchPlan {
    /// Number of requests the plan issues.
    pub fn request_count(&self) -> usize {
        self.queries.len() * self.pages as usize
    }
}

/// One delivered callback.
#[derive(Debug)]
pub struct Outcome {
    pub source: String,
    pub page: u32,
    pub result: SearchResult<Story, SearchError>,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct SearchReport {
    pub requested: usize,
    pub cancelled: usize,
    /// Outcomes in foreground delivery order
    pub outcomes: Vec<Outcome>,
}

/// Runs `plan` against `repository` and waits for every request to settle.
pub async fn run_search(
    repository: FixtureRepository,
    config: DispatcherConfig,
    plan: &SearchPlan,
) -> SearchReport {
    let (foreground, event_loop) = ChannelForeground::new();
    let shutdown = CancellationToken::new();
    let loop_task = tokio::spawn(event_loop.run(shutdown.clone()));

    let contexts = DispatchContexts::new(
        Arc::new(TokioBackground::current()),
        Arc::new(foreground),
    );
    let dispatcher = SearchDispatcher::with_config(
        Arc::new(repository),
        to_story as fn(RawStory) -> Story,
        contexts,
        config,
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    for query in &plan.queries {
        for page in 1..=plan.pages {
            let tx = tx.clone();
            dispatcher.invoke(query.as_str(), page, move |result, page, source| {
                let _ = tx.send(Outcome {
                    source,
                    page,
                    result,
                });
            });
        }
    }
    drop(tx);
    info!(requests = plan.request_count(), "Searches dispatched");

    let mut cancelled = 0;
    for source in &plan.cancel {
        if dispatcher.cancel_request_of_source(source) {
            cancelled += 1;
        } else {
            debug!(source = %source, "Nothing to cancel");
        }
    }
    if plan.cancel_all {
        cancelled += dispatcher.cancel_all_requests();
    }

    dispatcher.wait_idle().await;
    shutdown.cancel();
    match loop_task.await {
        Ok(deliveries) => debug!(deliveries, "Foreground loop finished"),
        Err(e) => warn!(error = %e, "Foreground loop failed"),
    }

    let mut outcomes = Vec::new();
    while let Ok(outcome) = rx.try_recv() {
        outcomes.push(outcome);
    }
    info!(
        delivered = outcomes.len(),
        cancelled,
        stats = ?dispatcher.tracker().stats(),
        "Search run complete"
    );

    SearchReport {
        requested: plan.request_count(),
        cancelled,
        outcomes,
    }
}

/// Formats a report for the terminal.
pub fn render(report: &SearchReport) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        let key = RequestKey::new(outcome.source.as_str(), outcome.page);
        match &outcome.result {
            SearchResult::Success(stories) => {
                let noun = if stories.len() == 1 { "story" } else { "stories" };
                out.push_str(&format!("{key} ({} {noun})\n", stories.len()));
                for story in stories {
                    let link = story.url.as_deref().unwrap_or("discussion");
                    out.push_str(&format!(
                        "  [{}] {} <{}> {} votes, {} comments\n",
                        story.id, story.title, link, story.vote_count, story.comment_count
                    ));
                }
            }
            SearchResult::Error(cause) => {
                out.push_str(&format!("{key} error: {cause}\n"));
            }
        }
    }

    out.push_str(&format!(
        "{} requested, {} delivered, {} cancelled\n",
        report.requested,
        report.outcomes.len(),
        report.cancelled
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use storysearch::story::RawStoryLinks;

    fn raw(id: u64, title: &str, url: Option<&str>) -> RawStory {
        RawStory {
            id,
            title: title.to_string(),
            url: url.map(str::to_string),
            comment: None,
            comment_html: None,
            comment_count: 1,
            vote_count: 5,
            created_at: "2018-12-06T00:00:00Z".to_string(),
            links: RawStoryLinks::default(),
        }
    }

    fn repository(latency: Duration) -> FixtureRepository {
        FixtureRepository::new(
            vec![
                raw(1, "Rust 2018", Some("https://blog.rust-lang.org")),
                raw(2, "Ask: rust editors", None),
                raw(3, "Go modules", Some("https://go.dev")),
            ],
            1,
            latency,
        )
    }

    fn plan(queries: &[&str], pages: u32) -> SearchPlan {
        SearchPlan {
            queries: queries.iter().map(|q| q.to_string()).collect(),
            pages,
            ..SearchPlan::default()
        }
    }

    fn keys(report: &SearchReport) -> Vec<String> {
        let mut keys: Vec<String> = report
            .outcomes
            .iter()
            .map(|o| RequestKey::new(o.source.as_str(), o.page).to_string())
            .collect();
        keys.sort();
        keys
    }

    #[tokio::test]
    async fn test_every_page_is_delivered() {
        let report = run_search(
            repository(Duration::ZERO),
            DispatcherConfig::default(),
            &plan(&["rust", "go"], 2),
        )
        .await;

        assert_eq!(report.requested, 4);
        assert_eq!(report.cancelled, 0);
        assert_eq!(keys(&report), vec!["go::1", "go::2", "rust::1", "rust::2"]);
    }

    #[tokio::test]
    async fn test_cancelled_sources_are_not_delivered() {
        let mut plan = plan(&["rust"], 2);
        plan.cancel = vec!["rust::2".to_string(), "rust::9".to_string(), "bogus".to_string()];

        let report = run_search(
            repository(Duration::from_millis(200)),
            DispatcherConfig::default(),
            &plan,
        )
        .await;

        assert_eq!(report.cancelled, 1);
        assert_eq!(keys(&report), vec!["rust::1"]);
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let mut plan = plan(&["rust", "go"], 3);
        plan.cancel_all = true;

        let report = run_search(
            repository(Duration::from_secs(30)),
            DispatcherConfig::default(),
            &plan,
        )
        .await;

        assert_eq!(report.cancelled, 6);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_render() {
        let report = SearchReport {
            requested: 2,
            cancelled: 0,
            outcomes: vec![
                Outcome {
                    source: "rust".to_string(),
                    page: 1,
                    result: SearchResult::Success(vec![to_story(raw(
                        2,
                        "Ask: rust editors",
                        None,
                    ))]),
                },
                Outcome {
                    source: " ".to_string(),
                    page: 1,
                    result: SearchResult::Error(SearchError::EmptyQuery),
                },
            ],
        };

        assert_eq!(
            render(&report),
            "rust::1 (1 story)\n\
             \x20 [2] Ask: rust editors <discussion> 5 votes, 1 comments\n\
             \x20::1 error: query is empty\n\
             2 requested, 2 delivered, 0 cancelled\n"
        );
    }
}
