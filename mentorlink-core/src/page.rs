//! Page load lifecycle.
//!
//! Every page starts `Loading` and settles into exactly one of `Ready`,
//! `Empty` or `Failed`. Loads run under a `CancellationToken`; once the token
//! fires the result is dropped instead of committed.

use std::future::Future;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::MentorlinkError;

pub const RETRY_LABEL: &str = "Try Again";

/// Placeholder a page shows when a load succeeds with nothing to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyState {
    pub title: String,
    pub message: String,
    pub call_to_action: Option<String>,
}

impl EmptyState {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            call_to_action: None,
        }
    }

    pub fn with_action(mut self, label: impl Into<String>) -> Self {
        self.call_to_action = Some(label.into());
        self
    }

    pub fn no_sessions() -> Self {
        Self::new(
            "No sessions yet",
            "Sessions you schedule with your matches will show up here.",
        )
        .with_action("Find a mentor")
    }

    pub fn no_matches() -> Self {
        Self::new(
            "No matches yet",
            "Express interest in a mentor to start a conversation.",
        )
        .with_action("Browse mentors")
    }

    pub fn no_notifications() -> Self {
        Self::new("You're all caught up", "New activity will appear here.")
    }

    pub fn no_reviews() -> Self {
        Self::new(
            "No reviews yet",
            "Reviews appear after completed sessions.",
        )
    }

    pub fn no_mentors() -> Self {
        Self::new(
            "No mentors found",
            "Try a different search or clear some filters.",
        )
        .with_action("Clear filters")
    }

    pub fn no_posts() -> Self {
        Self::new("No posts yet", "Be the first to start a discussion.")
            .with_action("New post")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageError {
    pub message: String,
    pub retry_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum PageState<T> {
    Loading,
    Ready(T),
    Empty(EmptyState),
    Failed(PageError),
}

impl<T> PageState<T> {
    /// Settle a finished load. `is_empty` decides whether a successful result
    /// gets the placeholder instead of the content.
    pub fn settle(
        result: Result<T, MentorlinkError>,
        is_empty: impl FnOnce(&T) -> bool,
        empty: impl FnOnce() -> EmptyState,
    ) -> Self {
        match result {
            Ok(value) if is_empty(&value) => PageState::Empty(empty()),
            Ok(value) => PageState::Ready(value),
            Err(e) => {
                tracing::error!(error = %e, "page load failed");
                PageState::Failed(PageError {
                    message: e.to_string(),
                    retry_label: RETRY_LABEL,
                })
            }
        }
    }

    pub fn from_result(result: Result<T, MentorlinkError>) -> Self {
        Self::settle(result, |_| false, || EmptyState::new("", ""))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PageState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Run `load` unless `cancel` fires first. `None` means the load was
/// abandoned and nothing may be committed from it.
pub async fn guarded_load<T, E, F>(cancel: &CancellationToken, load: F) -> Option<Result<T, E>>
where
    F: Future<Output = Result<T, E>>,
{
    if cancel.is_cancelled() {
        return None;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("load cancelled before completion");
            None
        }
        result = load => {
            if cancel.is_cancelled() {
                None
            } else {
                Some(result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_settle_empty_vs_ready() {
        let empty: PageState<Vec<u32>> =
            PageState::settle(Ok(vec![]), |v| v.is_empty(), EmptyState::no_sessions);
        assert!(matches!(
            empty,
            PageState::Empty(ref e) if e.call_to_action.as_deref() == Some("Find a mentor")
        ));

        let ready: PageState<Vec<u32>> =
            PageState::settle(Ok(vec![1]), |v| v.is_empty(), EmptyState::no_sessions);
        assert_eq!(ready.ready(), Some(&vec![1]));
    }

    #[test]
    fn test_failure_carries_retry_label() {
        let failed: PageState<()> =
            PageState::from_result(Err(MentorlinkError::Other("connection reset".to_string())));
        match failed {
            PageState::Failed(e) => {
                assert_eq!(e.retry_label, "Try Again");
                assert!(e.message.contains("connection reset"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_state_serializes_tagged() {
        let json = serde_json::to_value(PageState::Ready(3)).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["data"], 3);
    }

    #[tokio::test]
    async fn test_guarded_load_commits_when_not_cancelled() {
        let token = CancellationToken::new();
        let out = guarded_load(&token, async { Ok::<_, MentorlinkError>(7) }).await;
        assert_eq!(out.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancelled_load_never_commits() {
        let token = CancellationToken::new();
        let child = token.child_token();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        let out = guarded_load(&child, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, MentorlinkError>(1)
        })
        .await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_load() {
        let token = CancellationToken::new();
        token.cancel();
        let out = guarded_load(&token, async { Ok::<_, MentorlinkError>(1) }).await;
        assert!(out.is_none());
    }
}
