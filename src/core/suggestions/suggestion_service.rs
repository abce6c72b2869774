// Suggestion service - verdict handling for moderated suggestions.
//
// Lifecycle per message: Posted -> Acknowledged -> Accepted | Declined.
// The Discord layer performs the acknowledgment (reactions + thread) and the
// terminal deletion; this service decides what a verdict means and persists
// accepted suggestions.

use super::suggestion_models::{
    build_transcript, ClosedSuggestion, PendingSuggestion, SuggestionRecord, Verdict, VoteTally,
};
use crate::core::claims::{Claim, ClaimSet};
use async_trait::async_trait;
use chrono::Utc;
use std::future::Future;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait SuggestionStore: Send + Sync {
    /// Append an accepted suggestion. Suggestions are never updated.
    async fn insert_suggestion(&self, record: &SuggestionRecord) -> Result<(), SuggestionError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Outcome of [`SuggestionService::begin_close`].
pub enum CloseStep<'a, M> {
    /// Another verdict for this message is being handled.
    InFlight,
    /// Already closed by an earlier verdict.
    Gone,
    /// Close `message`. Keep `claim` alive until the message is deleted.
    Ready { claim: Claim<'a>, message: M },
}

pub struct SuggestionService<S: SuggestionStore> {
    store: S,
    closing: ClaimSet,
}

impl<S: SuggestionStore> SuggestionService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            closing: ClaimSet::new(),
        }
    }

    /// Claim `message_id`, then load the suggestion through `fetch`.
    ///
    /// Loading under the claim means a verdict that finished first is seen as
    /// a deleted message. `fetch` yields `None` for a deleted message.
    pub async fn begin_close<M, E, F, Fut>(
        &self,
        message_id: u64,
        fetch: F,
    ) -> Result<CloseStep<'_, M>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<M>, E>>,
    {
        let claim = match self.closing.claim(message_id) {
            Some(claim) => claim,
            None => return Ok(CloseStep::InFlight),
        };

        match fetch().await? {
            Some(message) => Ok(CloseStep::Ready { claim, message }),
            None => Ok(CloseStep::Gone),
        }
    }

    /// Render a verdict: tally votes, build the transcript and store the
    /// suggestion if it was accepted.
    pub async fn close(
        &self,
        suggestion: PendingSuggestion,
        verdict: Verdict,
        votes: VoteTally,
    ) -> Result<ClosedSuggestion, SuggestionError> {
        let transcript = build_transcript(&suggestion.content, &votes, verdict);
        tracing::info!(
            message_id = suggestion.message_id,
            author_id = suggestion.author_id,
            %verdict,
            accept = votes.accept,
            decline = votes.decline,
            "Closing suggestion"
        );

        let record = if verdict.is_accepted() {
            let record = SuggestionRecord {
                author_id: suggestion.author_id,
                date: Utc::now(),
                description: suggestion.content,
            };
            self.store.insert_suggestion(&record).await?;
            Some(record)
        } else {
            None
        };

        Ok(ClosedSuggestion {
            verdict,
            votes,
            author_name: suggestion.author_name,
            transcript,
            record,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
