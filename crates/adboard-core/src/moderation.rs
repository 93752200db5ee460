use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{session::ListingDraft, Result};

/// Instruction sent with every classification request.
pub const MODERATION_INSTRUCTION: &str = "You are moderating a classifieds board. \
Respond with a single token: 'ok' if the text is a legitimate listing, or 'reject' \
if it contains spam, abuse or fraud.";

/// The literal accept token after normalization.
const ACCEPT_TOKEN: &str = "ok";

/// Port for the external text-classification provider.
#[async_trait]
pub trait ModerationClient: Send + Sync {
    /// One request/response classification call. Implementations return the
    /// raw response text; interpretation happens in the gate.
    async fn classify(&self, instruction: &str, submission: &str) -> Result<String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// Wraps the classification call with the fail-closed decision rule.
///
/// Exactly one external call per submission, bounded by `timeout`; every
/// failure mode (transport error, parse error, expiry, unexpected token) is
/// `Rejected`. Ambiguous moderation never results in publication.
pub struct ModerationGate {
    client: Arc<dyn ModerationClient>,
    timeout: Duration,
}

impl ModerationGate {
    pub fn new(client: Arc<dyn ModerationClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn moderate(&self, draft: &ListingDraft) -> Verdict {
        let submission = submission_text(draft);
        let call = self.client.classify(MODERATION_INSTRUCTION, &submission);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(raw)) => {
                if normalize_token(&raw) == ACCEPT_TOKEN {
                    Verdict::Accepted
                } else {
                    Verdict::Rejected
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "moderation call failed, rejecting");
                Verdict::Rejected
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "moderation call timed out, rejecting");
                Verdict::Rejected
            }
        }
    }
}

/// Fixed textual template submitted for classification.
fn submission_text(draft: &ListingDraft) -> String {
    format!(
        "Title: {}\nDescription: {}\nPrice: {}",
        draft.title.as_deref().unwrap_or(""),
        draft.description.as_deref().unwrap_or(""),
        draft.price.unwrap_or(0),
    )
}

/// Trim, take the first whitespace token, lowercase, strip trailing punctuation.
fn normalize_token(raw: &str) -> String {
    let first = raw.trim().split_whitespace().next().unwrap_or("");
    first
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase()
}
