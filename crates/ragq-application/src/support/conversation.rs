//! Conversation history with LLM-driven summarization (C7 history).

use ragq_domain::constants::{KEEP_RECENT_TURNS, MAX_HISTORY_TURNS, MAX_SUMMARY_CHARS};
use ragq_domain::ports::providers::LlmMessage;

/// One `user` + `assistant` exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    /// What the user asked.
    pub user: String,
    /// What the assistant answered.
    pub assistant: String,
}

/// A bounded conversation window: a running summary of older turns plus
/// the verbatim recent ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationHistory {
    /// Compressed summary of turns older than the verbatim window, `None`
    /// until the first summarization runs.
    pub summary: Option<String>,
    /// Turns kept verbatim.
    pub turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    /// Append a new exchange.
    pub fn push(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push(ConversationTurn {
            user: user.into(),
            assistant: assistant.into(),
        });
    }

    /// Whether the history has grown past `MAX_HISTORY_TURNS` and should
    /// be summarized before the next call.
    pub fn needs_summarization(&self) -> bool {
        self.turns.len() > MAX_HISTORY_TURNS
    }

    /// Split into `(turns to summarize, turns to keep verbatim)`. The
    /// verbatim half is always the last `KEEP_RECENT_TURNS`.
    pub fn split_for_summarization(&self) -> (&[ConversationTurn], &[ConversationTurn]) {
        let keep_from = self.turns.len().saturating_sub(KEEP_RECENT_TURNS);
        self.turns.split_at(keep_from)
    }

    /// Replace the older turns with a freshly computed summary, keeping
    /// the recent ones verbatim. The summary is truncated to
    /// `MAX_SUMMARY_CHARS` to preserve the boundedness invariant even if
    /// the summarizer overshoots.
    pub fn apply_summary(&mut self, new_summary: String) {
        let (_, recent) = self.split_for_summarization();
        let recent = recent.to_vec();
        let truncated: String = new_summary.chars().take(MAX_SUMMARY_CHARS).collect();
        self.summary = Some(truncated);
        self.turns = recent;
    }

    /// Render this history as the message list fed to the LLM: an
    /// optional leading `system` summary message, then the verbatim
    /// turns as alternating `user`/`assistant` messages.
    pub fn to_messages(&self) -> Vec<LlmMessage> {
        let mut messages = Vec::with_capacity(self.turns.len() * 2 + 1);
        if let Some(summary) = &self.summary {
            messages.push(LlmMessage::system(format!(
                "Summary of earlier conversation: {summary}"
            )));
        }
        for turn in &self.turns {
            messages.push(LlmMessage::user(turn.user.clone()));
            messages.push(LlmMessage::assistant(turn.assistant.clone()));
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(n: usize) -> ConversationHistory {
        let mut history = ConversationHistory::default();
        for i in 0..n {
            history.push(format!("q{i}"), format!("a{i}"));
        }
        history
    }

    #[test]
    fn does_not_need_summarization_below_threshold() {
        assert!(!history_with(MAX_HISTORY_TURNS).needs_summarization());
    }

    #[test]
    fn needs_summarization_above_threshold() {
        assert!(history_with(MAX_HISTORY_TURNS + 1).needs_summarization());
    }

    #[test]
    fn split_keeps_exactly_the_recent_window() {
        let history = history_with(MAX_HISTORY_TURNS + 2);
        let (older, recent) = history.split_for_summarization();
        assert_eq!(recent.len(), KEEP_RECENT_TURNS);
        assert_eq!(older.len() + recent.len(), history.turns.len());
    }

    #[test]
    fn apply_summary_bounds_active_history_size() {
        let mut history = history_with(MAX_HISTORY_TURNS + 4);
        history.apply_summary("compressed context".to_string());
        assert_eq!(history.turns.len(), KEEP_RECENT_TURNS);
        assert!(history.to_messages().len() <= KEEP_RECENT_TURNS * 2 + 1);
    }

    #[test]
    fn apply_summary_truncates_oversized_summaries() {
        let mut history = history_with(MAX_HISTORY_TURNS + 1);
        history.apply_summary("x".repeat(MAX_SUMMARY_CHARS * 3));
        assert_eq!(history.summary.unwrap().chars().count(), MAX_SUMMARY_CHARS);
    }

    #[test]
    fn to_messages_without_summary_has_no_leading_system_message() {
        let history = history_with(2);
        let messages = history.to_messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "user");
    }
}
