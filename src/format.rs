//! Answer post-processing and history snapshots

use crate::conversation::{ConversationLog, Message};
use once_cell::sync::Lazy;
use regex::Regex;

/// Any run of ASCII digits followed by a period, wherever it appears
#[allow(clippy::non_std_lazy_statics)]
static NUMBERED_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+\.").expect("numbered marker regex is valid"));

/// Prepare a raw answer for display.
///
/// A line break goes in front of every `<ASCII digits>.` so inline numbered lists
/// render one item per line, then surrounding whitespace is trimmed. The
/// match is deliberately blunt: version numbers and decimals are split too.
pub fn format_answer(raw: &str) -> String {
    NUMBERED_MARKER_RE
        .replace_all(raw, "\n$0")
        .trim()
        .to_string()
}

/// History to send alongside a query, captured at dispatch time.
///
/// `None` when history forwarding is switched off.
pub fn history_snapshot(log: &ConversationLog, send_history: bool) -> Option<Vec<Message>> {
    send_history.then(|| log.snapshot())
}
