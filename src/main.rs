//! Helpdesk chat - terminal client
//!
//! Reads queries from stdin and prints the conversation as it changes.

use helpdesk_chat::client::{HttpHelpdeskClient, LoggingService};
use helpdesk_chat::config::ClientConfig;
use helpdesk_chat::conversation::{Feedback, Message, Role};
use helpdesk_chat::session::{self, SessionView};
use helpdesk_chat::state_machine::SessionContext;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Ask(&'a str),
    Judge { id: &'a str, judgment: Feedback },
    Quit,
    Usage(&'static str),
}

fn parse_line(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Command::Ask(line);
    };

    let mut parts = rest.split_whitespace();
    let judgment = match parts.next() {
        Some("quit") => return Command::Quit,
        Some("like") => Feedback::Liked,
        Some("dislike") => Feedback::Disliked,
        _ => return Command::Usage("commands: :like <id>, :dislike <id>, :quit"),
    };
    match (parts.next(), parts.next()) {
        (Some(id), None) => Command::Judge { id, judgment },
        _ => Command::Usage("usage: :like <id> or :dislike <id>"),
    }
}

fn render_message(message: &Message) -> String {
    let prefix = match message.role() {
        Role::User => "you>",
        Role::Assistant => "ai>",
    };
    let mut line = format!("{prefix} {}", message.content());
    if let Some(id) = message.id() {
        line.push_str(&format!("  [{id}]"));
    }
    if let Some(feedback) = message.feedback() {
        line.push_str(&format!(" ({feedback})"));
    }
    line
}

/// Lines to print for the change from `prev` to `next`
fn render_changes(prev: &SessionView, next: &SessionView) -> Vec<String> {
    let mut lines = Vec::new();

    for (old, new) in prev.messages.iter().zip(&next.messages) {
        if old.feedback() != new.feedback() {
            if let (Some(id), Some(feedback)) = (new.id(), new.feedback()) {
                lines.push(format!("-- {id} marked {feedback}"));
            }
        }
    }

    for message in next.messages.iter().skip(prev.messages.len()) {
        lines.push(render_message(message));
    }

    if next.busy && !prev.busy {
        lines.push("AI is typing...".to_string());
    }
    if next.error != prev.error {
        if let Some(error) = &next.error {
            lines.push(format!("error: {error}"));
        }
    }

    lines
}

async fn render_loop(mut rx: watch::Receiver<SessionView>) {
    let mut shown = rx.borrow_and_update().clone();
    while rx.changed().await.is_ok() {
        let next = rx.borrow_and_update().clone();
        for line in render_changes(&shown, &next) {
            println!("{line}");
        }
        shown = next;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helpdesk_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        chat_url = %config.chat_url(),
        feedback_url = %config.feedback_url(),
        send_history = config.send_history,
        "Helpdesk client configured"
    );

    let client = std::sync::Arc::new(HttpHelpdeskClient::new(&config)?);
    let context = SessionContext::new(uuid::Uuid::new_v4().to_string(), config.send_history);
    let handle = session::start(
        context,
        LoggingService::new(client.clone()),
        LoggingService::new(client),
    );

    let renderer = tokio::spawn(render_loop(handle.watch()));

    println!("Ask a question. :like <id> / :dislike <id> to rate an answer, :quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Command::Ask(text) => handle.submit(text).await?,
            Command::Judge { id, judgment } => handle.submit_feedback(id, judgment).await?,
            Command::Quit => break,
            Command::Usage(usage) => println!("{usage}"),
        }
    }

    tracing::info!(session_id = %handle.session_id(), "Leaving chat");
    drop(handle);
    renderer.await?;

    Ok(())
}
