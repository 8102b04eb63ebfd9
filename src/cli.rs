//! CLI front-end: a stdin/stdout REPL driving the twin interview.

use std::io::Write;
use std::sync::Arc;

use futures::{Stream, StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use crate::onboarding::{InterviewSession, Step};

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Answer(String),
    Status,
    Reset,
    Confirm,
    Quit,
}

impl ReplCommand {
    /// Parse a line. Blank lines yield `None`; unknown `/commands` are answers.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(match line {
            "/status" => Self::Status,
            "/reset" => Self::Reset,
            "/confirm" => Self::Confirm,
            "/quit" | "/exit" => Self::Quit,
            other => Self::Answer(other.to_string()),
        })
    }
}

/// Lines read from stdin, ending at EOF.
pub fn stdin_lines() -> impl Stream<Item = String> + Unpin {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }))
}

/// Render a step prompt with its quick replies.
pub fn render_step(step: &Step) -> String {
    if step.quick_replies.is_empty() {
        step.prompt.to_string()
    } else {
        format!("{}\n  [{}]", step.prompt, step.quick_replies.join(" | "))
    }
}

/// Run the interview until `/quit` or the input ends.
pub async fn run_repl<S, W>(
    session: Arc<Mutex<InterviewSession>>,
    mut lines: S,
    out: &mut W,
) -> std::io::Result<()>
where
    S: Stream<Item = String> + Unpin,
    W: Write,
{
    {
        let session = session.lock().await;
        writeln!(out, "{}\n", render_step(session.current_step()))?;
    }

    while let Some(line) = lines.next().await {
        let Some(command) = ReplCommand::parse(&line) else {
            continue;
        };
        let mut session = session.lock().await;
        match command {
            ReplCommand::Quit => break,
            ReplCommand::Status => {
                writeln!(out, "{}", session.completion())?;
                let state = serde_json::to_string_pretty(session.state())
                    .unwrap_or_else(|_| "{}".to_string());
                writeln!(out, "{state}\n")?;
            }
            ReplCommand::Reset => {
                session.reset().await;
                writeln!(out, "Starting over.\n\n{}\n", render_step(session.current_step()))?;
            }
            ReplCommand::Confirm => match session.confirm().await {
                Ok(confirmation) => {
                    writeln!(
                        out,
                        "Digital Twin \"{}\" created. ({})\n\n{}\n",
                        confirmation.twin_name,
                        confirmation.redirect,
                        render_step(session.current_step())
                    )?;
                }
                Err(e) => writeln!(out, "{e}\n")?,
            },
            ReplCommand::Answer(text) => {
                session.send_message(&text).await;
                writeln!(
                    out,
                    "{}\n  ({})\n",
                    render_step(session.current_step()),
                    session.completion()
                )?;
            }
        }
        out.flush()?;
    }
    Ok(())
}
