//! Line-oriented interactive shell
//!
//! Each input line is a search query unless it starts with `:`.

use crate::session::{Gate, Outcome};
use crate::speech::SpeechRecognizer;
use tazanet_core::{AgeClass, Result};
use tazanet_policy::VerdictAction;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const HELP: &str = "\
Type a search query, or one of:
  :age adult|child   set the age class
  :listen            take a query from speech input
  :status            show model status and age class
  :history           show recent decisions
  :help              show this help
  :quit              exit";

/// Shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Query(String),
    SetAge(AgeClass),
    Listen,
    Status,
    History,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let Some(command) = line.strip_prefix(':') else {
            return Self::Query(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("age"), Some(age)) => match age.parse() {
                Ok(age) => Self::SetAge(age),
                Err(e) => Self::Invalid(e),
            },
            (Some("listen"), None) => Self::Listen,
            (Some("status"), None) => Self::Status,
            (Some("history"), None) => Self::History,
            (Some("help"), None) => Self::Help,
            (Some("quit") | Some("exit"), None) => Self::Quit,
            _ => Self::Invalid(format!("unknown command '{}', try :help", line)),
        }
    }
}

/// Text shown for a decided query
pub fn render_outcome(outcome: &Outcome) -> String {
    match &outcome.action {
        VerdictAction::Dispatch { url, caution: None } => {
            format!("[{}] SAFE -> {}", outcome.decision.age, url)
        }
        VerdictAction::Dispatch {
            url,
            caution: Some(caution),
        } => format!(
            "[{}] >>> WARNING: {}\n  -> {}",
            outcome.decision.age, caution, url
        ),
        VerdictAction::Block { notice } => format!("[{}] {}", outcome.decision.age, notice),
    }
}

/// Run the shell until `:quit` or end of input
pub async fn run_shell<R, W>(
    gate: &Gate,
    recognizer: &dyn SpeechRecognizer,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    write_line(&mut output, "TazaNet ready. Type :help for commands.").await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Query(query) => gate.submit(&query).await?.map(|o| render_outcome(&o)),
            Command::Listen => Some(match gate.listen(recognizer).await? {
                Some(outcome) => format!("\"{}\"\n{}", outcome.query, render_outcome(&outcome)),
                None => "No query heard.".to_string(),
            }),
            Command::SetAge(age) => {
                gate.age_signal().set(age);
                Some(format!("Age class: {}", age))
            }
            Command::Status => Some(format!(
                "Model: {} | Age: {}",
                gate.status().status_label(),
                gate.age()
            )),
            Command::History => Some(render_history(gate)),
            Command::Help => Some(HELP.to_string()),
            Command::Invalid(message) => Some(message),
        };

        if let Some(reply) = reply {
            write_line(&mut output, &reply).await?;
        }
    }

    output.flush().await?;
    Ok(())
}

fn render_history(gate: &Gate) -> String {
    let recent = gate.recent(10);
    if recent.is_empty() {
        return "No queries yet.".to_string();
    }

    recent
        .iter()
        .map(|o| format!("{:<5} {} ({})", o.decision.verdict.kind(), o.query, o.decision.reason()))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
