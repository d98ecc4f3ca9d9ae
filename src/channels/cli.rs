//! CLI channel — one questionnaire session on stdin/stdout.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::WizardError;
use crate::wizard::{Answer, Questionnaire, SessionState, WizardAction, WizardView};

const HELP: &str = "Commands: y | n | - (clear) | next | prev | submit | restart | quit";

/// A parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Answer(Answer),
    Next,
    Previous,
    Submit,
    Restart,
    Help,
    Quit,
}

impl std::str::FromStr for CliCommand {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next" | ">" => Ok(Self::Next),
            "prev" | "previous" | "back" | "<" => Ok(Self::Previous),
            "submit" | "calc" | "calculate" => Ok(Self::Submit),
            "restart" | "reset" => Ok(Self::Restart),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "/quit" => Ok(Self::Quit),
            other => other
                .parse::<Answer>()
                .map(Self::Answer)
                .map_err(|_| format!("Unknown command: {other}")),
        }
    }
}

/// How a terminal session ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CliOutcome {
    /// Probability from the last successful submit, if any.
    pub last_probability: Option<f64>,
    /// True when the user typed `quit`; false when input simply ran out.
    pub quit: bool,
}

/// Terminal questionnaire. Owns its session state directly.
pub struct CliChannel {
    questionnaire: Arc<Questionnaire>,
}

impl CliChannel {
    pub fn new(questionnaire: Arc<Questionnaire>) -> Self {
        Self { questionnaire }
    }

    /// Run against the process stdin/stdout until EOF or `quit`.
    pub async fn run(&self) -> anyhow::Result<CliOutcome> {
        let reader = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        self.run_with(reader, &mut stdout).await
    }

    /// Drive the questionnaire from `reader`, writing views to `out`.
    ///
    /// Returns the last computed probability and whether the user quit.
    pub async fn run_with<R, W>(&self, reader: R, out: &mut W) -> anyhow::Result<CliOutcome>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut state = self.questionnaire.start();
        let mut lines = reader.lines();
        let mut quit = false;

        out.write_all(format!("Willingness to HLMC\n{HELP}\n\n").as_bytes())
            .await?;
        self.render(&state, out).await?;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<CliCommand>() {
                Ok(command) => command,
                Err(e) => {
                    out.write_all(format!("{e}\n{HELP}\n").as_bytes()).await?;
                    continue;
                }
            };

            let action = match command {
                CliCommand::Quit => {
                    quit = true;
                    break;
                }
                CliCommand::Help => {
                    out.write_all(format!("{HELP}\n").as_bytes()).await?;
                    continue;
                }
                CliCommand::Answer(answer) => WizardAction::SelectAnswer {
                    feature: self.questionnaire.current_feature(&state).clone(),
                    answer,
                },
                CliCommand::Next => WizardAction::Next,
                CliCommand::Previous => WizardAction::Previous,
                CliCommand::Submit => WizardAction::Submit,
                CliCommand::Restart => WizardAction::Restart,
            };

            match self.questionnaire.apply(&state, &action) {
                Ok(next) => state = next,
                Err(e) => {
                    out.write_all(describe_error(&e).as_bytes()).await?;
                    tracing::debug!(action = action.name(), error = %e, "CLI action rejected");
                }
            }
            self.render(&state, out).await?;
        }

        out.flush().await?;
        Ok(CliOutcome {
            last_probability: state.last_probability,
            quit,
        })
    }

    async fn render<W>(&self, state: &SessionState, out: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let view = WizardView::project(&self.questionnaire, state);
        out.write_all(format!("{}\n> ", view.render_text()).as_bytes())
            .await?;
        out.flush().await?;
        Ok(())
    }
}

fn describe_error(err: &WizardError) -> String {
    match err {
        WizardError::Validation(_) => format!("Warning: {err}\n"),
        WizardError::SchemaMismatch {
            missing,
            unexpected,
        } => {
            let mut msg = String::from("Error: Feature mismatch with the trained model.\n");
            if !missing.is_empty() {
                msg.push_str(&format!("  Missing: {}\n", missing.join(", ")));
            }
            if !unexpected.is_empty() {
                msg.push_str(&format!("  Unexpected: {}\n", unexpected.join(", ")));
            }
            msg
        }
        _ => format!("Error: {err}\n"),
    }
}
