use super::status::StatusLine;
use super::transport::CommandTransport;
use super::validator::{CommandValidator, ValidationError};
use link::TransportError;
use screen::CommandDraft;
use std::fmt;

pub const SENDING_MESSAGE: &str = "Sending command...";
pub const SENT_MESSAGE: &str = "Command sent successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandState {
    Idle,
    Validating,
    Invalid,
    ValidAwaitingConfirmation,
    ValidReady,
    Sending,
    Sent,
    Failed,
}

impl CommandState {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandState::Idle => "idle",
            CommandState::Validating => "validating",
            CommandState::Invalid => "invalid",
            CommandState::ValidAwaitingConfirmation => "awaiting confirmation",
            CommandState::ValidReady => "ready",
            CommandState::Sending => "sending",
            CommandState::Sent => "sent",
            CommandState::Failed => "failed",
        }
    }

    /// States from which a new submission may start.
    fn accepts_submit(self) -> bool {
        matches!(self, CommandState::Idle | CommandState::Sent)
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WorkflowError {
    #[error("cannot {action} while {state}")]
    WrongState {
        action: &'static str,
        state: CommandState,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to send command: {0}")]
    Transport(#[from] TransportError),
}

/// One command issuer's submission lifecycle.
///
/// `Invalid` and `Failed` are passed through on the way back to `Idle`; the
/// history keeps every state visited since creation.
#[derive(Debug)]
pub struct CommandRequest {
    draft: CommandDraft,
    state: CommandState,
    status: StatusLine,
    history: Vec<CommandState>,
}

impl CommandRequest {
    pub fn new(draft: CommandDraft) -> Self {
        Self::with_status_line(draft, StatusLine::new())
    }

    pub fn with_status_line(draft: CommandDraft, status: StatusLine) -> Self {
        Self {
            draft,
            state: CommandState::Idle,
            status,
            history: vec![CommandState::Idle],
        }
    }

    pub fn draft(&self) -> &CommandDraft {
        &self.draft
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn status_message(&self) -> Option<String> {
        self.status.message()
    }

    pub fn history(&self) -> &[CommandState] {
        &self.history
    }

    /// Replaces the draft being edited. Not allowed mid-submission.
    pub fn set_draft(&mut self, draft: CommandDraft) -> Result<(), WorkflowError> {
        self.expect_submittable("edit")?;
        self.draft = draft;
        Ok(())
    }

    fn transition(&mut self, next: CommandState) {
        log::debug!("command `{}`: {} -> {}", self.draft.command, self.state, next);
        self.state = next;
        self.history.push(next);
    }

    fn wrong_state(&self, action: &'static str) -> WorkflowError {
        WorkflowError::WrongState {
            action,
            state: self.state,
        }
    }

    fn expect_submittable(&self, action: &'static str) -> Result<(), WorkflowError> {
        if self.state.accepts_submit() {
            Ok(())
        } else {
            Err(self.wrong_state(action))
        }
    }

    /// Validates the draft and routes it: to `ValidAwaitingConfirmation` when
    /// the draft asks for confirmation, otherwise straight to `Sending`.
    pub fn submit(&mut self) -> Result<CommandState, WorkflowError> {
        self.expect_submittable("submit")?;
        self.transition(CommandState::Validating);

        if let Err(err) = CommandValidator::validate(&self.draft) {
            self.transition(CommandState::Invalid);
            self.status.set(err.to_string());
            self.transition(CommandState::Idle);
            return Err(err.into());
        }

        if self.draft.confirmation_required {
            self.transition(CommandState::ValidAwaitingConfirmation);
        } else {
            self.transition(CommandState::ValidReady);
            self.transition(CommandState::Sending);
        }
        Ok(self.state)
    }

    pub fn confirm(&mut self) -> Result<(), WorkflowError> {
        if self.state != CommandState::ValidAwaitingConfirmation {
            return Err(self.wrong_state("confirm"));
        }
        self.transition(CommandState::Sending);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        if self.state != CommandState::ValidAwaitingConfirmation {
            return Err(self.wrong_state("cancel"));
        }
        self.transition(CommandState::Idle);
        Ok(())
    }

    /// Hands the command to `transport` once. There is no retry.
    pub async fn dispatch<T: CommandTransport>(
        &mut self,
        transport: &T,
    ) -> Result<(), WorkflowError> {
        if self.state != CommandState::Sending {
            return Err(self.wrong_state("dispatch"));
        }
        self.status.set(SENDING_MESSAGE);
        let payload = self.draft.to_payload();

        match transport.send(&payload).await {
            Ok(()) => {
                self.transition(CommandState::Sent);
                self.status.set(SENT_MESSAGE);
                log::info!("command `{}` sent", payload.name);
                Ok(())
            }
            Err(err) => {
                let err = WorkflowError::from(err);
                log::warn!("command `{}` failed: {err}", payload.name);
                self.transition(CommandState::Failed);
                self.status.set(err.to_string());
                self.transition(CommandState::Idle);
                Err(err)
            }
        }
    }

    /// Submits and, when no confirmation is needed, dispatches in one call.
    /// Returns the state the request ends up in.
    pub async fn run<T: CommandTransport>(
        &mut self,
        transport: &T,
    ) -> Result<CommandState, WorkflowError> {
        if self.submit()? == CommandState::Sending {
            self.dispatch(transport).await?;
        }
        Ok(self.state)
    }
}
