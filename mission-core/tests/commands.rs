use link::TransportError;
use mission_core::command::{
    CommandRequest, CommandState, CommandTransport, CommandValidator, SimulatedTransport,
    ValidationError, WorkflowError, SENT_MESSAGE,
};
use screen::{CommandDraft, CommandParameter, CommandPayload, ValidationRule};
use std::sync::Mutex;
use std::time::Duration;

fn draft(command: &str) -> CommandDraft {
    CommandDraft {
        command: command.to_string(),
        ..CommandDraft::default()
    }
}

fn param(key: &str, value: &str, required: bool, pattern: Option<&str>) -> CommandParameter {
    CommandParameter {
        key: key.to_string(),
        value: value.to_string(),
        rule: ValidationRule {
            required,
            pattern: pattern.map(str::to_string),
            error_message: None,
        },
    }
}

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<CommandPayload>>,
}

impl CommandTransport for RecordingTransport {
    async fn send(&self, payload: &CommandPayload) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

struct RejectingTransport;

impl CommandTransport for RejectingTransport {
    async fn send(&self, _payload: &CommandPayload) -> Result<(), TransportError> {
        Err(TransportError::Rejected("interlock engaged".to_string()))
    }
}

#[test]
fn blank_command_name_is_rejected_first() {
    let mut bad = draft("   ");
    bad.is_hazardous = true;
    assert_eq!(
        CommandValidator::validate(&bad),
        Err(ValidationError::MissingCommand)
    );
    assert_eq!(
        ValidationError::MissingCommand.to_string(),
        "Command name is required."
    );
}

#[test]
fn hazardous_gate_needs_six_digits() {
    for code in ["", "12345", "1234567", "12a456", " 12345", "１２３４５６"] {
        let mut d = draft("PURGE");
        d.is_hazardous = true;
        d.two_factor_code = code.to_string();
        assert_eq!(
            CommandValidator::validate(&d),
            Err(ValidationError::InvalidTwoFactorCode),
            "code {code:?}"
        );
    }
    let mut ok = draft("PURGE");
    ok.is_hazardous = true;
    ok.two_factor_code = "004213".to_string();
    assert_eq!(CommandValidator::validate(&ok), Ok(()));

    let mut not_hazardous = draft("VENT");
    not_hazardous.two_factor_code = "nope".to_string();
    assert_eq!(CommandValidator::validate(&not_hazardous), Ok(()));
}

#[test]
fn first_failing_parameter_wins() {
    let mut d = draft("SET");
    d.parameters = vec![
        param("mode", "auto", true, None),
        param("rate", "  ", true, None),
        param("target", "abc", false, Some(r"^\d+$")),
    ];
    let err = CommandValidator::validate(&d).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingValue {
            key: "rate".to_string(),
            message: "Value for \"rate\" is required.".to_string(),
        }
    );
}

#[test]
fn custom_error_message_and_pattern_failures() {
    let mut d = draft("SET");
    let mut target = param("target", "abc", false, Some(r"^\d+$"));
    target.rule.error_message = Some("Target must be numeric.".to_string());
    d.parameters = vec![target];
    assert_eq!(
        CommandValidator::validate(&d).unwrap_err().to_string(),
        "Target must be numeric."
    );

    d.parameters = vec![param("target", "abc", false, Some(r"^\d+$"))];
    assert_eq!(
        CommandValidator::validate(&d).unwrap_err().to_string(),
        "Value for \"target\" does not match pattern."
    );

    d.parameters = vec![param("target", "abc", false, Some("("))];
    assert_eq!(
        CommandValidator::validate(&d).unwrap_err().to_string(),
        "Invalid regex pattern in \"target\"."
    );
}

#[test]
fn patterns_search_anywhere_in_the_value() {
    let mut d = draft("SET");
    d.parameters = vec![param("level", "level-42", false, Some(r"\d+"))];
    assert_eq!(CommandValidator::validate(&d), Ok(()));

    d.parameters = vec![param("level", "", false, Some(r"\d+"))];
    assert!(matches!(
        CommandValidator::validate(&d),
        Err(ValidationError::PatternMismatch { .. })
    ));

    d.parameters = vec![param("note", "", false, Some(""))];
    assert_eq!(CommandValidator::validate(&d), Ok(()));
}

#[tokio::test(start_paused = true)]
async fn arm_is_sent_without_confirmation() {
    let mut request = CommandRequest::new(draft("ARM"));

    let state = request
        .run(&SimulatedTransport::default())
        .await
        .expect("send ARM");

    assert_eq!(state, CommandState::Sent);
    assert_eq!(request.status_message().as_deref(), Some(SENT_MESSAGE));
    assert_eq!(
        request.history(),
        &[
            CommandState::Idle,
            CommandState::Validating,
            CommandState::ValidReady,
            CommandState::Sending,
            CommandState::Sent,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn purge_with_bad_code_returns_to_idle() {
    let mut d = draft("PURGE");
    d.is_hazardous = true;
    d.two_factor_code = "12a456".to_string();
    let transport = RecordingTransport::default();
    let mut request = CommandRequest::new(d);

    let err = request.run(&transport).await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Validation(ValidationError::InvalidTwoFactorCode)
    ));
    assert_eq!(request.state(), CommandState::Idle);
    assert_eq!(
        request.status_message().as_deref(),
        Some("Hazardous commands require a valid 6-digit 2FA code.")
    );
    assert!(request.history().contains(&CommandState::Invalid));
    assert!(transport.sent.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn confirmation_gates_dispatch() {
    let mut d = draft("IGNITE");
    d.confirmation_required = true;
    let transport = RecordingTransport::default();
    let mut request = CommandRequest::new(d);

    assert_eq!(
        request.submit().expect("valid"),
        CommandState::ValidAwaitingConfirmation
    );
    assert!(matches!(
        request.dispatch(&transport).await,
        Err(WorkflowError::WrongState { .. })
    ));
    assert!(transport.sent.lock().unwrap().is_empty());

    request.confirm().expect("confirm");
    assert_eq!(request.state(), CommandState::Sending);
    request.dispatch(&transport).await.expect("dispatch");
    assert_eq!(request.state(), CommandState::Sent);
    assert_eq!(transport.sent.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_returns_to_idle_without_sending() {
    let mut d = draft("IGNITE");
    d.confirmation_required = true;
    let transport = RecordingTransport::default();
    let mut request = CommandRequest::new(d);

    let state = request.run(&transport).await.expect("valid");
    assert_eq!(state, CommandState::ValidAwaitingConfirmation);
    request.cancel().expect("cancel");

    assert_eq!(request.state(), CommandState::Idle);
    assert!(request.confirm().is_err());
    assert!(transport.sent.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transport_failure_is_reported_once() {
    let mut request = CommandRequest::new(draft("VENT"));

    let err = request.run(&RejectingTransport).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Transport(_)));
    assert_eq!(request.state(), CommandState::Idle);
    assert_eq!(
        request.status_message().as_deref(),
        Some("Failed to send command: rejected: interlock engaged")
    );
    let failed = request
        .history()
        .iter()
        .filter(|s| **s == CommandState::Failed)
        .count();
    assert_eq!(failed, 1);
}

#[tokio::test(start_paused = true)]
async fn status_clears_after_delay() {
    let mut request = CommandRequest::new(draft(""));
    assert!(request.submit().is_err());
    assert_eq!(
        request.status_message().as_deref(),
        Some("Command name is required.")
    );

    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert!(request.status_message().is_some());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(request.status_message(), None);
}

#[tokio::test(start_paused = true)]
async fn newer_status_restarts_clear_timer() {
    let mut request = CommandRequest::new(draft(""));
    assert!(request.submit().is_err());
    tokio::time::sleep(Duration::from_secs(2)).await;

    request
        .set_draft(draft("ARM"))
        .expect("editable while idle");
    request
        .run(&SimulatedTransport::default())
        .await
        .expect("sent");
    // one second of simulated latency has passed since the edit
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(request.status_message().as_deref(), Some(SENT_MESSAGE));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(request.status_message(), None);
}

#[tokio::test(start_paused = true)]
async fn payload_carries_draft_fields() {
    let mut d = draft("  PURGE ");
    d.is_hazardous = true;
    d.two_factor_code = "123456".to_string();
    d.parameters = vec![param("valve", "V2", true, None)];
    let transport = RecordingTransport::default();
    let mut request = CommandRequest::new(d);

    request.run(&transport).await.expect("sent");

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let json = serde_json::to_value(&sent[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "name": "PURGE",
            "code": "123456",
            "hazardous": true,
            "params": [{"key": "valve", "value": "V2"}]
        })
    );
}
