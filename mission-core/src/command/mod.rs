pub mod status;
pub mod transport;
pub mod validator;
pub mod workflow;

pub use status::{StatusLine, STATUS_CLEAR_DELAY};
pub use transport::{CommandTransport, SimulatedTransport, SIMULATED_SEND_LATENCY};
pub use validator::{CommandValidator, ValidationError};
pub use workflow::{CommandRequest, CommandState, WorkflowError, SENDING_MESSAGE, SENT_MESSAGE};
