pub mod command;
pub mod layout;
pub mod library;
pub mod persistence;
pub mod store;
pub mod transform;

pub use command::{
    CommandRequest, CommandState, CommandTransport, CommandValidator, SimulatedTransport,
    StatusLine, ValidationError, WorkflowError,
};
pub use library::{LibraryError, ScreenEntry, ScreenLibrary};
pub use persistence::PersistenceAdapter;
pub use store::{ConfigStore, SettingsError, SettingsPatch, Snapshot, StoreError, SubscriptionId};
