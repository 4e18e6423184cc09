//! Chatbot core: pure session state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    AttachedFile, ErrorKind, Message, MessageId, RequestId, Sender, SessionState,
    DOTS_INTERVAL_MS, REQUEST_TIMEOUT_MS, REVEAL_INTERVAL_MS, SLOW_CONNECTION_AFTER_MS,
};
pub use update::update;
pub use view_model::{MessageView, SessionViewModel, GREETING, INPUT_PLACEHOLDER};
