//! Core chat state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{ChatState, SessionContext, CHAT_FAILURE_MESSAGE};
pub use transition::{transition, TransitionError, TransitionResult};
