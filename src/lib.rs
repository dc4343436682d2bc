//! Helpdesk chat client
//!
//! A client-side conversation engine for an AI helpdesk: users ask questions,
//! a remote service answers, and answers can be liked or disliked. The chat
//! flow is a pure state machine; a session runtime owns the conversation and
//! performs the HTTP calls.

pub mod client;
pub mod config;
pub mod conversation;
pub mod format;
pub mod session;
pub mod state_machine;
