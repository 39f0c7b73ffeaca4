use textdrop_message_derive::Message;

/// Reply to [`Exit`](super::exit::Exit). Travels without a terminator; the
/// server closes the connection right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Message)]
#[message(text = "connection closed")]
pub struct ConnectionClosed;
