use textdrop_message_derive::Message;

/// Reply to [`InvalidCommand`](super::invalid_command::InvalidCommand).
/// Unframed, like [`ConnectionClosed`](super::connection_closed::ConnectionClosed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Message)]
#[message(text = "disconnect")]
pub struct Disconnect;
