use textdrop_message_derive::Message;

/// Sent in place of any input line the client does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Message)]
#[message(text = "invalid command", framed = true)]
pub struct InvalidCommand;
