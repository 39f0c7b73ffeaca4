use textdrop_message_derive::Message;

/// Client asks to end its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Message)]
#[message(text = "exit", framed = true)]
pub struct Exit;
