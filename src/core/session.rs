use std::collections::VecDeque;

use crate::core::message::Message;

/// Conversation state for one run of the program.
///
/// Owns the append-only message log, the busy flag, and the greeting
/// dismissal bit. All mutation happens through these methods, on the UI
/// loop only; the request task never touches this state directly and hands
/// its result back over a channel instead.
pub struct ChatSession {
    messages: VecDeque<Message>,
    busy: bool,
    greeting_dismissed: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
            busy: false,
            greeting_dismissed: false,
        }
    }

    pub fn messages(&self) -> &VecDeque<Message> {
        &self.messages
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push_back(message);
    }

    /// True while a completion request is outstanding.
    ///
    /// Overlapping requests each set and clear this independently, so after
    /// the first of several concurrent calls settles the flag reads false
    /// even though others are still in flight. The flag tracks the most
    /// recently settled call, not an in-flight count.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Hide the greeting banner for the rest of the session.
    pub fn dismiss_greeting(&mut self) {
        self.greeting_dismissed = true;
    }

    pub fn greeting_dismissed(&self) -> bool {
        self.greeting_dismissed
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
