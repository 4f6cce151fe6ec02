use std::cell::RefCell;

/// A single slot holding the last error to show to the user.
///
/// A new error replaces one that was not cleared yet. Errors never
/// expire, they stay until [`ErrorChannel::clear`] is called.
#[derive(Debug, Default)]
pub struct ErrorChannel {
    message: RefCell<Option<String>>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, message: impl Into<String>) {
        *self.message.borrow_mut() = Some(message.into());
    }

    /// Returns `true` if there was an error to clear.
    pub fn clear(&self) -> bool {
        self.message.borrow_mut().take().is_some()
    }

    pub fn current(&self) -> Option<String> {
        self.message.borrow().clone()
    }
}
