/// Answer to a confirmation prompt (quit, delete).
///
/// Only `Confirm` lets the guarded action proceed. A prompt that closes
/// without an answer is `Dismissed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
    Dismissed,
}

impl Decision {
    #[must_use]
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirm)
    }
}
