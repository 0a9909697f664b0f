/// Position within an immutable record sequence. Moving past either end is a
/// no-op, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigator {
    position: usize,
    len: usize,
}

impl Navigator {
    /// Navigator at the first record of a sequence of `len` records.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { position: 0, len }
    }

    #[must_use]
    pub fn position(self) -> usize {
        self.position
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    fn last(self) -> usize {
        self.len.saturating_sub(1)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self {
            position: (self.position + 1).min(self.last()),
            ..self
        }
    }

    #[must_use]
    pub fn previous(self) -> Self {
        Self {
            position: self.position.saturating_sub(1),
            ..self
        }
    }

    /// Move to `index`, clamped into the sequence.
    #[must_use]
    pub fn jump_to(self, index: usize) -> Self {
        Self {
            position: index.min(self.last()),
            ..self
        }
    }

    /// Re-apply both bounds, e.g. after the position was set from outside.
    #[must_use]
    pub fn clamp(self) -> Self {
        self.jump_to(self.position)
    }

    /// Start over on a new sequence.
    #[must_use]
    pub fn reset(len: usize) -> Self {
        Self::new(len)
    }

    /// One-based "current / total" label.
    #[must_use]
    pub fn progress_label(self) -> String {
        if self.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.position + 1, self.len)
        }
    }
}
