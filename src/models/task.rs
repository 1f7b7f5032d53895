use std::fmt;

/// Independent operation slots.
///
/// Each slot can run concurrently with the others, but never with itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskSlot {
    LoadMain,
    LoadUnwanted,
    Separate,
    Export,
}

impl TaskSlot {
    pub const ALL: [TaskSlot; 4] = [
        TaskSlot::LoadMain,
        TaskSlot::LoadUnwanted,
        TaskSlot::Separate,
        TaskSlot::Export,
    ];

    /// Short label used for progress bars and log lines
    pub fn label(self) -> &'static str {
        match self {
            TaskSlot::LoadMain => "Load main list",
            TaskSlot::LoadUnwanted => "Load unwanted list",
            TaskSlot::Separate => "Separate",
            TaskSlot::Export => "Export result",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            TaskSlot::LoadMain => 0,
            TaskSlot::LoadUnwanted => 1,
            TaskSlot::Separate => 2,
            TaskSlot::Export => 3,
        }
    }
}

impl fmt::Display for TaskSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_unique() {
        let mut seen = [false; 4];
        for slot in TaskSlot::ALL {
            assert!(!seen[slot.index()]);
            seen[slot.index()] = true;
        }
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(TaskSlot::Export.to_string(), "Export result");
    }
}
