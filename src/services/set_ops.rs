//! Pure set computations: combiner, difference engine and preview calculator.
//!
//! None of these perform I/O or touch application state. [`separate`] runs on a
//! worker because the main set may hold millions of entries; [`combine`] and
//! [`preview`] run synchronously on the caller's thread.

use crate::models::EmailSet;

/// Union of the parsed pasted text and the unwanted set loaded from a file.
///
/// `pasted_text` follows the loader's entry rule (trim, drop blanks, dedup), but
/// also breaks lines on the Unicode separators a text widget may hand over (see
/// [`LineBreaks::Text`](crate::models::LineBreaks::Text)). An absent `unwanted`
/// set counts as empty.
pub fn combine(pasted_text: &str, unwanted: Option<&EmailSet>) -> EmailSet {
    let pasted = EmailSet::parse(pasted_text);
    match unwanted {
        Some(unwanted) if !unwanted.is_empty() => pasted.union(unwanted),
        _ => pasted,
    }
}

/// `main \ unwanted`, in one pass over the main set.
///
/// Defined for empty inputs too: an empty `unwanted` set returns `main` unchanged.
/// Non-emptiness is a caller-level validation, see
/// [`SeparatorController::separate`](crate::app::SeparatorController::separate).
pub fn separate(main: &EmailSet, unwanted: &EmailSet) -> EmailSet {
    if unwanted.is_empty() {
        return main.clone();
    }
    main.difference(unwanted)
}

/// Read-only split of the combined unwanted set against the main set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    /// Unwanted entries present in the main set
    pub to_remove: EmailSet,
    /// Unwanted entries absent from the main set
    pub not_found: EmailSet,
    /// Size of the main set the preview was computed against
    pub main_list_size: usize,
}

/// Sorted, truncated view of one preview list for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedList {
    pub shown: Vec<String>,
    pub remaining: usize,
}

impl TruncatedList {
    fn from_set(set: &EmailSet, limit: usize) -> Self {
        let sorted = set.sorted();
        let remaining = sorted.len().saturating_sub(limit);
        Self {
            shown: sorted.into_iter().take(limit).map(str::to_string).collect(),
            remaining,
        }
    }
}

impl Preview {
    /// First `limit` entries of each list, in sorted order, plus how many were left out.
    pub fn truncated(&self, limit: usize) -> (TruncatedList, TruncatedList) {
        (
            TruncatedList::from_set(&self.to_remove, limit),
            TruncatedList::from_set(&self.not_found, limit),
        )
    }
}

/// Compute which unwanted entries would be removed and which are not in the main set.
///
/// With no main set, nothing is removed and every unwanted entry is "not found".
/// The two returned sets are disjoint and their union is `unwanted`.
pub fn preview(main: Option<&EmailSet>, unwanted: &EmailSet) -> Preview {
    let Some(main) = main else {
        return Preview {
            to_remove: EmailSet::new(),
            not_found: unwanted.clone(),
            main_list_size: 0,
        };
    };

    let mut to_remove = EmailSet::new();
    let mut not_found = EmailSet::new();
    for email in unwanted {
        if main.contains(email) {
            to_remove.insert(email);
        } else {
            not_found.insert(email);
        }
    }

    Preview {
        to_remove,
        not_found,
        main_list_size: main.len(),
    }
}
