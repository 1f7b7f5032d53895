use std::collections::HashSet;
use std::collections::hash_set;

/// Which characters end a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreaks {
    /// List files: `\n`, `\r\n` and a bare `\r`
    File,
    /// Pasted text: the file breaks plus vertical tab, form feed, the
    /// `\x1c`..`\x1e` separators, NEL and the Unicode line/paragraph separators
    Text,
}

impl LineBreaks {
    fn is_break(self, c: char) -> bool {
        match self {
            LineBreaks::File => matches!(c, '\n' | '\r'),
            LineBreaks::Text => matches!(
                c,
                '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
            ),
        }
    }
}

/// Iterator over the lines of a text, see [`split_lines`].
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: &'a str,
    breaks: LineBreaks,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let breaks = self.breaks;
        let Some((pos, c)) = self.rest.char_indices().find(|(_, c)| breaks.is_break(*c)) else {
            let line = self.rest;
            self.rest = "";
            return Some(line);
        };

        let line = &self.rest[..pos];
        let mut next = pos + c.len_utf8();
        if c == '\r' && self.rest[next..].starts_with('\n') {
            next += 1;
        }
        self.rest = &self.rest[next..];
        Some(line)
    }
}

/// Split `text` into lines. A trailing break does not start an empty last line.
///
/// `\r\n` always counts as a single break.
pub fn split_lines(text: &str, breaks: LineBreaks) -> Lines<'_> {
    Lines { rest: text, breaks }
}

fn is_padding(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\x1c'..='\x1f' | '\u{feff}')
}

/// Trim a raw line and reject it when nothing is left.
///
/// Every way of building an [`EmailSet`] goes through this rule. Surrounding
/// whitespace and a stray byte order mark are dropped. An entry that still holds
/// a line break is rejected, as it could not be written back as one line.
pub fn normalize_line(line: &str) -> Option<&str> {
    let trimmed = line.trim_matches(is_padding);
    if trimmed.is_empty() || trimmed.contains(['\n', '\r']) {
        None
    } else {
        Some(trimmed)
    }
}

/// A deduplicated set of email addresses.
///
/// Membership is exact: comparison is case-sensitive and no email syntax
/// validation is performed. Iteration order is unspecified; use [`EmailSet::sorted`]
/// when a stable byte-wise order is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailSet {
    entries: HashSet<String>,
}

impl EmailSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashSet::with_capacity(capacity),
        }
    }

    /// Parse pasted text: split on any [`LineBreaks::Text`] break, trim, drop blanks, dedup.
    pub fn parse(text: &str) -> Self {
        split_lines(text, LineBreaks::Text).collect()
    }

    /// Parse the contents of a list file: like [`parse`](Self::parse), but only
    /// `\n`, `\r\n` and `\r` end a line.
    pub fn parse_file(text: &str) -> Self {
        split_lines(text, LineBreaks::File).collect()
    }

    /// Collect entries that are already normalized (taken from another set).
    fn from_normalized<'a>(entries: impl Iterator<Item = &'a String>) -> Self {
        Self {
            entries: entries.cloned().collect(),
        }
    }

    /// Insert an entry after normalizing it.
    ///
    /// Returns `true` only when a new, non-blank entry was added.
    pub fn insert(&mut self, entry: &str) -> bool {
        match normalize_line(entry) {
            Some(email) if !self.entries.contains(email) => self.entries.insert(email.to_string()),
            _ => false,
        }
    }

    fn insert_owned(&mut self, entry: String) -> bool {
        let Some(email) = normalize_line(&entry) else {
            return false;
        };
        if email.len() == entry.len() {
            return self.entries.insert(entry);
        }
        let email = email.to_string();
        self.entries.insert(email)
    }

    pub fn contains(&self, email: &str) -> bool {
        self.entries.contains(email)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.entries.iter()
    }

    /// Entries in lexicographic (byte-wise) order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.entries.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
    }

    pub fn union(&self, other: &EmailSet) -> EmailSet {
        let (larger, smaller) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut entries = larger.entries.clone();
        entries.extend(smaller.entries.iter().cloned());
        EmailSet { entries }
    }

    pub fn difference(&self, other: &EmailSet) -> EmailSet {
        Self::from_normalized(self.entries.iter().filter(|email| !other.contains(email)))
    }

    pub fn intersection(&self, other: &EmailSet) -> EmailSet {
        Self::from_normalized(self.entries.iter().filter(|email| other.contains(email)))
    }

    pub fn is_subset(&self, other: &EmailSet) -> bool {
        self.entries.is_subset(&other.entries)
    }

    pub fn is_disjoint(&self, other: &EmailSet) -> bool {
        self.entries.is_disjoint(&other.entries)
    }
}

impl FromIterator<String> for EmailSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = EmailSet::new();
        for entry in iter {
            set.insert_owned(entry);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for EmailSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = EmailSet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

impl<'a> IntoIterator for &'a EmailSet {
    type Item = &'a String;
    type IntoIter = hash_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line("  a@x.com\t"), Some("a@x.com"));
        assert_eq!(normalize_line("a@x.com\r"), Some("a@x.com"));
        assert_eq!(normalize_line("   "), None);
        assert_eq!(normalize_line(""), None);
    }

    #[test]
    fn test_parse_trims_dedups_and_drops_blanks() {
        let set = EmailSet::parse("a@x.com\n\n  b@x.com  \r\na@x.com\n   \n");
        assert_eq!(set.len(), 2);
        assert!(set.contains("a@x.com"));
        assert!(set.contains("b@x.com"));
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let set = EmailSet::parse("A@x.com");
        assert!(set.contains("A@x.com"));
        assert!(!set.contains("a@x.com"));
    }

    #[test]
    fn test_insert_rejects_blank_and_duplicates() {
        let mut set = EmailSet::new();
        assert!(set.insert(" a@x.com "));
        assert!(!set.insert("a@x.com"));
        assert!(!set.insert("   "));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_sorted_is_bytewise() {
        let set: EmailSet = ["b@x.com", "B@x.com", "a@x.com"].into_iter().collect();
        assert_eq!(set.sorted(), vec!["B@x.com", "a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_set_algebra() {
        let left: EmailSet = ["a", "b", "c"].into_iter().collect();
        let right: EmailSet = ["b", "d"].into_iter().collect();

        assert_eq!(left.union(&right).len(), 4);
        assert_eq!(left.difference(&right).sorted(), vec!["a", "c"]);
        assert_eq!(left.intersection(&right).sorted(), vec!["b"]);
        assert!(left.intersection(&right).is_subset(&left));
        assert!(left.difference(&right).is_disjoint(&right));
    }

    #[test]
    fn test_split_file_lines() {
        let lines: Vec<&str> = split_lines("a\rb\r\nc\nd\r", LineBreaks::File).collect();
        assert_eq!(lines, vec!["a", "b", "c", "d"]);

        let blank: Vec<&str> = split_lines("\n\r\n", LineBreaks::File).collect();
        assert_eq!(blank, vec!["", ""]);
        assert_eq!(split_lines("", LineBreaks::File).count(), 0);
    }

    #[test]
    fn test_file_lines_keep_unicode_separators() {
        let lines: Vec<&str> = split_lines("a\u{2028}b\x0cc", LineBreaks::File).collect();
        assert_eq!(lines, vec!["a\u{2028}b\x0cc"]);
    }

    #[test]
    fn test_split_text_lines() {
        let text = "a\u{2028}b\u{2029}c\x0bd\x0ce\x1cf\x1dg\x1eh\u{85}i\rj";
        let lines: Vec<&str> = split_lines(text, LineBreaks::Text).collect();
        assert_eq!(lines, vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
    }

    #[test]
    fn test_parse_bare_carriage_returns() {
        let set = EmailSet::parse_file("a@x.com\rb@x.com\rc@x.com\r");
        assert_eq!(set.sorted(), vec!["a@x.com", "b@x.com", "c@x.com"]);

        let pasted = EmailSet::parse("a@x.com\rb@x.com");
        assert_eq!(pasted.sorted(), vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_parse_unicode_line_separator_in_paste() {
        let set = EmailSet::parse("a@x.com\u{2028}b@x.com\u{2029}");
        assert_eq!(set.sorted(), vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_insert_rejects_embedded_line_break() {
        let mut set = EmailSet::new();
        assert!(!set.insert("b@x.com\nc@x.com"));
        assert!(!set.insert("b@x.com\rc@x.com"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_collect_owned_strings_normalizes() {
        let set: EmailSet = [" a@x.com ", "", "b@x.com\nc@x.com", "\u{feff}d@x.com"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(set.sorted(), vec!["a@x.com", "d@x.com"]);
    }
}
