//! Address bar and session history.

/// The query-string part of the page location.
///
/// Search strings are either empty or start with `?`.
pub trait AddressBar: Send {
    /// Returns the current search string.
    fn search(&self) -> String;

    /// Replaces the current history entry without navigating.
    fn replace(&mut self, search: &str);

    /// Pushes a new history entry.
    fn push(&mut self, search: &str);
}

/// In-memory history with back/forward, used by headless hosts and tests.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    path: String,
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryHistory {
    /// Creates a history with a single entry.
    pub fn new(path: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entries: vec![normalize(search.into())],
            cursor: 0,
        }
    }

    /// Path and search of the current entry.
    pub fn href(&self) -> String {
        format!("{}{}", self.path, self.search())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Steps back one entry. Returns `false` at the start of history.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Steps forward one entry. Returns `false` at the end of history.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/", "")
    }
}

impl AddressBar for MemoryHistory {
    fn search(&self) -> String {
        self.entries.get(self.cursor).cloned().unwrap_or_default()
    }

    fn replace(&mut self, search: &str) {
        let search = normalize(search.to_string());
        match self.entries.get_mut(self.cursor) {
            Some(entry) => *entry = search,
            None => self.entries.push(search),
        }
    }

    fn push(&mut self, search: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(normalize(search.to_string()));
        self.cursor = self.entries.len() - 1;
    }
}

fn normalize(search: String) -> String {
    if search.is_empty() || search == "?" {
        String::new()
    } else if search.starts_with('?') {
        search
    } else {
        format!("?{}", search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_navigate() {
        let mut history = MemoryHistory::new("/grid", "");
        history.push("?page=2");
        history.push("page=3");
        assert_eq!(history.search(), "?page=3");
        assert_eq!(history.href(), "/grid?page=3");

        assert!(history.back());
        assert_eq!(history.search(), "?page=2");
        assert!(history.back());
        assert_eq!(history.search(), "");
        assert!(!history.back());

        assert!(history.forward());
        assert!(history.forward());
        assert!(!history.forward());
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut history = MemoryHistory::default();
        history.push("?page=2");
        history.push("?page=3");
        history.back();
        history.push("?page=4");
        assert_eq!(history.entries(), ["", "?page=2", "?page=4"]);
    }

    #[test]
    fn test_replace_keeps_length() {
        let mut history = MemoryHistory::new("/", "?page=2");
        history.replace("?");
        assert_eq!(history.len(), 1);
        assert_eq!(history.search(), "");
    }
}
