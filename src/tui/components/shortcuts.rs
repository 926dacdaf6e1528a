//! Declarative builder for TUI shortcuts

use super::Shortcut;

/// Builder for creating shortcut lists with common patterns
#[derive(Default)]
pub struct ShortcutsBuilder {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrow keys, their Ctrl equivalents and paging
    pub fn with_navigation(mut self) -> Self {
        self.shortcuts.push(Shortcut::new("Up/Down", "Move"));
        self.shortcuts.push(Shortcut::new("C-p/C-n", "Move"));
        self.shortcuts.push(Shortcut::new("PgUp/PgDn", "Page Up/Dn"));
        self
    }

    /// Type to search, Backspace to edit
    pub fn with_search(mut self) -> Self {
        self.shortcuts.push(Shortcut::new("type", "Search"));
        self
    }

    /// Esc to cancel
    pub fn with_cancel(mut self) -> Self {
        self.shortcuts.push(Shortcut::new("Esc", "Cancel"));
        self
    }

    /// Add a single custom shortcut
    pub fn add(mut self, key: &str, description: &str) -> Self {
        self.shortcuts.push(Shortcut::new(key, description));
        self
    }

    /// Build the shortcuts vector
    pub fn build(self) -> Vec<Shortcut> {
        self.shortcuts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_shortcuts() {
        let shortcuts = ShortcutsBuilder::new().with_navigation().build();

        assert_eq!(shortcuts.len(), 3);
        assert!(shortcuts.iter().any(|s| s.key == "Up/Down"));
        assert!(shortcuts.iter().any(|s| s.key == "PgUp/PgDn"));
    }

    #[test]
    fn test_empty_shortcuts() {
        let shortcuts = ShortcutsBuilder::new().build();

        assert_eq!(shortcuts.len(), 0);
    }
}
