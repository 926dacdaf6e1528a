use std::collections::HashSet;

use super::value::{OptionAccessors, OptionId};

/// Options collected across the pages of one dropdown session.
///
/// Unique by identity, in first-seen order. Page 0 replaces the set; later
/// pages only contribute identities not already present.
#[derive(Debug, Clone)]
pub struct AccumulatedOptions<T> {
    items: Vec<T>,
    ids: Vec<OptionId>,
    seen: HashSet<OptionId>,
}

impl<T> Default for AccumulatedOptions<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ids: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T> AccumulatedOptions<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn ids(&self) -> &[OptionId] {
        &self.ids
    }
}

impl<T: Clone> AccumulatedOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a loaded page. Returns how many options were added.
    pub fn merge(&mut self, page: u32, items: &[T], accessors: &OptionAccessors<T>) -> usize {
        if page == 0 {
            self.clear();
        }
        let before = self.items.len();
        for item in items {
            let id = accessors.value(item);
            if self.seen.insert(id.clone()) {
                self.ids.push(id);
                self.items.push(item.clone());
            }
        }
        self.items.len() - before
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.seen.clear();
    }


    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &OptionId) -> bool {
        self.seen.contains(id)
    }

    pub fn position(&self, id: &OptionId) -> Option<usize> {
        self.ids.iter().position(|candidate| candidate == id)
    }

    pub fn get(&self, id: &OptionId) -> Option<&T> {
        self.position(id).map(|index| &self.items[index])
    }

    pub fn get_index(&self, index: usize) -> Option<(&OptionId, &T)> {
        Some((self.ids.get(index)?, self.items.get(index)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Opt {
        id: i64,
        name: &'static str,
    }

    fn opt(id: i64, name: &'static str) -> Opt {
        Opt { id, name }
    }

    fn accessors() -> OptionAccessors<Opt> {
        OptionAccessors::new(|o: &Opt| o.name.to_string(), |o: &Opt| o.id.into())
    }

    #[test]
    fn test_overlapping_pages_keep_first_seen_order() {
        let accessors = accessors();
        let mut options = AccumulatedOptions::new();

        assert_eq!(options.merge(0, &[opt(1, "a"), opt(2, "b"), opt(3, "c")], &accessors), 3);
        assert_eq!(options.merge(1, &[opt(3, "c2"), opt(4, "d"), opt(2, "b2")], &accessors), 1);
        assert_eq!(options.merge(2, &[opt(5, "e"), opt(5, "e-dup")], &accessors), 1);

        let labels: Vec<&str> = options.items().iter().map(|o| o.name).collect();
        assert_eq!(labels, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(options.position(&OptionId::Int(4)), Some(3));
    }

    #[test]
    fn test_page_zero_replaces() {
        let accessors = accessors();
        let mut options = AccumulatedOptions::new();
        options.merge(0, &[opt(1, "alpha"), opt(2, "beta")], &accessors);
        options.merge(1, &[opt(3, "gamma")], &accessors);

        options.merge(0, &[opt(9, "zeta")], &accessors);
        assert_eq!(options.len(), 1);
        assert!(!options.contains(&OptionId::Int(1)));
        assert_eq!(options.get(&OptionId::Int(9)).map(|o| o.name), Some("zeta"));
    }

    #[test]
    fn test_empty_page_zero_clears() {
        let accessors = accessors();
        let mut options = AccumulatedOptions::new();
        options.merge(0, &[opt(1, "a")], &accessors);
        assert_eq!(options.merge(0, &[], &accessors), 0);
        assert!(options.is_empty());
    }
}
