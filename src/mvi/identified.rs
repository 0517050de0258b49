//! Ordered collections of identified child states.

use std::fmt;
use std::hash::Hash;

use super::state::StateRef;

/// A state with a stable identity inside a collection.
pub trait Identified {
    type Id: Clone + Eq + Hash + fmt::Debug + 'static;

    fn id(&self) -> Self::Id;
}

/// Ordered child states addressed by id.
pub struct IdentifiedVec<S> {
    items: Vec<StateRef<S>>,
}

impl<S> Default for IdentifiedVec<S> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<S> Clone for IdentifiedVec<S> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<S: Identified> fmt::Debug for IdentifiedVec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

impl<S: Identified> FromIterator<S> for IdentifiedVec<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut items = Self::default();
        for state in iter {
            items.push(state);
        }
        items
    }
}

impl<S: Identified> IdentifiedVec<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateRef<S>> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<S::Id> {
        self.items.iter().map(|item| item.borrow().id()).collect()
    }

    pub fn get(&self, id: &S::Id) -> Option<&StateRef<S>> {
        self.items.iter().find(|item| item.borrow().id() == *id)
    }

    fn position(&self, id: &S::Id) -> Option<usize> {
        self.items.iter().position(|item| item.borrow().id() == *id)
    }

    /// Append `state`, or replace the element with the same id in place.
    pub fn push(&mut self, state: S) -> StateRef<S> {
        let state = StateRef::new(state);
        let id = state.borrow().id();
        match self.position(&id) {
            Some(index) => self.items[index] = state.clone(),
            None => self.items.push(state.clone()),
        }
        state
    }

    /// Insert at `index`, removing any existing element with the same id first.
    pub fn insert(&mut self, index: usize, state: S) -> StateRef<S> {
        let state = StateRef::new(state);
        let id = state.borrow().id();
        if let Some(existing) = self.position(&id) {
            self.items.remove(existing);
        }
        let index = index.min(self.items.len());
        self.items.insert(index, state.clone());
        state
    }

    pub fn remove(&mut self, id: &S::Id) -> Option<StateRef<S>> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&S) -> bool) {
        self.items.retain(|item| keep(&item.borrow()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Row {
        id: u32,
        title: &'static str,
    }

    impl Identified for Row {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    #[test]
    fn push_replaces_same_id_in_place() {
        let mut rows: IdentifiedVec<Row> = [Row { id: 1, title: "a" }, Row { id: 2, title: "b" }]
            .into_iter()
            .collect();

        rows.push(Row { id: 1, title: "a2" });

        assert_eq!(rows.ids(), vec![1, 2]);
        assert_eq!(rows.get(&1).map(|r| r.borrow().title), Some("a2"));
    }

    #[test]
    fn insert_and_remove_by_id() {
        let mut rows = IdentifiedVec::new();
        rows.push(Row { id: 1, title: "a" });
        rows.insert(0, Row { id: 3, title: "c" });
        assert_eq!(rows.ids(), vec![3, 1]);

        let removed = rows.remove(&3);
        assert!(removed.is_some());
        assert!(rows.remove(&3).is_none());
        assert_eq!(rows.len(), 1);
    }
}
