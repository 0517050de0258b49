use std::any::{type_name, TypeId};

use super::types::short_type_name;
use crate::mvi::BusinessState;

/// One registered destination state type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    state_type: TypeId,
    state_name: &'static str,
    label: &'static str,
}

impl Destination {
    pub fn of<S: BusinessState>(label: &'static str) -> Self {
        Self {
            state_type: TypeId::of::<S>(),
            state_name: type_name::<S>(),
            label,
        }
    }

    pub fn state_type(&self) -> TypeId {
        self.state_type
    }

    pub fn state_name(&self) -> &'static str {
        short_type_name(self.state_name)
    }

    /// Registrant label, usually the view type's name.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// Ordered destination registry. Matching is first-match-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destinations {
    entries: Vec<Destination>,
}

impl Destinations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: BusinessState>(&mut self, label: &'static str) {
        self.push(Destination::of::<S>(label));
    }

    pub fn push(&mut self, destination: Destination) {
        self.entries.push(destination);
    }

    pub fn contains(&self, state_type: TypeId) -> bool {
        self.entries.iter().any(|entry| entry.state_type == state_type)
    }

    /// The first registered destination for `state_type`.
    pub fn match_route(&self, state_type: TypeId) -> Option<&Destination> {
        self.entries.iter().find(|entry| entry.state_type == state_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
