//! In-memory item and skill template books.
//!
//! A book maps template nids to authored instances with unbound uids.
//! Fetching a template deep-copies every component, so no per-instance
//! state ever leaks between instances; `instantiate` additionally binds a
//! fresh uid from the game state. Unknown nids degrade to visible
//! placeholders rather than failing.

use std::collections::BTreeMap;

use tactics_core::{GameState, ItemOracle, ItemState, SkillOracle, SkillState};

/// Item template catalog.
#[derive(Clone, Debug, Default)]
pub struct ItemBook {
    templates: BTreeMap<String, ItemState>,
}

impl ItemBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template under its nid. Later registrations replace
    /// earlier ones.
    pub fn register(&mut self, template: ItemState) {
        self.templates.insert(template.nid.clone(), template);
    }

    pub fn with(mut self, template: ItemState) -> Self {
        self.register(template);
        self
    }

    /// Creates a bound instance: deep component copy plus a fresh uid.
    /// Unknown nids instantiate a placeholder.
    pub fn instantiate(&self, state: &mut GameState, nid: &str) -> ItemState {
        let mut item = self
            .template(nid)
            .unwrap_or_else(|| ItemState::placeholder(nid));
        item.uid = state.allocate_instance();
        item
    }
}

impl ItemOracle for ItemBook {
    fn template(&self, nid: &str) -> Option<ItemState> {
        self.templates.get(nid).cloned()
    }
}

/// Skill template catalog.
#[derive(Clone, Debug, Default)]
pub struct SkillBook {
    templates: BTreeMap<String, SkillState>,
}

impl SkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, template: SkillState) {
        self.templates.insert(template.nid.clone(), template);
    }

    pub fn with(mut self, template: SkillState) -> Self {
        self.register(template);
        self
    }

    /// Creates a bound instance with a fresh uid, placeholder on unknown nid.
    pub fn instantiate(&self, state: &mut GameState, nid: &str) -> SkillState {
        let mut skill = self
            .template(nid)
            .unwrap_or_else(|| SkillState::placeholder(nid));
        skill.uid = state.allocate_instance();
        skill
    }
}

impl SkillOracle for SkillBook {
    fn template(&self, nid: &str) -> Option<SkillState> {
        self.templates.get(nid).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Uses;

    #[test]
    fn instances_never_share_component_state() {
        let book = ItemBook::new().with(
            ItemState::new("potion", "Potion").with_component(Box::new(Uses::new(3))),
        );
        let mut state = GameState::new(0);

        let mut first = book.instantiate(&mut state, "potion");
        let second = book.instantiate(&mut state, "potion");
        assert_ne!(first.uid, second.uid);

        first.components[0].set_charges(0);
        assert_eq!(second.components[0].charges(), Some(3));
        // The template itself is untouched too.
        assert_eq!(
            book.template("potion").unwrap().components[0].charges(),
            Some(3)
        );
    }

    #[test]
    fn unknown_nid_instantiates_a_placeholder() {
        let book = ItemBook::new();
        let mut state = GameState::new(0);
        let item = book.instantiate(&mut state, "excalibur");
        assert_eq!(item.nid, "excalibur");
        assert!(item.components.is_empty());
        assert!(item.name.contains("???"));
    }
}
