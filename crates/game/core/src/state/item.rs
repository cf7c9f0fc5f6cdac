//! Item instances and their persistence form.
//!
//! An item is an ordered list of components plus identity. Instances are
//! created from templates by deep-copying every component (components carry
//! per-instance mutable state such as remaining charges). Persistence goes
//! through [`SavedItem`]: component state is flattened to values and
//! rebuilt through the component catalog on restore.

use tracing::warn;

use crate::component::{Component, ComponentRegistry, ComponentValue};

use super::{InstanceId, UnitId};

/// One item instance.
#[derive(Clone, Debug)]
pub struct ItemState {
    pub uid: InstanceId,
    /// Template nid. Stable lookup key; placeholders keep the unknown nid
    /// so a later content fix re-resolves them.
    pub nid: String,
    pub name: String,
    /// Holding unit. Weak back-reference for lookup only.
    pub owner: Option<UnitId>,
    pub droppable: bool,
    pub components: Vec<Box<dyn Component>>,
}

impl ItemState {
    pub fn new(nid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: InstanceId::UNBOUND,
            nid: nid.into(),
            name: name.into(),
            owner: None,
            droppable: false,
            components: Vec::new(),
        }
    }

    /// Visible stand-in for an item whose template no longer exists.
    ///
    /// A save file referencing since-deleted content must still load; the
    /// placeholder has no components, so every hook falls back to its
    /// documented default.
    pub fn placeholder(nid: impl Into<String>) -> Self {
        let nid = nid.into();
        warn!(nid = %nid, "unknown item template, constructing placeholder");
        Self {
            uid: InstanceId::UNBOUND,
            name: format!("??? ({nid})"),
            nid,
            owner: None,
            droppable: false,
            components: Vec::new(),
        }
    }

    pub fn with_component(mut self, component: Box<dyn Component>) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_droppable(mut self, droppable: bool) -> Self {
        self.droppable = droppable;
        self
    }

    /// Flattens this instance for persistence.
    pub fn save(&self) -> SavedItem {
        SavedItem {
            uid: self.uid,
            nid: self.nid.clone(),
            name: self.name.clone(),
            owner: self.owner,
            droppable: self.droppable,
            components: self
                .components
                .iter()
                .map(|component| SavedComponent {
                    nid: component.nid().to_string(),
                    value: component.save(),
                })
                .collect(),
        }
    }
}

// Behavioral equality: two items are equal when their persisted forms are,
// which covers per-instance component state without comparing trait objects.
impl PartialEq for ItemState {
    fn eq(&self, other: &Self) -> bool {
        self.save() == other.save()
    }
}

impl Eq for ItemState {}

/// One persisted component: catalog id plus saved state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SavedComponent {
    pub nid: String,
    pub value: ComponentValue,
}

/// Persistence form of an item instance.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SavedItem {
    pub uid: InstanceId,
    pub nid: String,
    pub name: String,
    pub owner: Option<UnitId>,
    pub droppable: bool,
    pub components: Vec<SavedComponent>,
}

impl SavedItem {
    /// Rebuilds the instance through the component catalog.
    ///
    /// Components whose id the catalog no longer knows are dropped with a
    /// warning; the item itself always loads.
    pub fn restore(&self, registry: &dyn ComponentRegistry) -> ItemState {
        let mut components = Vec::with_capacity(self.components.len());
        for saved in &self.components {
            match registry.build(&saved.nid, saved.value.clone()) {
                Some(mut component) => {
                    component.restore(saved.value.clone());
                    components.push(component);
                }
                None => {
                    warn!(component = %saved.nid, item = %self.nid, "unknown component id, dropping");
                }
            }
        }

        ItemState {
            uid: self.uid,
            nid: self.nid.clone(),
            name: self.name.clone(),
            owner: self.owner,
            droppable: self.droppable,
            components,
        }
    }
}
