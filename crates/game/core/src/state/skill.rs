//! Skill instances and attachment provenance.
//!
//! Every skill instance records what granted it. Provenance controls two
//! things: whether a new copy of the same skill silently replaces an old
//! one (displaceable), and who may remove it. A removal request must match
//! both the skill's nid and its source kind; `Default`-sourced skills are
//! displaceable and removable by anyone, all other sources are neither
//! displaceable nor removable by a mismatched source kind.

use tracing::warn;

use crate::component::{Component, ComponentRegistry};

use super::item::SavedComponent;
use super::{InstanceId, UnitId};

/// What kind of source granted a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SourceKind {
    Terrain,
    Aura,
    Item,
    Region,
    Traveler,
    Klass,
    Personal,
    Fatigue,
    Default,
}

/// Provenance tag carried by every skill instance.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceInfo {
    pub kind: SourceKind,
    /// Identifier of the granting source (aura skill nid, item uid as text,
    /// region nid, ...), when one exists.
    pub source: Option<String>,
}

impl SourceInfo {
    pub fn new(kind: SourceKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(kind: SourceKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    /// May a new copy of the same skill silently replace one with this tag?
    pub fn displaceable(&self) -> bool {
        self.kind == SourceKind::Default
    }

    /// May `request` remove a skill carrying this tag?
    ///
    /// `Default`-sourced skills accept any removal request; every other
    /// source only accepts a request of its own kind.
    pub fn removable_by(&self, request: &RemovalRequest) -> bool {
        self.kind == SourceKind::Default || self.kind == request.kind
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self::new(SourceKind::Default)
    }
}

/// A request to remove a skill: who is asking, and for which skill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovalRequest {
    pub nid: String,
    pub kind: SourceKind,
}

impl RemovalRequest {
    /// A generic "remove any skill named X" request.
    pub fn generic(nid: impl Into<String>) -> Self {
        Self {
            nid: nid.into(),
            kind: SourceKind::Default,
        }
    }

    /// A removal request from a specific source kind.
    pub fn from_kind(nid: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            nid: nid.into(),
            kind,
        }
    }

    /// Does this request match the given skill instance?
    pub fn matches(&self, skill: &SkillState) -> bool {
        self.nid == skill.nid && skill.source.removable_by(self)
    }
}

/// One skill instance attached to a unit.
#[derive(Clone, Debug)]
pub struct SkillState {
    pub uid: InstanceId,
    pub nid: String,
    pub name: String,
    /// Holding unit. Weak back-reference for lookup only.
    pub owner: Option<UnitId>,
    pub source: SourceInfo,
    pub components: Vec<Box<dyn Component>>,
}

impl SkillState {
    pub fn new(nid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: InstanceId::UNBOUND,
            nid: nid.into(),
            name: name.into(),
            owner: None,
            source: SourceInfo::default(),
            components: Vec::new(),
        }
    }

    /// Visible stand-in for a skill whose template no longer exists.
    pub fn placeholder(nid: impl Into<String>) -> Self {
        let nid = nid.into();
        warn!(nid = %nid, "unknown skill template, constructing placeholder");
        Self {
            uid: InstanceId::UNBOUND,
            name: format!("??? ({nid})"),
            nid,
            owner: None,
            source: SourceInfo::default(),
            components: Vec::new(),
        }
    }

    pub fn with_component(mut self, component: Box<dyn Component>) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_source(mut self, source: SourceInfo) -> Self {
        self.source = source;
        self
    }

    /// Flattens this instance for persistence.
    pub fn save(&self) -> SavedSkill {
        SavedSkill {
            uid: self.uid,
            nid: self.nid.clone(),
            name: self.name.clone(),
            owner: self.owner,
            source: self.source.clone(),
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

impl PartialEq for SkillState {
    fn eq(&self, other: &Self) -> bool {
        self.save() == other.save()
    }
}

impl Eq for SkillState {}

/// Persistence form of a skill instance.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SavedSkill {
    pub uid: InstanceId,
    pub nid: String,
    pub name: String,
    pub owner: Option<UnitId>,
    pub source: SourceInfo,
    pub components: Vec<SavedComponent>,
}

impl SavedSkill {
    /// Rebuilds the instance through the component catalog.
    pub fn restore(&self, registry: &dyn ComponentRegistry) -> SkillState {
        let mut components = Vec::with_capacity(self.components.len());
        for saved in &self.components {
            match registry.build(&saved.nid, saved.value.clone()) {
                Some(mut component) => {
                    component.restore(saved.value.clone());
                    components.push(component);
                }
                None => {
                    warn!(component = %saved.nid, skill = %self.nid, "unknown component id, dropping");
                }
            }
        }

        SkillState {
            uid: self.uid,
            nid: self.nid.clone(),
            name: self.name.clone(),
            owner: self.owner,
            source: self.source.clone(),
            components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aura_skill(nid: &str) -> SkillState {
        SkillState::new(nid, nid).with_source(SourceInfo::with_source(SourceKind::Aura, "banner"))
    }

    #[test]
    fn generic_removal_cannot_touch_aura_skill() {
        let skill = aura_skill("rally");
        let generic = RemovalRequest::generic("rally");
        assert!(!generic.matches(&skill));
    }

    #[test]
    fn aura_removal_matches_same_name_and_kind() {
        let skill = aura_skill("rally");
        let request = RemovalRequest::from_kind("rally", SourceKind::Aura);
        assert!(request.matches(&skill));

        // Name mismatch fails even with the right kind.
        let wrong_name = RemovalRequest::from_kind("focus", SourceKind::Aura);
        assert!(!wrong_name.matches(&skill));
    }

    #[test]
    fn default_sourced_skill_is_removable_by_anyone() {
        let skill = SkillState::new("focus", "Focus");
        assert!(RemovalRequest::generic("focus").matches(&skill));
        assert!(RemovalRequest::from_kind("focus", SourceKind::Terrain).matches(&skill));
    }

    #[test]
    fn only_default_source_is_displaceable() {
        assert!(SourceInfo::default().displaceable());
        assert!(!SourceInfo::new(SourceKind::Personal).displaceable());
        assert!(!SourceInfo::with_source(SourceKind::Aura, "banner").displaceable());
    }
}
