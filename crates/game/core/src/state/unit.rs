//! Unit state: stats, inventory, skills, proficiency.

use std::collections::BTreeMap;

use super::{InstanceId, ItemState, Position, SkillState, UnitId};

/// Which side a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Team {
    Player,
    Enemy,
    Other,
}

/// A unit's base combat statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CoreStats {
    pub hp_max: i32,
    pub strength: i32,
    pub skill: i32,
    pub speed: i32,
    pub defense: i32,
    pub resist: i32,
    pub luck: i32,
}

impl CoreStats {
    pub fn new(
        hp_max: i32,
        strength: i32,
        skill: i32,
        speed: i32,
        defense: i32,
        resist: i32,
        luck: i32,
    ) -> Self {
        Self {
            hp_max,
            strength,
            skill,
            speed,
            defense,
            resist,
            luck,
        }
    }

    pub fn get(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::HpMax => self.hp_max,
            StatKind::Strength => self.strength,
            StatKind::Skill => self.skill,
            StatKind::Speed => self.speed,
            StatKind::Defense => self.defense,
            StatKind::Resist => self.resist,
            StatKind::Luck => self.luck,
        }
    }

    pub fn set(&mut self, kind: StatKind, value: i32) {
        match kind {
            StatKind::HpMax => self.hp_max = value,
            StatKind::Strength => self.strength = value,
            StatKind::Skill => self.skill = value,
            StatKind::Speed => self.speed = value,
            StatKind::Defense => self.defense = value,
            StatKind::Resist => self.resist = value,
            StatKind::Luck => self.luck = value,
        }
    }
}

/// Names a single stat for reversible stat-change actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StatKind {
    HpMax,
    Strength,
    Skill,
    Speed,
    Defense,
    Resist,
    Luck,
}

/// One unit on the board.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitState {
    pub id: UnitId,
    /// Template nid this unit was created from.
    pub nid: String,
    pub name: String,
    pub team: Team,
    pub level: i32,
    pub exp: i32,
    pub mana: i32,
    pub stats: CoreStats,
    pub hp: i32,
    pub position: Position,
    pub items: Vec<ItemState>,
    /// Index into `items` of the equipped item.
    pub equipped: Option<usize>,
    pub skills: Vec<SkillState>,
    /// Weapon proficiency points per weapon type.
    pub wexp: BTreeMap<String, i32>,
    pub dead: bool,
    /// Assist partner, when pairing is enabled.
    pub partner: Option<UnitId>,
}

impl UnitState {
    pub fn new(nid: impl Into<String>, team: Team, stats: CoreStats, position: Position) -> Self {
        let nid = nid.into();
        Self {
            id: UnitId(0),
            name: nid.clone(),
            nid,
            team,
            level: 1,
            exp: 0,
            mana: 0,
            hp: stats.hp_max,
            stats,
            position,
            items: Vec::new(),
            equipped: None,
            skills: Vec::new(),
            wexp: BTreeMap::new(),
            dead: false,
            partner: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.dead && self.hp > 0
    }

    pub fn equipped_item(&self) -> Option<&ItemState> {
        self.equipped.and_then(|index| self.items.get(index))
    }

    pub fn item(&self, uid: InstanceId) -> Option<&ItemState> {
        self.items.iter().find(|item| item.uid == uid)
    }

    pub fn item_mut(&mut self, uid: InstanceId) -> Option<&mut ItemState> {
        self.items.iter_mut().find(|item| item.uid == uid)
    }

    pub fn skill(&self, nid: &str) -> Option<&SkillState> {
        self.skills.iter().find(|skill| skill.nid == nid)
    }

    /// Proficiency points for a weapon type.
    pub fn wexp_for(&self, weapon_type: &str) -> i32 {
        self.wexp.get(weapon_type).copied().unwrap_or(0)
    }
}
