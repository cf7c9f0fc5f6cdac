//! End-to-end combat sessions with the standard component set.

use tactics_content::components::{
    Blast, CannotBeCountered, CritRate, Damage, HealOnHit, HitRate, Range, StatusOnHit,
    TargetsAllies, Uses, Weapon, WoundedOnly,
};
use tactics_content::{ItemBook, SkillBook, StandardRegistry};
use tactics_core::{
    ActionLog, CombatEnv, CombatError, CombatScript, CombatSession, CoreStats,
    GameConfig, GameState, ItemState, PlaybackEvent, Position, RecordKind, SavedItem, SkillState,
    Team, UnitId, UnitState,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn iron_sword() -> ItemState {
    ItemState::new("iron_sword", "Iron Sword")
        .with_component(Box::new(Weapon::new("sword")))
        .with_component(Box::new(Range::melee()))
        .with_component(Box::new(Damage::new(5)))
        .with_component(Box::new(HitRate::new(90)))
        .with_component(Box::new(CritRate::new(5)))
        .with_component(Box::new(Uses::new(40)))
}

fn standard_book() -> ItemBook {
    ItemBook::new().with(iron_sword())
}

fn add_fighter(
    state: &mut GameState,
    book: &ItemBook,
    nid: &str,
    team: Team,
    pos: Position,
) -> UnitId {
    let mut unit = UnitState::new(nid, team, CoreStats::new(30, 6, 5, 5, 2, 1, 3), pos);
    let item = book.instantiate(state, "iron_sword");
    unit.items.push(item);
    unit.equipped = Some(0);
    state.add_unit(unit)
}

fn equipped_uid(state: &GameState, unit: UnitId) -> tactics_core::InstanceId {
    state.unit(unit).unwrap().equipped_item().unwrap().uid
}

fn marks(playback: &[PlaybackEvent]) -> Vec<(UnitId, bool)> {
    playback
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::MarkHit { attacker, .. } | PlaybackEvent::MarkCrit { attacker, .. } => {
                Some((*attacker, true))
            }
            PlaybackEvent::MarkMiss { attacker, .. } => Some((*attacker, false)),
            _ => None,
        })
        .collect()
}

#[test]
fn two_round_duel_produces_four_alternating_strikes() {
    init_tracing();
    let book = standard_book();
    let mut state = GameState::new(5);
    let hero = add_fighter(&mut state, &book, "hero", Team::Player, Position::new(0, 0));
    let bandit = add_fighter(&mut state, &book, "bandit", Team::Enemy, Position::new(0, 1));
    let config = GameConfig::default();
    let env = CombatEnv::empty().with_config(&config).with_items(&book);
    let mut log = ActionLog::new();

    let outcome = CombatSession::new(hero, equipped_uid(&state, hero), Position::new(0, 1))
        .with_script(CombatScript::parse(&["hit1", "hit2", "hit1", "hit2"]).unwrap())
        .with_total_rounds(2)
        .resolve(&mut state, &env, &mut log)
        .unwrap();

    let strikers: Vec<UnitId> = marks(&outcome.playback).iter().map(|(who, _)| *who).collect();
    assert_eq!(strikers, vec![hero, bandit, hero, bandit]);
    // 5 might + 6 strength - 2 defense = 9 per landed strike, twice each.
    assert_eq!(state.unit(bandit).unwrap().hp, 30 - 18);
    assert_eq!(state.unit(hero).unwrap().hp, 30 - 18);
}

#[test]
fn lethal_first_strike_skips_the_rest_of_the_session() {
    init_tracing();
    let book = standard_book();
    let mut state = GameState::new(5);
    let hero = add_fighter(&mut state, &book, "hero", Team::Player, Position::new(0, 0));
    let bandit = add_fighter(&mut state, &book, "bandit", Team::Enemy, Position::new(0, 1));
    state.unit_mut(bandit).unwrap().hp = 4;
    let config = GameConfig::default();
    let env = CombatEnv::empty().with_config(&config).with_items(&book);
    let mut log = ActionLog::new();

    let outcome = CombatSession::new(hero, equipped_uid(&state, hero), Position::new(0, 1))
        .with_script(CombatScript::parse(&["hit1"]).unwrap())
        .with_total_rounds(2)
        .resolve(&mut state, &env, &mut log)
        .unwrap();

    assert_eq!(marks(&outcome.playback), vec![(hero, true)]);
    assert!(state.unit(bandit).unwrap().dead);
    assert!(outcome.playback.contains(&PlaybackEvent::UnitDeath {
        unit: bandit,
        killer: Some(hero),
    }));
    assert_eq!(state.records.tally(RecordKind::Kill, hero, bandit), 1);
}

#[test]
fn fixed_seed_resolves_identically() {
    init_tracing();
    let run = || {
        let book = standard_book();
        let mut state = GameState::new(1234);
        let hero = add_fighter(&mut state, &book, "hero", Team::Player, Position::new(0, 0));
        let _bandit = add_fighter(&mut state, &book, "bandit", Team::Enemy, Position::new(0, 1));
        let config = GameConfig::default();
        let env = CombatEnv::empty().with_config(&config).with_items(&book);
        let mut log = ActionLog::new();

        let outcome = CombatSession::new(hero, equipped_uid(&state, hero), Position::new(0, 1))
            .with_total_rounds(3)
            .resolve(&mut state, &env, &mut log)
            .unwrap();
        (outcome.playback, state.rng.snapshot())
    };

    assert_eq!(run(), run());
}

#[test]
fn rewinding_a_session_restores_the_state_exactly() {
    init_tracing();
    let book = standard_book();
    let mut state = GameState::new(77);
    let hero = add_fighter(&mut state, &book, "hero", Team::Player, Position::new(0, 0));
    let _bandit = add_fighter(&mut state, &book, "bandit", Team::Enemy, Position::new(0, 1));
    let config = GameConfig::default();
    let env = CombatEnv::empty().with_config(&config).with_items(&book);
    let mut log = ActionLog::new();
    let before = state.clone();

    CombatSession::new(hero, equipped_uid(&state, hero), Position::new(0, 1))
        .with_total_rounds(2)
        .resolve(&mut state, &env, &mut log)
        .unwrap();
    assert_ne!(state, before);

    log.rewind_to(&mut state, 0).unwrap();
    assert_eq!(state, before);
}

#[test]
fn weapon_experience_is_keyed_by_the_trained_type() {
    init_tracing();
    let book = standard_book();
    let mut state = GameState::new(5);
    let hero = add_fighter(&mut state, &book, "hero", Team::Player, Position::new(0, 0));
    let _bandit = add_fighter(&mut state, &book, "bandit", Team::Enemy, Position::new(0, 1));
    let config = GameConfig::default();
    let env = CombatEnv::empty().with_config(&config).with_items(&book);
    let mut log = ActionLog::new();

    CombatSession::new(hero, equipped_uid(&state, hero), Position::new(0, 1))
        .with_script(CombatScript::parse(&["hit1", "hit2"]).unwrap())
        .resolve(&mut state, &env, &mut log)
        .unwrap();

    assert!(state.unit(hero).unwrap().wexp_for("sword") > 0);
    assert_eq!(state.unit(hero).unwrap().wexp_for("lance"), 0);
    assert!(state.unit(hero).unwrap().exp > 0);
}

#[test]
fn spent_item_breaks_and_leaves_the_inventory() {
    init_tracing();
    let book = ItemBook::new().with(
        ItemState::new("glass_sword", "Glass Sword")
            .with_component(Box::new(Weapon::new("sword")))
            .with_component(Box::new(Range::melee()))
            .with_component(Box::new(Damage::new(12)))
            .with_component(Box::new(HitRate::new(100)))
            .with_component(Box::new(Uses::new(1))),
    );
    let mut state = GameState::new(5);
    let mut hero_unit = UnitState::new(
        "hero",
        Team::Player,
        CoreStats::new(30, 6, 5, 5, 2, 1, 3),
        Position::new(0, 0),
    );
    let sword = book.instantiate(&mut state, "glass_sword");
    let sword_uid = sword.uid;
    hero_unit.items.push(sword);
    hero_unit.equipped = Some(0);
    let hero = state.add_unit(hero_unit);
    let bandit = add_fighter(
        &mut state,
        &standard_book(),
        "bandit",
        Team::Enemy,
        Position::new(0, 1),
    );
    let config = GameConfig::default();
    let env = CombatEnv::empty().with_config(&config).with_items(&book);
    let mut log = ActionLog::new();
    let before = state.clone();

    let outcome = CombatSession::new(hero, sword_uid, Position::new(0, 1))
        .with_script(CombatScript::parse(&["hit1", "hit2"]).unwrap())
        .resolve(&mut state, &env, &mut log)
        .unwrap();

    assert!(outcome.playback.contains(&PlaybackEvent::ItemBroken {
        unit: hero,
        item: sword_uid,
    }));
    assert!(state.unit(hero).unwrap().item(sword_uid).is_none());
    assert_eq!(state.unit(hero).unwrap().equipped, None);
    assert!(state.unit(bandit).unwrap().hp < 30);

    // The whole session, breakage included, is one rewind unit.
    log.rewind_to(&mut state, 0).unwrap();
    assert_eq!(state, before);
}

#[test]
fn status_strike_grants_the_skill_from_the_oracle() {
    init_tracing();
    let book = ItemBook::new().with(
        ItemState::new("venom_edge", "Venom Edge")
            .with_component(Box::new(Weapon::new("sword")))
            .with_component(Box::new(Range::melee()))
            .with_component(Box::new(Damage::new(4)))
            .with_component(Box::new(HitRate::new(100)))
            .with_component(Box::new(StatusOnHit::new("poison"))),
    );
    let skills = SkillBook::new().with(SkillState::new("poison", "Poison"));
    let mut state = GameState::new(5);
    let mut hero_unit = UnitState::new(
        "hero",
        Team::Player,
        CoreStats::new(30, 6, 5, 5, 2, 1, 3),
        Position::new(0, 0),
    );
    let edge = book.instantiate(&mut state, "venom_edge");
    let edge_uid = edge.uid;
    hero_unit.items.push(edge);
    hero_unit.equipped = Some(0);
    let hero = state.add_unit(hero_unit);
    let bandit = add_fighter(
        &mut state,
        &standard_book(),
        "bandit",
        Team::Enemy,
        Position::new(0, 1),
    );
    let config = GameConfig::default();
    let env = CombatEnv::empty()
        .with_config(&config)
        .with_items(&book)
        .with_skills(&skills);
    let mut log = ActionLog::new();

    let outcome = CombatSession::new(hero, edge_uid, Position::new(0, 1))
        .with_script(CombatScript::parse(&["hit1", "hit2"]).unwrap())
        .resolve(&mut state, &env, &mut log)
        .unwrap();

    assert!(state.unit(bandit).unwrap().skill("poison").is_some());
    assert!(outcome
        .playback
        .iter()
        .any(|event| matches!(event, PlaybackEvent::StatusHit { status, .. } if status == "poison")));
}

#[test]
fn blast_weapon_also_strikes_splash_bystanders() {
    init_tracing();
    let book = ItemBook::new().with(
        ItemState::new("fire_orb", "Fire Orb")
            .with_component(Box::new(Weapon::new("tome")))
            .with_component(Box::new(Range::new(1, 3)))
            .with_component(Box::new(Damage::new(6)))
            .with_component(Box::new(HitRate::new(100)))
            .with_component(Box::new(Blast::new(1)))
            .with_component(Box::new(CannotBeCountered)),
    );
    let mut state = GameState::new(5);
    let mut hero_unit = UnitState::new(
        "hero",
        Team::Player,
        CoreStats::new(30, 6, 5, 5, 2, 1, 3),
        Position::new(0, 0),
    );
    let orb = book.instantiate(&mut state, "fire_orb");
    let orb_uid = orb.uid;
    hero_unit.items.push(orb);
    hero_unit.equipped = Some(0);
    let hero = state.add_unit(hero_unit);
    let bandit = add_fighter(
        &mut state,
        &standard_book(),
        "bandit",
        Team::Enemy,
        Position::new(0, 2),
    );
    let bystander = add_fighter(
        &mut state,
        &standard_book(),
        "bystander",
        Team::Enemy,
        Position::new(0, 3),
    );
    let config = GameConfig::default();
    let env = CombatEnv::empty().with_config(&config).with_items(&book);
    let mut log = ActionLog::new();

    let outcome = CombatSession::new(hero, orb_uid, Position::new(0, 2))
        .with_script(CombatScript::parse(&["hit1", "hit1"]).unwrap())
        .resolve(&mut state, &env, &mut log)
        .unwrap();

    assert_eq!(outcome.defenders, vec![bandit]);
    assert_eq!(outcome.splash, vec![bystander]);
    assert!(state.unit(bandit).unwrap().hp < 30);
    assert!(state.unit(bystander).unwrap().hp < 30);
}

fn mend_staff() -> ItemState {
    ItemState::new("mend_staff", "Mend Staff")
        .with_component(Box::new(Range::melee()))
        .with_component(Box::new(HealOnHit::new(8)))
        .with_component(Box::new(WoundedOnly))
        .with_component(Box::new(TargetsAllies))
}

fn bare_unit(state: &mut GameState, nid: &str, team: Team, pos: Position) -> UnitId {
    state.add_unit(UnitState::new(
        nid,
        team,
        CoreStats::new(30, 6, 5, 5, 2, 1, 3),
        pos,
    ))
}

#[test]
fn mend_staff_heals_a_wounded_ally() {
    init_tracing();
    let book = ItemBook::new().with(mend_staff());
    let mut state = GameState::new(5);
    let mut healer_unit = UnitState::new(
        "cleric",
        Team::Player,
        CoreStats::new(30, 6, 5, 5, 2, 1, 3),
        Position::new(0, 0),
    );
    let staff = book.instantiate(&mut state, "mend_staff");
    let staff_uid = staff.uid;
    healer_unit.items.push(staff);
    healer_unit.equipped = Some(0);
    let healer = state.add_unit(healer_unit);
    let ally = bare_unit(&mut state, "ally", Team::Player, Position::new(0, 1));
    state.unit_mut(ally).unwrap().hp = 20;
    let config = GameConfig::default();
    let env = CombatEnv::empty().with_config(&config).with_items(&book);
    let mut log = ActionLog::new();

    let outcome = CombatSession::new(healer, staff_uid, Position::new(0, 1))
        .with_script(CombatScript::parse(&["hit1"]).unwrap())
        .resolve(&mut state, &env, &mut log)
        .unwrap();

    assert_eq!(state.unit(ally).unwrap().hp, 28);
    assert!(outcome
        .playback
        .iter()
        .any(|event| matches!(event, PlaybackEvent::HealHit { healed: 8, .. })));
}

#[test]
fn staff_refuses_full_health_and_enemy_targets() {
    init_tracing();
    let book = ItemBook::new().with(mend_staff());
    let mut state = GameState::new(5);
    let mut healer_unit = UnitState::new(
        "cleric",
        Team::Player,
        CoreStats::new(30, 6, 5, 5, 2, 1, 3),
        Position::new(0, 0),
    );
    let staff = book.instantiate(&mut state, "mend_staff");
    let staff_uid = staff.uid;
    healer_unit.items.push(staff);
    healer_unit.equipped = Some(0);
    let healer = state.add_unit(healer_unit);
    let _ally = bare_unit(&mut state, "ally", Team::Player, Position::new(0, 1));
    let enemy = bare_unit(&mut state, "bandit", Team::Enemy, Position::new(1, 0));
    state.unit_mut(enemy).unwrap().hp = 10;
    let config = GameConfig::default();
    let env = CombatEnv::empty().with_config(&config).with_items(&book);
    let mut log = ActionLog::new();

    // The ally stands in the staff's valid set but is at full health.
    let err = CombatSession::new(healer, staff_uid, Position::new(0, 1))
        .resolve(&mut state, &env, &mut log)
        .unwrap_err();
    assert_eq!(err, CombatError::NoTarget(Position::new(0, 1)));

    // The enemy is wounded but its position is never a staff nominee.
    let err = CombatSession::new(healer, staff_uid, Position::new(1, 0))
        .resolve(&mut state, &env, &mut log)
        .unwrap_err();
    assert_eq!(err, CombatError::NoTarget(Position::new(1, 0)));
    assert_eq!(log.position(), 0);
}

#[test]
fn saved_item_restores_behaviorally_identical() {
    init_tracing();
    let book = standard_book();
    let mut state = GameState::new(5);
    let mut item = book.instantiate(&mut state, "iron_sword");
    // Spend some charges so per-instance state differs from the template.
    for component in &mut item.components {
        if component.charges().is_some() {
            component.set_charges(17);
        }
    }

    let json = serde_json::to_string(&item.save()).unwrap();
    let saved: SavedItem = serde_json::from_str(&json).unwrap();
    let restored = saved.restore(&StandardRegistry::new());

    assert_eq!(restored, item);
    let charges = restored
        .components
        .iter()
        .find_map(|component| component.charges());
    assert_eq!(charges, Some(17));
}
