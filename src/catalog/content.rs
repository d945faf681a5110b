//! Builtin content tables - the default catalog
//!
//! Pure data. Everything here could equally arrive from a TOML catalog via
//! `loader`; the builtin exists so the engine is playable out of the box.

use ahash::AHashMap;

use crate::core::config::TRAVEL_REAL_SECS;
use crate::core::types::{Facility, GuildRank, LocationId, TownKind};

use super::activity::{
    ActivityDef, AdventureDef, EffectKind, LocationDef, LootEntry, RequirementKind, Rewards,
    StatGains,
};
use super::gear::{GearDef, GearSlot};
use super::{Catalog, ClassDef, ClassMods, FamilyDef, FamilyMods, TownSeed};

fn act(id: &str, name: &str, blurb: &str, time_cost_mins: i64, real_duration_secs: u32) -> ActivityDef {
    ActivityDef {
        id: id.into(),
        name: name.into(),
        blurb: blurb.into(),
        min_age: None,
        time_cost_mins,
        real_duration_secs,
        energy_cost: 0,
        energy_gain: 0,
        stat_gains: StatGains::default(),
        rewards: Rewards::default(),
        requirements: Vec::new(),
        adventure: None,
        queueable: false,
        travel: false,
        effect: None,
    }
}

fn loot(item: &str, min: u32, max: u32) -> LootEntry {
    LootEntry {
        item: item.into(),
        min,
        max,
    }
}

fn home_activities() -> Vec<ActivityDef> {
    let mut read = act("read", "Read a Book", "Study quietly. Good for Intelligence.", 120, 5);
    read.energy_cost = 8;
    read.stat_gains = StatGains {
        intelligence: 4,
        magic: 1,
        ..StatGains::default()
    };
    read.queueable = true;

    let mut train = act("train", "Body Training", "Build Strength. Costs more Energy.", 90, 5);
    train.energy_cost = 12;
    train.stat_gains = StatGains {
        strength: 4,
        ..StatGains::default()
    };
    train.rewards = Rewards {
        health: 2,
        ..Rewards::default()
    };
    train.queueable = true;

    let mut nap = act("nap", "Nap", "Short rest. Useful if you are low on time.", 120, 5);
    nap.energy_gain = 18;
    nap.rewards = Rewards {
        health: 6,
        ..Rewards::default()
    };
    nap.queueable = true;

    let mut sleep = act("sleep", "Sleep", "Restore Energy and Health.", 480, 5);
    sleep.energy_gain = 40;
    sleep.rewards = Rewards {
        health: 20,
        ..Rewards::default()
    };
    sleep.queueable = true;

    vec![read, train, nap, sleep]
}

fn town_activities() -> Vec<ActivityDef> {
    let mut oddjob = act("oddjob", "Do an Odd Job", "Small income. Improves Charm.", 180, 5);
    oddjob.energy_cost = 10;
    oddjob.stat_gains = StatGains {
        charm: 2,
        ..StatGains::default()
    };
    oddjob.rewards = Rewards {
        gold: 18,
        ..Rewards::default()
    };

    let mut errand = act(
        "road_errand",
        "Road Errand",
        "Deliver supplies along the outskirts. Risky routes.",
        240,
        6,
    );
    errand.energy_cost = 12;
    errand.stat_gains = StatGains {
        charm: 1,
        luck: 1,
        ..StatGains::default()
    };
    errand.rewards = Rewards {
        gold: 28,
        ..Rewards::default()
    };
    errand.adventure = Some(AdventureDef {
        base_risk: 0.06,
        loot: Vec::new(),
        travel_like: true,
        encounter_chance: 0.18,
    });

    let mut supplies = act(
        "buy_supplies",
        "Buy Supplies",
        "Rope, rations, a whetstone. The next venture is slightly safer.",
        60,
        4,
    );
    supplies.requirements = vec![RequirementKind::HasGold { amount: 15 }];
    supplies.effect = Some(EffectKind::BuySupplies {
        cost: 15,
        potency: 0.03,
    });

    let mut rent = act(
        "rent_room",
        "Rent a Room",
        "Restore access to a home of your own.",
        120,
        5,
    );
    rent.requirements = vec![
        RequirementKind::HomeLocked,
        RequirementKind::HasGold { amount: 40 },
    ];
    rent.effect = Some(EffectKind::RentRoom { cost: 40 });

    let mut dagger = act(
        "smith_dagger",
        "Buy a Basic Dagger",
        "A blade is a blade.",
        60,
        4,
    );
    dagger.requirements = vec![
        RequirementKind::FacilityBuilt {
            facility: Facility::Blacksmith,
        },
        RequirementKind::HasGold { amount: 25 },
    ];
    dagger.effect = Some(EffectKind::EquipGear {
        gear_id: "dagger".into(),
        cost_gold: 25,
        consumes: Vec::new(),
    });

    let mut sword = act(
        "smith_iron_sword",
        "Commission an Iron Sword",
        "Bring ore; pay the forge fee.",
        240,
        6,
    );
    sword.requirements = vec![
        RequirementKind::FacilityBuilt {
            facility: Facility::Blacksmith,
        },
        RequirementKind::HasItems {
            item: "iron".into(),
            qty: 5,
        },
        RequirementKind::HasGold { amount: 60 },
    ];
    sword.effect = Some(EffectKind::EquipGear {
        gear_id: "iron_sword".into(),
        cost_gold: 60,
        consumes: vec![("iron".into(), 5)],
    });

    let mut leather = act(
        "smith_leather_armor",
        "Commission Leather Armor",
        "Boar hide, cured and fitted.",
        240,
        6,
    );
    leather.requirements = vec![
        RequirementKind::FacilityBuilt {
            facility: Facility::Blacksmith,
        },
        RequirementKind::HasItems {
            item: "boar_hide".into(),
            qty: 4,
        },
        RequirementKind::HasGold { amount: 30 },
    ];
    leather.effect = Some(EffectKind::EquipGear {
        gear_id: "leather_armor".into(),
        cost_gold: 30,
        consumes: vec![("boar_hide".into(), 4)],
    });

    let mut cloak = act(
        "smith_wolf_cloak",
        "Commission a Wolf-hide Cloak",
        "Warm, quiet, and unsettling to wolves.",
        300,
        7,
    );
    cloak.requirements = vec![
        RequirementKind::FacilityBuilt {
            facility: Facility::Blacksmith,
        },
        RequirementKind::HasItems {
            item: "wolf_hide".into(),
            qty: 3,
        },
        RequirementKind::HasItems {
            item: "wolf_fang".into(),
            qty: 2,
        },
        RequirementKind::HasGold { amount: 80 },
    ];
    cloak.effect = Some(EffectKind::EquipGear {
        gear_id: "wolf_cloak".into(),
        cost_gold: 80,
        consumes: vec![("wolf_hide".into(), 3), ("wolf_fang".into(), 2)],
    });

    let mut plate = act(
        "smith_iron_armor",
        "Commission Iron Armor",
        "Heavy, expensive, and worth it.",
        360,
        7,
    );
    plate.requirements = vec![
        RequirementKind::FacilityBuilt {
            facility: Facility::Blacksmith,
        },
        RequirementKind::HasItems {
            item: "iron".into(),
            qty: 8,
        },
        RequirementKind::HasGold { amount: 140 },
    ];
    plate.effect = Some(EffectKind::EquipGear {
        gear_id: "iron_armor".into(),
        cost_gold: 140,
        consumes: vec![("iron".into(), 8)],
    });

    vec![
        oddjob, errand, supplies, rent, dagger, sword, leather, cloak, plate,
    ]
}

fn guild_activities() -> Vec<ActivityDef> {
    let mut register = act(
        "register",
        "Guild Registry",
        "Register to access contracts and quests.",
        60,
        4,
    );
    register.min_age = Some(12);
    register.requirements = vec![RequirementKind::GuildNotRegistered];
    register.effect = Some(EffectKind::RegisterGuild);

    let classes = [
        ("enroll_adventurer", "Train as an Adventurer", "adventurer"),
        ("enroll_mage", "Train as a Mage", "mage"),
        ("enroll_gatherer", "Train as a Gatherer", "gatherer"),
        ("enroll_tamer", "Train as a Tamer", "tamer"),
    ];
    let mut out = vec![register];
    for (id, name, class_id) in classes {
        let mut enroll = act(id, name, "Commit to a calling. One choice per life.", 240, 5);
        enroll.requirements = vec![
            RequirementKind::GuildRegistered,
            RequirementKind::ClassUnchosen,
        ];
        enroll.effect = Some(EffectKind::ChooseClass {
            class_id: class_id.into(),
        });
        out.push(enroll);
    }

    let mut rats = act(
        "contract_rats",
        "Rat Cellar Contract",
        "Someone's cellar, something's nest.",
        240,
        6,
    );
    rats.energy_cost = 10;
    rats.requirements = vec![RequirementKind::GuildRegistered];
    rats.rewards = Rewards {
        gold: 20,
        guild_xp: 8,
        ..Rewards::default()
    };
    rats.adventure = Some(AdventureDef {
        base_risk: 0.05,
        loot: vec![loot("slime_gel", 1, 3)],
        travel_like: false,
        encounter_chance: 0.0,
    });
    out.push(rats);

    let mut boars = act(
        "contract_boars",
        "Boar Cull Contract",
        "The farms pay well to thin the herds.",
        360,
        7,
    );
    boars.energy_cost = 14;
    boars.requirements = vec![
        RequirementKind::GuildRegistered,
        RequirementKind::GuildRankAtLeast {
            rank: GuildRank::E,
        },
    ];
    boars.rewards = Rewards {
        gold: 45,
        guild_xp: 16,
        ..Rewards::default()
    };
    boars.adventure = Some(AdventureDef {
        base_risk: 0.09,
        loot: vec![loot("boar_meat", 1, 3), loot("boar_hide", 1, 2)],
        travel_like: false,
        encounter_chance: 0.0,
    });
    out.push(boars);

    let mut wolves = act(
        "contract_wolves",
        "Wolfpack Contract",
        "A pack has claimed the east road.",
        480,
        8,
    );
    wolves.energy_cost = 18;
    wolves.requirements = vec![
        RequirementKind::GuildRegistered,
        RequirementKind::GuildRankAtLeast {
            rank: GuildRank::D,
        },
    ];
    wolves.rewards = Rewards {
        gold: 90,
        guild_xp: 30,
        ..Rewards::default()
    };
    wolves.adventure = Some(AdventureDef {
        base_risk: 0.14,
        loot: vec![
            loot("wolf_meat", 1, 3),
            loot("wolf_fang", 1, 2),
            loot("wolf_hide", 1, 2),
        ],
        travel_like: false,
        encounter_chance: 0.0,
    });
    out.push(wolves);

    let mut escort = act(
        "contract_escort",
        "Caravan Escort",
        "Walk the road, watch the treeline.",
        480,
        8,
    );
    escort.energy_cost = 16;
    escort.requirements = vec![
        RequirementKind::GuildRegistered,
        RequirementKind::GuildRankAtLeast {
            rank: GuildRank::E,
        },
    ];
    escort.rewards = Rewards {
        gold: 70,
        guild_xp: 22,
        ..Rewards::default()
    };
    escort.adventure = Some(AdventureDef {
        base_risk: 0.10,
        loot: Vec::new(),
        travel_like: true,
        encounter_chance: 0.22,
    });
    out.push(escort);

    out
}

fn forest_activities() -> Vec<ActivityDef> {
    let mut herbs = act(
        "gather_herbs",
        "Gather Herbs",
        "Quiet work at the forest edge.",
        180,
        5,
    );
    herbs.energy_cost = 8;
    herbs.stat_gains = StatGains {
        luck: 1,
        ..StatGains::default()
    };
    herbs.adventure = Some(AdventureDef {
        base_risk: 0.03,
        loot: vec![loot("herb", 2, 5)],
        travel_like: false,
        encounter_chance: 0.0,
    });

    let mut boar = act(
        "hunt_boar",
        "Hunt Boar",
        "Meat and hide, if you keep your footing.",
        300,
        7,
    );
    boar.energy_cost = 14;
    boar.stat_gains = StatGains {
        strength: 2,
        ..StatGains::default()
    };
    boar.adventure = Some(AdventureDef {
        base_risk: 0.08,
        loot: vec![loot("boar_meat", 1, 3), loot("boar_hide", 1, 2)],
        travel_like: false,
        encounter_chance: 0.0,
    });

    let mut wolves = act(
        "hunt_wolves",
        "Hunt Wolves",
        "They hunt back.",
        360,
        8,
    );
    wolves.min_age = Some(12);
    wolves.energy_cost = 16;
    wolves.stat_gains = StatGains {
        strength: 3,
        luck: 1,
        ..StatGains::default()
    };
    wolves.adventure = Some(AdventureDef {
        base_risk: 0.13,
        loot: vec![
            loot("wolf_meat", 1, 2),
            loot("wolf_fang", 1, 2),
            loot("wolf_hide", 1, 2),
        ],
        travel_like: false,
        encounter_chance: 0.0,
    });

    vec![herbs, boar, wolves]
}

fn mine_activities() -> Vec<ActivityDef> {
    let mut copper = act(
        "mine_copper",
        "Mine Copper",
        "Shallow veins, honest work.",
        240,
        6,
    );
    copper.energy_cost = 12;
    copper.stat_gains = StatGains {
        strength: 1,
        ..StatGains::default()
    };
    copper.adventure = Some(AdventureDef {
        base_risk: 0.05,
        loot: vec![loot("copper", 2, 4), loot("stone", 1, 3)],
        travel_like: false,
        encounter_chance: 0.0,
    });

    let mut iron = act(
        "mine_iron",
        "Mine Iron",
        "Deeper shafts, better ore, worse air.",
        360,
        7,
    );
    iron.min_age = Some(12);
    iron.energy_cost = 16;
    iron.stat_gains = StatGains {
        strength: 2,
        ..StatGains::default()
    };
    iron.adventure = Some(AdventureDef {
        base_risk: 0.10,
        loot: vec![loot("iron", 1, 3), loot("stone", 1, 2)],
        travel_like: false,
        encounter_chance: 0.0,
    });

    vec![copper, iron]
}

fn travel_activities() -> Vec<ActivityDef> {
    let mut travel = act(
        "travel_to_town",
        "Travel to Another Town",
        "Move between towns and cities. The roads are not kind.",
        0,
        TRAVEL_REAL_SECS,
    );
    travel.min_age = Some(16);
    travel.energy_cost = 10;
    travel.travel = true;
    travel.adventure = Some(AdventureDef {
        base_risk: 0.04,
        loot: Vec::new(),
        travel_like: true,
        encounter_chance: 0.25,
    });
    vec![travel]
}

fn development_activities() -> Vec<ActivityDef> {
    let builds = [
        (
            "build_blacksmith",
            "Build a Blacksmith",
            Facility::Blacksmith,
            400u64,
            480i64,
            8u32,
        ),
        (
            "build_store",
            "Build a Store",
            Facility::Store,
            300,
            480,
            8,
        ),
        (
            "build_infrastructure",
            "Build Infrastructure",
            Facility::Infrastructure,
            700,
            720,
            9,
        ),
    ];
    builds
        .into_iter()
        .map(|(id, name, facility, cost, mins, secs)| {
            let mut build = act(
                id,
                name,
                "Facilities persist across lives.",
                mins,
                secs,
            );
            build.requirements = vec![
                RequirementKind::OwnsCurrentTown,
                RequirementKind::FacilityMissing { facility },
                RequirementKind::HasGold { amount: cost },
            ];
            build.effect = Some(EffectKind::BuildFacility { facility, cost });
            build
        })
        .collect()
}

fn locations() -> Vec<LocationDef> {
    let defs = [
        (LocationId::Home, "Rest, study, and train safely.", None),
        (
            LocationId::Town,
            "Shops, odd jobs, rumors, and town services.",
            None,
        ),
        (
            LocationId::Guild,
            "Register, take contracts, raise rank.",
            None,
        ),
        (
            LocationId::Forest,
            "Gather herbs, hunt small monsters.",
            None,
        ),
        (LocationId::Mine, "Mine ore with some risk.", None),
        (
            LocationId::Travel,
            "Move between towns and cities (16+).",
            Some(16),
        ),
        (
            LocationId::Development,
            "Invest in your town. Facilities persist across lives.",
            None,
        ),
    ];
    defs.into_iter()
        .map(|(id, blurb, min_age)| LocationDef {
            id,
            name: id.label().to_string(),
            blurb: blurb.into(),
            min_age,
        })
        .collect()
}

fn gear_defs() -> Vec<GearDef> {
    vec![
        GearDef {
            id: "dagger".into(),
            name: "Basic Dagger".into(),
            slot: GearSlot::Weapon,
            power: 6,
            risk_mitigate: 0.00,
        },
        GearDef {
            id: "iron_sword".into(),
            name: "Iron Sword".into(),
            slot: GearSlot::Weapon,
            power: 14,
            risk_mitigate: 0.01,
        },
        GearDef {
            id: "leather_armor".into(),
            name: "Leather Armor".into(),
            slot: GearSlot::Armor,
            power: 0,
            risk_mitigate: 0.03,
        },
        GearDef {
            id: "wolf_cloak".into(),
            name: "Wolf-hide Cloak".into(),
            slot: GearSlot::Armor,
            power: 0,
            risk_mitigate: 0.05,
        },
        GearDef {
            id: "iron_armor".into(),
            name: "Iron Armor".into(),
            slot: GearSlot::Armor,
            power: 0,
            risk_mitigate: 0.07,
        },
    ]
}

fn families() -> Vec<FamilyDef> {
    vec![
        FamilyDef {
            id: "humble".into(),
            name: "Humble Home".into(),
            blurb: "Simple family. Balanced start. Small safety net.".into(),
            mods: FamilyMods {
                gold: 20,
                ..FamilyMods::default()
            },
        },
        FamilyDef {
            id: "merchant".into(),
            name: "Merchant Family".into(),
            blurb: "A bit of money and social access. Easier early trades.".into(),
            mods: FamilyMods {
                gold: 60,
                charm: 3,
                luck: 2,
                ..FamilyMods::default()
            },
        },
        FamilyDef {
            id: "scholar".into(),
            name: "Scholar Household".into(),
            blurb: "Books everywhere. Faster intelligence and magic learning.".into(),
            mods: FamilyMods {
                gold: 25,
                intelligence: 5,
                magic: 4,
                energy_max: Some(95),
                ..FamilyMods::default()
            },
        },
        FamilyDef {
            id: "woodsman".into(),
            name: "Woodsman Cabin".into(),
            blurb: "Rugged upbringing. Stronger body, less comfort.".into(),
            mods: FamilyMods {
                gold: 15,
                strength: 6,
                energy_max: Some(95),
                health_max: Some(110),
                ..FamilyMods::default()
            },
        },
    ]
}

fn classes() -> Vec<ClassDef> {
    vec![
        ClassDef {
            id: "adventurer".into(),
            name: "Adventurer".into(),
            blurb: "Safer quests and faster guild growth.".into(),
            mods: ClassMods {
                risk_mitigate: 0.03,
                guild_xp_mult: 1.15,
                ..ClassMods::default()
            },
        },
        ClassDef {
            id: "mage".into(),
            name: "Mage".into(),
            blurb: "Better magic growth; stronger spellwork.".into(),
            mods: ClassMods {
                magic_gain_mult: 1.25,
                ..ClassMods::default()
            },
        },
        ClassDef {
            id: "gatherer".into(),
            name: "Gatherer".into(),
            blurb: "More loot from gathering and mining.".into(),
            mods: ClassMods {
                loot_mult: 1.35,
                ..ClassMods::default()
            },
        },
        ClassDef {
            id: "tamer".into(),
            name: "Tamer".into(),
            blurb: "Lower risk in the wild; better with beasts.".into(),
            mods: ClassMods {
                risk_mitigate: 0.02,
                luck_gain_mult: 1.10,
                ..ClassMods::default()
            },
        },
    ]
}

fn item_names() -> AHashMap<String, String> {
    [
        ("herb", "Herb Bundle"),
        ("iron", "Iron Ore"),
        ("copper", "Copper Ore"),
        ("slime_gel", "Slime Gel"),
        ("boar_meat", "Boar Meat"),
        ("boar_hide", "Boar Hide"),
        ("wolf_meat", "Wolf Meat"),
        ("wolf_fang", "Wolf Fang"),
        ("wolf_hide", "Wolf Hide"),
        ("stone", "Stone"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn town_seeds() -> Vec<TownSeed> {
    vec![
        TownSeed {
            id: "town_rivergate".into(),
            name: Some("Rivergate".into()),
            kind: TownKind::Town,
            blurb: "A riverside trading stop with a modest guild hall.".into(),
            hidden: false,
        },
        TownSeed {
            id: "town_stonevale".into(),
            name: Some("Stonevale".into()),
            kind: TownKind::Town,
            blurb: "A mining community built into the foothills.".into(),
            hidden: false,
        },
        TownSeed {
            id: "city_aurum".into(),
            name: Some("Aurum City".into()),
            kind: TownKind::City,
            blurb: "A bright capital-adjacent city with strict patrols and opportunities.".into(),
            hidden: false,
        },
        TownSeed {
            id: "hidden_1".into(),
            name: None,
            kind: TownKind::Town,
            blurb: "(Hidden)".into(),
            hidden: true,
        },
        TownSeed {
            id: "hidden_2".into(),
            name: None,
            kind: TownKind::Town,
            blurb: "(Hidden)".into(),
            hidden: true,
        },
    ]
}

/// Assemble the default catalog
pub fn builtin() -> Catalog {
    let mut activities = AHashMap::new();
    activities.insert(LocationId::Home, home_activities());
    activities.insert(LocationId::Town, town_activities());
    activities.insert(LocationId::Guild, guild_activities());
    activities.insert(LocationId::Forest, forest_activities());
    activities.insert(LocationId::Mine, mine_activities());
    activities.insert(LocationId::Travel, travel_activities());
    activities.insert(LocationId::Development, development_activities());

    Catalog::from_parts(
        locations(),
        activities,
        gear_defs(),
        families(),
        classes(),
        item_names(),
        town_seeds(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_location() {
        let catalog = builtin();
        for loc in catalog.locations() {
            assert!(
                !catalog.activities_for(loc.id).is_empty(),
                "no activities for {:?}",
                loc.id
            );
        }
    }

    #[test]
    fn test_only_home_actions_are_queueable() {
        let catalog = builtin();
        for loc in catalog.locations() {
            for activity in catalog.activities_for(loc.id) {
                if activity.queueable {
                    assert_eq!(loc.id, LocationId::Home, "{} queueable", activity.id);
                }
            }
        }
    }

    #[test]
    fn test_adventure_risks_within_formula_range() {
        let catalog = builtin();
        for loc in catalog.locations() {
            for activity in catalog.activities_for(loc.id) {
                if let Some(adv) = &activity.adventure {
                    assert!(adv.base_risk > 0.0 && adv.base_risk < 0.5, "{}", activity.id);
                    assert!((0.0..=1.0).contains(&adv.encounter_chance));
                    for entry in &adv.loot {
                        assert!(entry.min <= entry.max, "{}", activity.id);
                    }
                }
            }
        }
    }
}
