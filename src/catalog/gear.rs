//! Gear tables - equippable items contributing power and risk mitigation

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GearSlot {
    Weapon,
    Armor,
}

/// A gear definition from the content catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GearDef {
    pub id: String,
    pub name: String,
    pub slot: GearSlot,
    /// Flat contribution to combined power in the death formula
    #[serde(default)]
    pub power: u32,
    /// Flat subtraction from death probability
    #[serde(default)]
    pub risk_mitigate: f64,
}

/// The character's equipped gear, by catalog id; `None` means bare slot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GearSlots {
    pub weapon: Option<String>,
    pub armor: Option<String>,
}

impl GearSlots {
    pub fn equipped(&self) -> impl Iterator<Item = &str> {
        self.weapon.as_deref().into_iter().chain(self.armor.as_deref())
    }

    pub fn equip(&mut self, slot: GearSlot, gear_id: String) {
        match slot {
            GearSlot::Weapon => self.weapon = Some(gear_id),
            GearSlot::Armor => self.armor = Some(gear_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equip_replaces_slot() {
        let mut slots = GearSlots::default();
        assert_eq!(slots.equipped().count(), 0);

        slots.equip(GearSlot::Weapon, "dagger".into());
        slots.equip(GearSlot::Weapon, "iron_sword".into());
        slots.equip(GearSlot::Armor, "leather_armor".into());

        let ids: Vec<&str> = slots.equipped().collect();
        assert_eq!(ids, vec!["iron_sword", "leather_armor"]);
    }
}
