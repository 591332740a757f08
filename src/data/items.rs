//! The item catalog: everything a castaway can carry, eat, wield, or wear.
//!
//! Balance notes:
//!   Raw catches feed poorly and risk sickness; grilling them at a campfire
//!   roughly quadruples the meal. The strange mushroom always feeds and
//!   always clouds the head until the next dawn. The medicinal herb is the
//!   only cure for a turned stomach.

use crate::shared::*;

fn material(id: &str, name: &str) -> ItemDef {
    ItemDef::new(id, name, ItemCategory::Material)
}

fn special(id: &str, name: &str) -> ItemDef {
    ItemDef::new(id, name, ItemCategory::Special)
}

fn food(id: &str, name: &str, edible: EdibleDef) -> ItemDef {
    let mut def = ItemDef::new(id, name, ItemCategory::Food);
    def.edible = Some(edible);
    def
}

fn tool(id: &str, name: &str, kind: ToolKind, wear: ConsumableState) -> ItemDef {
    let mut def = ItemDef::new(id, name, ItemCategory::Tool);
    def.tool = Some(kind);
    def.equip_slot = Some(EquipSlot::Tool);
    def.consumable = wear;
    def
}

fn weapon(id: &str, name: &str, damage: f32, durability: u32) -> ItemDef {
    let mut def = ItemDef::new(id, name, ItemCategory::Weapon);
    def.damage = damage;
    def.equip_slot = Some(EquipSlot::Weapon);
    def.consumable = ConsumableState::Durability(durability);
    def
}

fn armor(id: &str, name: &str, defense: f32, durability: u32) -> ItemDef {
    let mut def = ItemDef::new(id, name, ItemCategory::Armor);
    def.defense = defense;
    def.equip_slot = Some(EquipSlot::Armor);
    def.consumable = ConsumableState::Durability(durability);
    def
}

pub fn populate_items(registry: &mut ItemRegistry) {
    // ── Materials ───────────────────────────────────────────────────────
    registry.register(material("wood", "wood"));
    registry.register(material("stone", "stone"));
    registry.register(material("water", "fresh water"));
    registry.register(material("sapling", "sapling"));
    registry.register(material("flint", "flint"));

    // ── Keepsakes ───────────────────────────────────────────────────────
    registry.register(special("rusty_key", "rusty key"));
    registry.register(special("old_coin", "old coin"));

    // ── Food ────────────────────────────────────────────────────────────
    registry.register(food(
        "berries",
        "berries",
        EdibleDef { hunger: 8.0, thirst: 2.0, ..EdibleDef::default() },
    ));

    let mut raw_fish = food(
        "raw_fish",
        "raw fish",
        EdibleDef { hunger: 6.0, sick_chance: 0.35, ..EdibleDef::default() },
    );
    raw_fish.cooks_into = Some("grilled_fish".into());
    registry.register(raw_fish);
    registry.register(food(
        "grilled_fish",
        "grilled fish",
        EdibleDef { hunger: 22.0, ..EdibleDef::default() },
    ));

    let mut raw_meat = food(
        "raw_meat",
        "raw meat",
        EdibleDef { hunger: 8.0, sick_chance: 0.4, ..EdibleDef::default() },
    );
    raw_meat.cooks_into = Some("grilled_meat".into());
    registry.register(raw_meat);
    registry.register(food(
        "grilled_meat",
        "grilled meat",
        EdibleDef { hunger: 30.0, ..EdibleDef::default() },
    ));

    registry.register(food(
        "strange_mushroom",
        "strange mushroom",
        EdibleDef { hunger: 12.0, inflicts: Some(Affliction::Drugged), ..EdibleDef::default() },
    ));

    // ── Remedies ────────────────────────────────────────────────────────
    let mut herb = ItemDef::new("medicinal_herb", "medicinal herb", ItemCategory::Remedy);
    herb.edible = Some(EdibleDef {
        health: 5.0,
        cures: Some(Affliction::Sick),
        ..EdibleDef::default()
    });
    registry.register(herb);

    // ── Tools ───────────────────────────────────────────────────────────
    registry.register(tool("axe", "axe", ToolKind::Axe, ConsumableState::Durability(25)));
    registry.register(tool(
        "pickaxe",
        "pickaxe",
        ToolKind::Pickaxe,
        ConsumableState::Durability(25),
    ));
    registry.register(tool(
        "fishing_spear",
        "fishing spear",
        ToolKind::Spear,
        ConsumableState::Uses(12),
    ));

    // ── Weapons ─────────────────────────────────────────────────────────
    registry.register(weapon("wooden_club", "wooden club", 4.0, 15));
    registry.register(weapon("flint_knife", "flint knife", 6.0, 12));

    // ── Armor ───────────────────────────────────────────────────────────
    registry.register(armor("bark_armor", "bark armor", 2.0, 15));
    registry.register(armor("hide_armor", "hide armor", 4.0, 20));
}
