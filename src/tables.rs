use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    entity::{Entity, EntityValue},
    telemetry::Snapshot,
};

pub fn build_entities_table(entities: &[Entity]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Entity", "Value", "Unit", "Unique ID"]);
    for entity in entities {
        let descriptor = entity.descriptor();
        let state = entity.state();
        let value_cell = match &state.value {
            EntityValue::Number(_) => Cell::new(&state.value).set_alignment(CellAlignment::Right),
            EntityValue::Text(_) if !state.available => {
                Cell::new(&state.value).add_attribute(Attribute::Dim)
            }
            EntityValue::Text(_) => Cell::new(&state.value),
            EntityValue::Unavailable => Cell::new(&state.value).fg(Color::DarkGrey),
        };
        let name_cell = if descriptor.category.is_some() {
            Cell::new(descriptor.name).add_attribute(Attribute::Dim)
        } else {
            Cell::new(descriptor.name)
        };
        table.add_row(vec![
            name_cell,
            value_cell,
            Cell::new(descriptor.unit.unwrap_or_default()),
            Cell::new(descriptor.unique_id()).add_attribute(Attribute::Dim),
        ]);
    }
    table
}

/// Raw fields as returned by the cloud, sorted by key.
pub fn build_snapshot_table(snapshot: &Snapshot) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    let mut fields: Vec<_> = snapshot.iter().collect();
    fields.sort_unstable_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
    for (key, value) in fields {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}
