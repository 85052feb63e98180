use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// First-timers in yellow, veterans of four or more flights in green.
pub fn color_coded_missions_cell(missions: u32) -> Cell {
    let cell = Cell::new(missions);
    match missions {
        0 | 1 => cell.fg(TableColor::Yellow),
        2 | 3 => cell,
        _ => cell.fg(TableColor::Green),
    }
}

/// Days in space, with a year or more highlighted.
pub fn days_in_space_cell(days: u32) -> Cell {
    let cell = Cell::new(format!("{days}d"));
    if days >= 365 {
        cell.fg(TableColor::Green)
    } else {
        cell
    }
}
