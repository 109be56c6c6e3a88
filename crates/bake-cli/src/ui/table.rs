//! Table rendering for `bake list` using comfy-table.

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use bake_core::{CommandEntry, CommandHealth};

use super::format::{format_relative_time, truncate_str};

/// Columns other than TARGET take roughly this much space.
const FIXED_COLUMNS_WIDTH: usize = 48;
const MIN_TARGET_WIDTH: usize = 20;

/// One row of the commands table.
#[derive(Debug, Clone)]
pub struct CommandRow {
    /// Command name
    pub name: String,
    /// Target path as displayed (already shortened)
    pub target: Option<String>,
    /// Health label
    pub health: CommandHealth,
    /// Wrapper modification time
    pub updated: Option<chrono::DateTime<chrono::Utc>>,
}

impl CommandRow {
    /// Build a row from a registry entry, displaying paths through `show_path`.
    pub fn from_entry(entry: &CommandEntry, show_path: impl Fn(&std::path::Path) -> String) -> Self {
        Self {
            name: entry.name.clone(),
            target: entry.target.as_deref().map(show_path),
            health: entry.health,
            updated: entry.updated,
        }
    }
}

/// Render the commands table.
///
/// # Example Output
///
/// ```text
/// #  NAME    TARGET                   STATUS          UPDATED
/// 1  deploy  ~/scripts/deploy.py      ok              2h ago
/// 2  greet   ~/greet.py               missing-target  2025-01-15
/// ```
pub fn render_commands_table(rows: &[CommandRow], terminal_width: usize) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let target_width = terminal_width
        .saturating_sub(FIXED_COLUMNS_WIDTH)
        .max(MIN_TARGET_WIDTH);

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![
        Cell::new("#").set_alignment(CellAlignment::Right),
        Cell::new("NAME"),
        Cell::new("TARGET"),
        Cell::new("STATUS"),
        Cell::new("UPDATED"),
    ]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(2)),  // #
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // NAME
        ColumnConstraint::LowerBoundary(Width::Fixed(12)), // TARGET
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // STATUS
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // UPDATED
    ]);

    for (index, row) in rows.iter().enumerate() {
        let target = row
            .target
            .as_deref()
            .map(|t| truncate_str(t, target_width))
            .unwrap_or_else(|| "?".to_string());
        let updated = row
            .updated
            .map(format_relative_time)
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(index + 1).set_alignment(CellAlignment::Right),
            Cell::new(&row.name),
            Cell::new(target),
            Cell::new(row.health.to_string()),
            Cell::new(updated),
        ]);
    }

    table.trim_fmt().to_string()
}
