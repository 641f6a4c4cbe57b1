use prettytable::{format, Cell, Row, Table};
use serde_json::Value;
use switchbotapi::DeviceInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Indented json, what Home Assistant's `json_attributes` reads.
    Pretty,
    Compact,
    Table,
}

pub fn render_json(value: &Value, format: Format) -> serde_json::Result<String> {
    match format {
        Format::Compact => serde_json::to_string(value),
        Format::Pretty | Format::Table => serde_json::to_string_pretty(value),
    }
}

fn create_table() -> Table {
    let mut table = Table::new();
    let fmt = format::FormatBuilder::new()
        .padding(1, 1)
        .separator(
            format::LinePosition::Title,
            format::LineSeparator::new('-', '+', '+', '+'),
        )
        .column_separator('|')
        .build();
    table.set_format(fmt);
    table
}

pub fn device_table(devices: &[DeviceInfo]) -> Table {
    let mut table = create_table();
    table.set_titles(Row::new(vec![
        Cell::new_align("id", format::Alignment::CENTER),
        Cell::new_align("name", format::Alignment::CENTER),
        Cell::new_align("type", format::Alignment::CENTER),
        Cell::new_align("hub", format::Alignment::CENTER),
        Cell::new_align("cloud", format::Alignment::CENTER),
    ]));

    for device in devices {
        table.add_row(Row::new(vec![
            Cell::new(device.id()),
            Cell::new(device.name()),
            Cell::new(device.device_type()),
            Cell::new(device.hub()),
            Cell::new(if device.cloud_enabled() { "yes" } else { "no" }),
        ]));
    }
    table
}
