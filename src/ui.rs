//! Terminal rendering helpers for engine results.

use crate::core::page::Page;
use crate::core::rate::{Conversion, RateSnapshot};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalValue,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn rate_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Creates a spinner shown while a fetch is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn render_conversion(conversion: &Conversion) -> String {
    format!(
        "{} {} = {}",
        conversion.amount,
        conversion.from,
        style_text(
            &format!("{} {}", conversion.converted, conversion.to),
            StyleType::TotalValue
        )
    )
}

pub fn render_snapshot(snapshot: &RateSnapshot) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![header_cell("Currency"), header_cell("Rate")]);

    let mut codes: Vec<_> = snapshot.rates.keys().collect();
    codes.sort();
    for code in codes {
        table.add_row(vec![
            Cell::new(code),
            rate_cell(snapshot.rates[code].to_string()),
        ]);
    }

    format!(
        "{}\n\n{}",
        style_text(
            &format!("Rates for {} on {}", snapshot.base, snapshot.date),
            StyleType::Title
        ),
        table
    )
}

pub fn render_history(base: &str, page: &Page<RateSnapshot>) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Date"),
        header_cell("Currency"),
        header_cell("Rate"),
    ]);

    for snapshot in &page.items {
        let mut codes: Vec<_> = snapshot.rates.keys().collect();
        codes.sort();
        for code in codes {
            table.add_row(vec![
                Cell::new(snapshot.date.to_string()),
                Cell::new(code),
                rate_cell(snapshot.rates[code].to_string()),
            ]);
        }
    }

    let footer = format!(
        "Page {} of {} ({} days in range)",
        page.number, page.total_pages, page.total_count
    );

    format!(
        "{}\n\n{}\n{}",
        style_text(&format!("Historical rates for {base}"), StyleType::Title),
        table,
        style_text(&footer, StyleType::Subtle)
    )
}
