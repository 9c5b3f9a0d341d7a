//! Styles for the societydb CLI.
//!
//! Rendering code never picks colors directly. It asks for a semantic name from
//! [`names`] (an id, a timestamp, a deleted record) and [`style`] maps that name to the
//! actual [`console::Style`]. Changing the look means editing the table in [`style`]
//! only.
//!
//! Color is decided once per invocation: `Some(true)`/`Some(false)` force it (tests
//! pass `Some(false)` to get plain text), `None` follows the terminal.

use console::Style;

pub mod names {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const MUTED: &str = "muted";
    pub const TIME: &str = "time";
    pub const CATEGORY: &str = "category";
    pub const DELETED: &str = "deleted";
    pub const HEADER: &str = "header";
    pub const SUCCESS: &str = "success";
    pub const INFO: &str = "info";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
}

/// Resolves a color preference against the terminal.
pub fn color_enabled(use_color: Option<bool>) -> bool {
    use_color.unwrap_or_else(console::colors_enabled)
}

pub fn style(name: &str, use_color: bool) -> Style {
    let base = match name {
        names::ID => Style::new().yellow(),
        names::TITLE => Style::new().bold(),
        names::MUTED => Style::new().dim(),
        names::TIME => Style::new().dim().italic(),
        names::CATEGORY => Style::new().cyan(),
        names::DELETED => Style::new().red(),
        names::HEADER => Style::new().bold().underlined(),
        names::SUCCESS => Style::new().green(),
        names::INFO => Style::new().blue(),
        names::WARNING => Style::new().yellow().bold(),
        names::ERROR => Style::new().red().bold(),
        _ => Style::new(),
    };
    base.force_styling(use_color)
}

/// Applies the named style to `text`.
pub fn paint(name: &str, text: &str, use_color: bool) -> String {
    style(name, use_color).apply_to(text).to_string()
}
