//! Terminal output for handlers and the router.
//!
//! Color is a property of the [`Ui`] value built once at startup, not global
//! state: every styled string goes through [`Ui::paint`], which returns the
//! text untouched when color is off.

use colored::Colorize;

const CHECK: &str = "\u{2713}";
const CROSS: &str = "\u{2717}";
const RULE: &str = "\u{2500}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Green,
    Yellow,
    Red,
    Cyan,
    Bold,
    Dim,
    BoldCyan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ui {
    color: bool,
}

impl Ui {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// No styling at all; used by tests and when `NO_COLOR` is set.
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn paint(&self, text: &str, style: Style) -> String {
        if !self.color {
            return text.to_string();
        }
        match style {
            Style::Green => text.green().to_string(),
            Style::Yellow => text.yellow().to_string(),
            Style::Red => text.red().to_string(),
            Style::Cyan => text.cyan().to_string(),
            Style::Bold => text.bold().to_string(),
            Style::Dim => text.bright_black().to_string(),
            Style::BoldCyan => text.cyan().bold().to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // Line formatting
    // -----------------------------------------------------------------------

    pub fn ok_line(&self, msg: &str) -> String {
        format!("{} {}", self.paint(CHECK, Style::Green), self.paint(msg, Style::Green))
    }

    pub fn warn_line(&self, msg: &str) -> String {
        format!("{} {}", self.paint(CROSS, Style::Yellow), self.paint(msg, Style::Yellow))
    }

    pub fn err_line(&self, msg: &str) -> String {
        format!("{} {}", self.paint(CROSS, Style::Red), self.paint(msg, Style::Red))
    }

    pub fn title_lines(&self, msg: &str) -> String {
        let rule = RULE.repeat(msg.chars().count());
        format!(
            "\n{}\n{}",
            self.paint(msg, Style::Bold),
            self.paint(&rule, Style::Cyan)
        )
    }

    // -----------------------------------------------------------------------
    // Printing
    // -----------------------------------------------------------------------

    pub fn blank(&self) {
        println!();
    }

    pub fn ok(&self, msg: &str) {
        println!("{}", self.ok_line(msg));
    }

    pub fn warn(&self, msg: &str) {
        println!("{}", self.warn_line(msg));
    }

    pub fn err(&self, msg: &str) {
        println!("{}", self.err_line(msg));
    }

    pub fn info(&self, msg: &str) {
        println!("{}", self.paint(msg, Style::Cyan));
    }

    pub fn muted(&self, msg: &str) {
        println!("{}", self.paint(msg, Style::Dim));
    }

    pub fn title(&self, msg: &str) {
        println!("{}", self.title_lines(msg));
    }

    /// Print a framed section around whatever `body` prints.
    pub fn frame<T>(&self, title: &str, body: impl FnOnce() -> T) -> T {
        println!(
            "{}",
            self.paint(&format!("\u{250f}\u{2501}\u{2501} {title} "), Style::Cyan)
        );
        let out = body();
        println!("{}", self.paint("\u{2517}\u{2501}\u{2501}", Style::Cyan));
        out
    }

    /// Announce a step, run it, and mark it done or failed by its result.
    pub fn step<T, E>(&self, title: &str, body: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        println!("{} {title}...", self.paint("\u{2026}", Style::Cyan));
        let out = body();
        match &out {
            Ok(_) => println!("{}", self.ok_line(title)),
            Err(_) => println!("{}", self.err_line(title)),
        }
        out
    }

    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        let rendered = render_table(self, headers, rows);
        if !rendered.is_empty() {
            print!("{rendered}");
        }
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Render a column-aligned table. Returns an empty string when `rows` is empty.
pub fn render_table(ui: &Ui, headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| ui.paint(&pad(h, widths[i]), Style::BoldCyan))
        .collect();
    out.push_str(&format!(" {} \n", header_row.join(" \u{2502} ")));

    let sep: Vec<String> = widths.iter().map(|&w| RULE.repeat(w)).collect();
    out.push_str(&format!(
        "{RULE}{}{RULE}\n",
        sep.join(&format!("{RULE}\u{253c}{RULE}"))
    ));

    for row in rows {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| pad(row.get(i).map(String::as_str).unwrap_or(""), w))
            .collect();
        out.push_str(&format!(" {} \n", cells.join(" \u{2502} ")));
    }

    out
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}
