//! @acp:module "Reporter"
//! @acp:summary "Indented, column-aligned build progress output"
//! @acp:domain build
//! @acp:layer presentation
//!
//! Rows go through the progress bar while one is attached so the bar stays
//! at the bottom of the terminal.

use indicatif::{ProgressBar, ProgressStyle};

/// Width of every column but the last
const COLUMN_WIDTH: usize = 24;

/// Spaces per indentation level
const INDENT: usize = 2;

/// @acp:summary "Progress logger with an indentation level"
#[derive(Default)]
pub struct Reporter {
    indent: usize,
    quiet: bool,
    bar: Option<ProgressBar>,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            ..Self::default()
        }
    }

    /// Attach a unit progress bar when a person is watching
    pub fn start(&mut self, total_units: usize) {
        if self.quiet || !console::user_attended() || total_units == 0 {
            return;
        }
        let bar = ProgressBar::new(total_units as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} units")
        {
            bar.set_style(style.progress_chars("█▓░"));
        }
        self.bar = Some(bar);
    }

    /// @acp:summary "Shift the indentation by `delta`, then print the columns"
    pub fn row(&mut self, delta: i32, columns: &[&str]) {
        self.indent = self.indent.saturating_add_signed(delta as isize);
        if self.quiet || columns.is_empty() {
            return;
        }
        let line = format_row(self.indent, columns);
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }

    /// One unit finished
    pub fn advance(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        self.indent = 0;
    }
}

/// Pad every column but the last to a common width
pub fn format_row(indent: usize, columns: &[&str]) -> String {
    let mut line = " ".repeat(indent * INDENT);
    if let Some((last, leading)) = columns.split_last() {
        for column in leading {
            line.push_str(&format!("{:<width$} ", column, width = COLUMN_WIDTH));
        }
        line.push_str(last);
    }
    line.trim_end().to_string()
}
