//! Bordered table rendering for terminal output.
//!
//! Styling is expressed through [`RowStyle`] and [`Emphasis`]; escape codes
//! are only produced at render time and only when color is enabled.

use console::{Alignment, Style, measure_text_width, pad_str};
use octopus_reconciler::MatchStatus;
use tap::Pipe;

/// Whole-row styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStyle {
    #[default]
    Plain,
    /// Bold green.
    Good,
    /// Bold red.
    Bad,
}

impl From<MatchStatus> for RowStyle {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::Matched => Self::Good,
            MatchStatus::RegistryOnly | MatchStatus::WorkloadOnly => Self::Bad,
        }
    }
}

impl RowStyle {
    fn style(self) -> Option<Style> {
        match self {
            Self::Plain => None,
            Self::Good => Some(Style::new().green().bold()),
            Self::Bad => Some(Style::new().red().bold()),
        }
    }
}

/// Emphasis inside a single cell of a plain row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    None,
    /// The whole cell.
    Whole,
    /// Every occurrence of a substring.
    Substring(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    text: String,
    emphasis: Emphasis,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::None,
        }
    }

    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::Whole,
        }
    }

    /// Emphasize every occurrence of `needle`; an empty needle emphasizes nothing.
    pub fn highlighted(text: impl Into<String>, needle: &str) -> Self {
        let emphasis = if needle.is_empty() {
            Emphasis::None
        } else {
            Emphasis::Substring(needle.to_string())
        };
        Self {
            text: text.into(),
            emphasis,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn render(&self, row_style: RowStyle, color: bool) -> String {
        if !color {
            return self.text.clone();
        }
        if let Some(style) = row_style.style() {
            return style.force_styling(true).apply_to(&self.text).to_string();
        }

        let highlight = Style::new().green().bold().force_styling(true);
        match &self.emphasis {
            Emphasis::None => self.text.clone(),
            Emphasis::Whole => highlight.apply_to(&self.text).to_string(),
            Emphasis::Substring(needle) => self
                .text
                .split(needle.as_str())
                .collect::<Vec<_>>()
                .join(&highlight.apply_to(needle).to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    cells: Vec<Cell>,
    style: RowStyle,
}

/// A table with a rule between every row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells render empty; extra cells are dropped.
    pub fn push_row<I, C>(&mut self, cells: I, style: RowStyle)
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let mut cells: Vec<Cell> = cells.into_iter().map(Into::into).collect();
        cells.resize(self.headers.len(), Cell::plain(""));
        self.rows.push(Row { cells, style });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render to a string; `color` toggles ANSI styling.
    pub fn render(&self, color: bool) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(column, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.cells.get(column))
                    .map(|cell| measure_text_width(cell.text()))
                    .fold(measure_text_width(header), usize::max)
            })
            .collect();

        let rule = widths
            .iter()
            .map(|width| "-".repeat(width.saturating_add(2)))
            .collect::<Vec<_>>()
            .join("+")
            .pipe(|inner| format!("+{inner}+"));

        let line = |cells: Vec<String>| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!(" {} ", pad_str(cell, *width, Alignment::Left, None)))
                .collect::<Vec<_>>()
                .join("|")
                .pipe(|inner| format!("|{inner}|"))
        };

        let mut out = Vec::with_capacity(self.rows.len().saturating_mul(2).saturating_add(3));
        out.push(rule.clone());
        out.push(line(self.headers.clone()));
        out.push(rule.clone());
        for row in &self.rows {
            out.push(line(
                row.cells
                    .iter()
                    .map(|cell| cell.render(row.style, color))
                    .collect(),
            ));
            out.push(rule.clone());
        }
        out.join("\n")
    }

    /// Print to stdout, preceded by a blank line.
    pub fn print(&self, color: bool) {
        println!();
        println!("{}", self.render(color));
    }
}
