use std::fmt;

use plotters::style::RGBColor;

use crate::error::{VolcanoError, VolcanoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Up,
    Down,
    Neutral,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Up => write!(f, "up"),
            Category::Down => write!(f, "down"),
            Category::Neutral => write!(f, "neutral"),
        }
    }
}

/// Fold-change cutoffs (positive, negative) and the adjusted p-value cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub fc_up: f64,
    pub fc_down: f64,
    pub padj: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            fc_up: 1.0,
            fc_down: -1.0,
            padj: 0.05,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> VolcanoResult<()> {
        if !(self.fc_up.is_finite() && self.fc_down.is_finite() && self.padj.is_finite()) {
            return Err(VolcanoError::config(format!(
                "thresholds must be finite (got fc=({}, {}), padj={})",
                self.fc_up, self.fc_down, self.padj
            )));
        }
        if self.fc_up < self.fc_down {
            return Err(VolcanoError::config(format!(
                "positive fold-change cutoff {} is below negative cutoff {}",
                self.fc_up, self.fc_down
            )));
        }
        if self.padj <= 0.0 || self.padj > 1.0 {
            return Err(VolcanoError::config(format!(
                "padj threshold must be in (0, 1], got {}",
                self.padj
            )));
        }
        Ok(())
    }

    /// First match wins: Up, then Down, else Neutral.
    pub fn classify(&self, fc: f64, padj: f64) -> Category {
        let significant = padj <= self.padj;
        if significant && fc >= self.fc_up {
            Category::Up
        } else if significant && fc <= self.fc_down {
            Category::Down
        } else {
            Category::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryColors {
    pub up: RGBColor,
    pub down: RGBColor,
    pub neutral: RGBColor,
}

impl Default for CategoryColors {
    fn default() -> Self {
        CategoryColors {
            up: RGBColor(255, 0, 0),
            down: RGBColor(0, 128, 0),
            neutral: RGBColor(128, 128, 128),
        }
    }
}

impl CategoryColors {
    pub fn color_of(&self, cat: Category) -> RGBColor {
        match cat {
            Category::Up => self.up,
            Category::Down => self.down,
            Category::Neutral => self.neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub up: usize,
    pub down: usize,
    pub neutral: usize,
}

impl CategoryCounts {
    pub fn tally<'a>(cats: impl IntoIterator<Item = &'a Category>) -> Self {
        let mut counts = CategoryCounts::default();
        for c in cats {
            match c {
                Category::Up => counts.up += 1,
                Category::Down => counts.down += 1,
                Category::Neutral => counts.neutral += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.up + self.down + self.neutral
    }
}
