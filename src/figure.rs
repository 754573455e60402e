use std::ops::Range;

use crate::axis::{resolve_x_range, resolve_y_range};
use crate::classify::{Category, CategoryColors, CategoryCounts};
use crate::config::{PlotConfig, ReferenceLineStyle};
use crate::error::{VolcanoError, VolcanoResult};
use crate::table::Table;

pub const X_AXIS_TITLE: &str = "Log2 Fold Change";
pub const Y_AXIS_TITLE: &str = "-Log10 adjusted P-value";

#[derive(Debug, Clone, PartialEq)]
pub struct VolcanoPoint {
    pub id: String,
    /// Source data row, 1-based.
    pub row: usize,
    pub fc: f64,
    pub padj: f64,
    pub x: f64,
    pub y: f64,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefLine {
    Horizontal(f64),
    Vertical(f64),
}

/// Fully resolved figure: what gets drawn, where, and how.
#[derive(Debug, Clone, PartialEq)]
pub struct VolcanoFigure {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub points: Vec<VolcanoPoint>,
    pub labels: Vec<PointLabel>,
    pub ref_lines: Vec<RefLine>,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub counts: CategoryCounts,
    pub skipped: usize,
    pub style: FigureStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FigureStyle {
    pub colors: CategoryColors,
    pub point_size: f64,
    pub alpha: f64,
    pub ref_line: ReferenceLineStyle,
    pub x_label_size: u32,
    pub x_title_size: u32,
    pub y_label_size: u32,
    pub y_title_size: u32,
    pub label_size: u32,
    pub title_size: u32,
    pub width: u32,
    pub height: u32,
}

impl FigureStyle {
    fn from_config(cfg: &PlotConfig) -> Self {
        FigureStyle {
            colors: cfg.colors,
            point_size: cfg.point_size,
            alpha: cfg.alpha,
            ref_line: cfg.ref_line,
            x_label_size: cfg.x_label_size,
            x_title_size: cfg.x_title_size,
            y_label_size: cfg.y_label_size,
            y_title_size: cfg.y_title_size,
            label_size: cfg.label_size,
            title_size: cfg.title_size,
            width: cfg.width,
            height: cfg.height,
        }
    }
}

impl VolcanoFigure {
    pub fn categories(&self) -> Vec<Category> {
        self.points.iter().map(|p| p.category).collect()
    }

    pub fn label_texts(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.text.as_str()).collect()
    }

    pub fn points_in(&self, cat: Category) -> impl Iterator<Item = &VolcanoPoint> {
        self.points.iter().filter(move |p| p.category == cat)
    }
}

/// −log10 of a significance value; zero or negative values are rejected.
pub fn neg_log10(padj: f64, column: &str, row: usize) -> VolcanoResult<f64> {
    if padj <= 0.0 || !padj.is_finite() {
        return Err(VolcanoError::InvalidValue {
            column: column.to_string(),
            row,
            value: padj.to_string(),
            reason: "significance must be a positive finite number for -log10".to_string(),
        });
    }
    Ok(-padj.log10())
}

/// Classify every row of `table` and lay out the figure. Config is assumed validated.
pub fn build_figure(table: &Table, cfg: &PlotConfig) -> VolcanoResult<VolcanoFigure> {
    let ids = table.text_column(&cfg.id_col)?;
    let fcs = table.numeric_column(&cfg.x_col)?;
    let padjs = table.numeric_column(&cfg.y_col)?;

    // Break margins use the whole column, including rows skipped below.
    let fc_extent: Vec<f64> = fcs.iter().flatten().copied().collect();
    let padj_extent: Vec<f64> = padjs.iter().flatten().copied().collect();

    let mut points: Vec<VolcanoPoint> = Vec::with_capacity(table.len());
    let mut skipped = 0usize;
    for (i, ((id, fc), padj)) in ids.into_iter().zip(fcs).zip(padjs).enumerate() {
        let row = i + 1;
        let (fc, padj) = match (fc, padj) {
            (Some(fc), Some(p)) => (fc, p),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let y = neg_log10(padj, &cfg.y_col, row)?;
        points.push(VolcanoPoint {
            category: cfg.thresholds.classify(fc, padj),
            id,
            row,
            fc,
            padj,
            x: fc,
            y,
        });
    }
    if skipped > 0 {
        log::warn!(
            "{}: skipped {} of {} rows with missing {} or {}",
            table.source().display(),
            skipped,
            table.len(),
            cfg.x_col,
            cfg.y_col
        );
    }
    if points.is_empty() {
        return Err(VolcanoError::NoPlottableRows);
    }

    let counts = CategoryCounts::tally(points.iter().map(|p| &p.category));
    log::info!(
        "Classified {} points: up={} down={} neutral={} (fc >= {} / <= {}, padj <= {})",
        counts.total(),
        counts.up,
        counts.down,
        counts.neutral,
        cfg.thresholds.fc_up,
        cfg.thresholds.fc_down,
        cfg.thresholds.padj
    );

    let labels = if cfg.label_genes {
        let ids: Vec<String> = points.iter().map(|p| p.id.clone()).collect();
        let xs: Vec<f64> = points.iter().map(|p| p.fc).collect();
        cfg.genes_to_label
            .select(&ids, &xs)
            .into_iter()
            .map(|i| PointLabel {
                text: points[i].id.clone(),
                x: points[i].x,
                y: points[i].y,
            })
            .collect()
    } else {
        Vec::new()
    };

    let h_line = neg_log10(cfg.thresholds.padj, "padj_threshold", 0)?;
    let ref_lines = vec![
        RefLine::Horizontal(h_line),
        RefLine::Vertical(cfg.thresholds.fc_up),
        RefLine::Vertical(cfg.thresholds.fc_down),
    ];

    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let x_range = resolve_x_range(
        cfg.x_lim,
        cfg.x_break,
        &fc_extent,
        &xs,
        &[cfg.thresholds.fc_up, cfg.thresholds.fc_down],
    )?;
    let y_range = resolve_y_range(cfg.y_lim, cfg.y_break, &padj_extent, &ys, &[h_line, 0.0])?;
    log::debug!("Axis ranges: x={:?} y={:?}", x_range, y_range);

    Ok(VolcanoFigure {
        title: cfg.plot_title.clone(),
        x_title: X_AXIS_TITLE.to_string(),
        y_title: Y_AXIS_TITLE.to_string(),
        points,
        labels,
        ref_lines,
        x_range,
        y_range,
        counts,
        skipped,
        style: FigureStyle::from_config(cfg),
    })
}
