use std::path::Path;

use plotters::style::RGBColor;
use serde::Deserialize;

use crate::classify::{CategoryColors, Thresholds};
use crate::color::parse_color;
use crate::error::{VolcanoError, VolcanoResult};
use crate::labels::LabelSelection;

/// Style of the three threshold reference lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLineStyle {
    pub color: RGBColor,
    pub width: u32,
    pub dashed: bool,
}

impl Default for ReferenceLineStyle {
    fn default() -> Self {
        ReferenceLineStyle {
            color: RGBColor(128, 128, 128),
            width: 1,
            dashed: true,
        }
    }
}

/// Everything that shapes one volcano figure. `Default` gives the classic
/// DESeq2-style setup: `gene_name` / `log2FoldChange` / `padj`, cutoffs
/// ±1 and 0.05, red/green/grey.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub id_col: String,
    pub x_col: String,
    pub y_col: String,
    pub delimiter: Option<u8>,

    pub colors: CategoryColors,
    pub thresholds: Thresholds,

    pub label_genes: bool,
    pub genes_to_label: LabelSelection,

    pub plot_title: String,
    pub point_size: f64,
    pub alpha: f64,

    pub x_lim: Option<(f64, f64)>,
    pub x_break: Option<f64>,
    pub y_lim: Option<(f64, f64)>,
    pub y_break: Option<f64>,

    pub x_label_size: u32,
    pub x_title_size: u32,
    pub y_label_size: u32,
    pub y_title_size: u32,
    pub label_size: u32,
    pub title_size: u32,

    pub ref_line: ReferenceLineStyle,

    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            id_col: "gene_name".to_string(),
            x_col: "log2FoldChange".to_string(),
            y_col: "padj".to_string(),
            delimiter: None,
            colors: CategoryColors::default(),
            thresholds: Thresholds::default(),
            label_genes: false,
            genes_to_label: LabelSelection::Default,
            plot_title: "Volcano plot".to_string(),
            point_size: 50.0,
            alpha: 0.6,
            x_lim: None,
            x_break: None,
            y_lim: None,
            y_break: None,
            x_label_size: 12,
            x_title_size: 14,
            y_label_size: 12,
            y_title_size: 14,
            label_size: 10,
            title_size: 16,
            ref_line: ReferenceLineStyle::default(),
            width: 1000,
            height: 800,
        }
    }
}

impl PlotConfig {
    /// Reject settings that cannot produce a meaningful figure.
    pub fn validate(&self) -> VolcanoResult<()> {
        self.thresholds.validate()?;
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(VolcanoError::config(format!(
                "alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        if !self.point_size.is_finite() || self.point_size <= 0.0 {
            return Err(VolcanoError::config(format!(
                "point size must be positive, got {}",
                self.point_size
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(VolcanoError::config(format!(
                "figure size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        for (name, col) in [("id", &self.id_col), ("x", &self.x_col), ("y", &self.y_col)] {
            if col.trim().is_empty() {
                return Err(VolcanoError::config(format!("{name} column name is empty")));
            }
        }
        Ok(())
    }

    /// Overlay the fields present in `file` onto `self`.
    pub fn apply_file(&mut self, file: FileConfig) -> VolcanoResult<()> {
        if let Some(v) = file.id_col {
            self.id_col = v;
        }
        if let Some(v) = file.x_col {
            self.x_col = v;
        }
        if let Some(v) = file.y_col {
            self.y_col = v;
        }
        if let Some(v) = file.delimiter {
            self.delimiter = Some(parse_delimiter(&v)?);
        }
        if let Some(v) = file.up_color {
            self.colors.up = parse_color(&v)?;
        }
        if let Some(v) = file.down_color {
            self.colors.down = parse_color(&v)?;
        }
        if let Some(v) = file.neutral_color {
            self.colors.neutral = parse_color(&v)?;
        }
        if let Some(v) = file.label_genes {
            self.label_genes = v;
        }
        if let Some(v) = file.genes_to_label {
            self.genes_to_label = match v {
                GenesToLabel::Count(n) => LabelSelection::TopN(n),
                GenesToLabel::Names(names) => LabelSelection::explicit(names),
            };
        }
        if let Some(v) = file.plot_title {
            self.plot_title = v;
        }
        if let Some(v) = file.point_size {
            self.point_size = v;
        }
        if let Some(v) = file.alpha {
            self.alpha = v;
        }
        if let Some([lo, hi]) = file.x_lim {
            self.x_lim = Some((lo, hi));
        }
        if let Some(v) = file.x_break {
            self.x_break = Some(v);
        }
        if let Some([lo, hi]) = file.y_lim {
            self.y_lim = Some((lo, hi));
        }
        if let Some(v) = file.y_break {
            self.y_break = Some(v);
        }
        set_if(&mut self.x_label_size, file.x_label_size);
        set_if(&mut self.x_title_size, file.x_title_size);
        set_if(&mut self.y_label_size, file.y_label_size);
        set_if(&mut self.y_title_size, file.y_title_size);
        set_if(&mut self.label_size, file.label_size);
        set_if(&mut self.title_size, file.title_size);
        set_if(&mut self.width, file.width);
        set_if(&mut self.height, file.height);
        if let Some([up, down]) = file.log2fc_threshold {
            self.thresholds.fc_up = up;
            self.thresholds.fc_down = down;
        }
        if let Some(v) = file.padj_threshold {
            self.thresholds.padj = v;
        }
        if let Some(rl) = file.ref_line {
            if let Some(c) = rl.color {
                self.ref_line.color = parse_color(&c)?;
            }
            set_if(&mut self.ref_line.width, rl.width);
            if let Some(d) = rl.dashed {
                self.ref_line.dashed = d;
            }
        }
        Ok(())
    }
}

fn set_if<T>(slot: &mut T, v: Option<T>) {
    if let Some(v) = v {
        *slot = v;
    }
}

/// Accepts a single ASCII character, or the escapes `\t` / `tab`.
pub fn parse_delimiter(s: &str) -> VolcanoResult<u8> {
    match s {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(VolcanoError::config(format!(
            "delimiter must be a single ASCII character, got '{s}'"
        ))),
    }
}

/// `genes_to_label = 5` or `genes_to_label = ["TP53", "MYC"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GenesToLabel {
    Count(usize),
    Names(Vec<String>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefLineFile {
    pub color: Option<String>,
    pub width: Option<u32>,
    pub dashed: Option<bool>,
}

/// On-disk TOML shape. Every key is optional; absent keys keep the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub id_col: Option<String>,
    pub x_col: Option<String>,
    pub y_col: Option<String>,
    pub delimiter: Option<String>,
    pub up_color: Option<String>,
    pub down_color: Option<String>,
    pub neutral_color: Option<String>,
    pub label_genes: Option<bool>,
    pub genes_to_label: Option<GenesToLabel>,
    pub plot_title: Option<String>,
    pub point_size: Option<f64>,
    pub alpha: Option<f64>,
    pub x_lim: Option<[f64; 2]>,
    pub x_break: Option<f64>,
    pub y_lim: Option<[f64; 2]>,
    pub y_break: Option<f64>,
    pub x_label_size: Option<u32>,
    pub x_title_size: Option<u32>,
    pub y_label_size: Option<u32>,
    pub y_title_size: Option<u32>,
    pub label_size: Option<u32>,
    pub title_size: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "log2FC_threshold", alias = "log2fc_threshold")]
    pub log2fc_threshold: Option<[f64; 2]>,
    pub padj_threshold: Option<f64>,
    pub ref_line: Option<RefLineFile>,
}

impl FileConfig {
    pub fn from_toml_str(text: &str) -> VolcanoResult<Self> {
        toml::from_str(text).map_err(|e| VolcanoError::config(format!("invalid config: {e}")))
    }

    pub fn load(path: &Path) -> VolcanoResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            VolcanoError::config(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_setup() {
        let c = PlotConfig::default();
        assert_eq!(c.id_col, "gene_name");
        assert_eq!(c.x_col, "log2FoldChange");
        assert_eq!(c.y_col, "padj");
        assert_eq!(c.thresholds, Thresholds::default());
        assert_eq!(c.genes_to_label, LabelSelection::Default);
        assert!(!c.label_genes);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn toml_overrides_only_present_keys() {
        let file = FileConfig::from_toml_str(
            r##"
            x_col = "lfc"
            up_color = "#d62728"
            label_genes = true
            genes_to_label = ["TP53", "MYC"]
            log2FC_threshold = [1.5, -2]
            padj_threshold = 0.01
            x_lim = [-8, 8]

            [ref_line]
            color = "black"
            dashed = false
            "##,
        )
        .unwrap();
        let mut c = PlotConfig::default();
        c.apply_file(file).unwrap();
        assert_eq!(c.x_col, "lfc");
        assert_eq!(c.y_col, "padj");
        assert_eq!(c.colors.up, RGBColor(0xd6, 0x27, 0x28));
        assert_eq!(c.colors.down, CategoryColors::default().down);
        assert_eq!(c.genes_to_label, LabelSelection::explicit(["MYC", "TP53"]));
        assert_eq!(c.thresholds.fc_up, 1.5);
        assert_eq!(c.thresholds.fc_down, -2.0);
        assert_eq!(c.thresholds.padj, 0.01);
        assert_eq!(c.x_lim, Some((-8.0, 8.0)));
        assert_eq!(c.ref_line.color, RGBColor(0, 0, 0));
        assert!(!c.ref_line.dashed);
        assert_eq!(c.ref_line.width, 1);
    }

    #[test]
    fn genes_to_label_count() {
        let file = FileConfig::from_toml_str("genes_to_label = 5").unwrap();
        let mut c = PlotConfig::default();
        c.apply_file(file).unwrap();
        assert_eq!(c.genes_to_label, LabelSelection::TopN(5));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            FileConfig::from_toml_str("colour = \"red\""),
            Err(VolcanoError::Configuration(_))
        ));
    }

    #[test]
    fn bad_color_in_file_is_rejected() {
        let file = FileConfig::from_toml_str("neutral_color = \"greyish\"").unwrap();
        assert!(PlotConfig::default().apply_file(file).is_err());
    }

    #[test]
    fn validate_catches_alpha_and_thresholds() {
        let mut c = PlotConfig::default();
        c.alpha = 1.2;
        assert!(c.validate().is_err());

        let mut c = PlotConfig::default();
        c.thresholds.fc_up = -2.0;
        assert!(matches!(c.validate(), Err(VolcanoError::Configuration(_))));
    }

    #[test]
    fn demo_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/volcano.toml");
        let mut c = PlotConfig::default();
        c.apply_file(FileConfig::load(&path).unwrap()).unwrap();
        assert!(c.validate().is_ok());
        assert_eq!(c.genes_to_label, LabelSelection::TopN(5));
        assert_eq!(c.x_break, Some(1.0));
        assert_eq!(c.colors.up, RGBColor(178, 34, 34));
    }

    #[test]
    fn delimiters() {
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert!(parse_delimiter("::").is_err());
    }
}
