use std::path::Path;

use crate::config::PlotConfig;
use crate::error::VolcanoResult;
use crate::figure::{build_figure, VolcanoFigure};
use crate::render;
use crate::table::load_table;

/// Load, classify and lay out one volcano figure without drawing it.
pub fn build_volcano(input: &Path, cfg: &PlotConfig) -> VolcanoResult<VolcanoFigure> {
    cfg.validate()?;
    let table = load_table(input, cfg.delimiter)?;
    build_figure(&table, cfg)
}

/// [`build_volcano`] then draw the figure to `output`.
pub fn plot_volcano(input: &Path, cfg: &PlotConfig, output: &Path) -> VolcanoResult<VolcanoFigure> {
    let fig = build_volcano(input, cfg)?;
    if !fig.labels.is_empty() {
        log::info!("Labels: {}", fig.label_texts().join(", "));
    }
    render::draw(&fig, output)?;
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::error::VolcanoError;
    use crate::labels::LabelSelection;
    use std::io::Write;

    fn input(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    const DESEQ: &str = "gene_name,baseMean,log2FoldChange,pvalue,padj\n\
                         TP53,1200,-3.2,1e-9,1e-7\n\
                         MYC,800,4.1,1e-12,1e-10\n\
                         GAPDH,5000,0.05,0.8,0.9\n\
                         EGFR,300,1.2,0.01,0.04\n\
                         KRAS,150,-1.1,0.02,0.06\n\
                         BRCA1,90,NA,NA,NA\n";

    #[test]
    fn repeated_calls_agree() {
        let f = input(DESEQ);
        let cfg = PlotConfig {
            label_genes: true,
            genes_to_label: LabelSelection::TopN(3),
            ..PlotConfig::default()
        };
        let a = build_volcano(f.path(), &cfg).unwrap();
        let b = build_volcano(f.path(), &cfg).unwrap();
        assert_eq!(a.categories(), b.categories());
        assert_eq!(a.label_texts(), b.label_texts());
        assert_eq!(a, b);
        assert_eq!(
            a.categories(),
            vec![Category::Down, Category::Up, Category::Neutral, Category::Up, Category::Neutral]
        );
        assert_eq!(a.label_texts(), vec!["MYC", "TP53", "EGFR"]);
        assert_eq!(a.skipped, 1);
    }

    #[test]
    fn invalid_thresholds_fail_before_reading() {
        let cfg = PlotConfig {
            thresholds: crate::classify::Thresholds {
                fc_up: -1.0,
                fc_down: 1.0,
                padj: 0.05,
            },
            ..PlotConfig::default()
        };
        let err = build_volcano(Path::new("/no/such/file.csv"), &cfg).unwrap_err();
        assert!(matches!(err, VolcanoError::Configuration(_)));
    }

    #[test]
    fn missing_column_writes_nothing() {
        let f = input(DESEQ);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.png");
        let cfg = PlotConfig {
            x_col: "nonexistent".to_string(),
            ..PlotConfig::default()
        };
        let err = plot_volcano(f.path(), &cfg, &out).unwrap_err();
        assert!(matches!(err, VolcanoError::ColumnNotFound { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn missing_input_is_data_load_error() {
        let err = build_volcano(Path::new("/no/such/file.csv"), &PlotConfig::default()).unwrap_err();
        assert!(matches!(err, VolcanoError::DataLoad { .. }));
    }

    #[test]
    fn renders_svg() {
        let f = input(DESEQ);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("volcano.svg");
        let cfg = PlotConfig {
            label_genes: true,
            ..PlotConfig::default()
        };
        plot_volcano(f.path(), &cfg, &out).unwrap();
        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains("MYC"));
        assert!(svg.contains("Volcano plot"));
        assert!(svg.contains("<circle"));
    }
}
