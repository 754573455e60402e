use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use plotters::style::RGBColor;

use volcanoplotter::config::{self, FileConfig, PlotConfig};
use volcanoplotter::labels::LabelSelection;
use volcanoplotter::{batch, color, volcano};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = real_main() {
        eprintln!("[ERROR] {e:?}");
        std::process::exit(1);
    }
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
    if parts.len() != 2 {
        return Err(format!("expected two comma-separated numbers, got '{s}'"));
    }
    let a = parts[0]
        .parse::<f64>()
        .map_err(|e| format!("'{}': {e}", parts[0]))?;
    let b = parts[1]
        .parse::<f64>()
        .map_err(|e| format!("'{}': {e}", parts[1]))?;
    Ok((a, b))
}

fn parse_color_arg(s: &str) -> Result<RGBColor, String> {
    color::parse_color(s).map_err(|e| e.to_string())
}

fn parse_delimiter_arg(s: &str) -> Result<u8, String> {
    config::parse_delimiter(s).map_err(|e| e.to_string())
}

fn size_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .help(help)
        .long(id)
        .required(false)
        .value_parser(value_parser!(u32))
        .value_name("PT")
}

fn color_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .help(help)
        .long(id)
        .required(false)
        .value_parser(parse_color_arg)
        .value_name("COLOR")
}

fn cli() -> Command {
    Command::new("volcanoplotter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plot volcano figures (log2 fold-change vs. -log10 adjusted p-value)")
        .subcommand(
            Command::new("vol")
                .about("Volcano plot from a differential-expression table")
                .alias("volcano")
                .arg(
                    Arg::new("input")
                        .help("Delimited table (CSV/TSV) with id, fold-change and padj columns")
                        .short('i')
                        .long("input")
                        .required(false)
                        .value_name("FILE"),
                )
                .arg(
                    Arg::new("multi")
                        .help("Comma-separated tables; each is rendered to its own figure in parallel")
                        .long("multi")
                        .required(false)
                        .value_name("CSV"),
                )
                .group(ArgGroup::new("source").args(["input", "multi"]).required(true))
                .arg(
                    Arg::new("output")
                        .help("Output image (.png or .svg). With --multi: output directory. Default: next to the input")
                        .short('o')
                        .long("output")
                        .required(false)
                        .value_name("PATH"),
                )
                .arg(
                    Arg::new("format")
                        .help("Image format for --multi outputs")
                        .long("format")
                        .required(false)
                        .value_parser(["png", "svg"])
                        .default_value("png"),
                )
                .arg(
                    Arg::new("config")
                        .help("TOML file with plot options; command-line flags override it")
                        .short('c')
                        .long("config")
                        .required(false)
                        .value_name("TOML"),
                )
                .arg(
                    Arg::new("width")
                        .help("Output width in pixels (default 1000)")
                        .long("width")
                        .required(false)
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("height")
                        .help("Output height in pixels (default 800)")
                        .long("height")
                        .required(false)
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("threads")
                        .help("Rayon worker threads for --multi (optional)")
                        .long("threads")
                        .short('T')
                        .required(false)
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("id-col")
                        .help("Identifier column (default gene_name)")
                        .long("id-col")
                        .required(false),
                )
                .arg(
                    Arg::new("x-col")
                        .help("Fold-change column (default log2FoldChange)")
                        .long("x-col")
                        .required(false),
                )
                .arg(
                    Arg::new("y-col")
                        .help("Adjusted p-value column (default padj)")
                        .long("y-col")
                        .required(false),
                )
                .arg(
                    Arg::new("delimiter")
                        .help("Field delimiter, e.g. ',' ';' or '\\t'. Default: from extension or header")
                        .long("delimiter")
                        .required(false)
                        .value_parser(parse_delimiter_arg),
                )
                .arg(color_arg("up-color", "Color of up-regulated points (default red)"))
                .arg(color_arg("down-color", "Color of down-regulated points (default green)"))
                .arg(color_arg("neutral-color", "Color of non-significant points (default grey)"))
                .arg(
                    Arg::new("label")
                        .help("Label the top 10 points by |log2FC|")
                        .long("label")
                        .required(false)
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("label-genes")
                        .help("Comma-separated identifiers to label (implies --label)")
                        .long("label-genes")
                        .required(false)
                        .value_name("CSV")
                        .conflicts_with("label-top"),
                )
                .arg(
                    Arg::new("label-top")
                        .help("Label the N points with the largest |log2FC| (implies --label)")
                        .long("label-top")
                        .required(false)
                        .value_parser(value_parser!(usize))
                        .value_name("N"),
                )
                .arg(
                    Arg::new("title")
                        .help("Figure title (default 'Volcano plot')")
                        .long("title")
                        .required(false),
                )
                .arg(
                    Arg::new("point-size")
                        .help("Marker area in pt^2 (default 50)")
                        .long("point-size")
                        .required(false)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("alpha")
                        .help("Marker opacity in [0,1] (default 0.6)")
                        .long("alpha")
                        .required(false)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("x-lim")
                        .help("Explicit x range")
                        .long("x-lim")
                        .required(false)
                        .allow_hyphen_values(true)
                        .value_parser(parse_pair)
                        .value_name("MIN,MAX"),
                )
                .arg(
                    Arg::new("x-break")
                        .help("Pad the x data range by this amount on both sides")
                        .long("x-break")
                        .required(false)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("y-lim")
                        .help("Explicit y range")
                        .long("y-lim")
                        .required(false)
                        .allow_hyphen_values(true)
                        .value_parser(parse_pair)
                        .value_name("MIN,MAX"),
                )
                .arg(
                    Arg::new("y-break")
                        .help("y range becomes [-log10(max padj) - B, B]")
                        .long("y-break")
                        .required(false)
                        .value_parser(value_parser!(f64)),
                )
                .arg(size_arg("x-label-size", "x tick label font size (default 12)"))
                .arg(size_arg("y-label-size", "y tick label font size (default 12)"))
                .arg(size_arg("x-title-size", "x axis title font size (default 14)"))
                .arg(size_arg("y-title-size", "y axis title font size (default 14)"))
                .arg(size_arg("label-size", "Point label font size (default 10)"))
                .arg(size_arg("title-size", "Figure title font size (default 16)"))
                .arg(
                    Arg::new("fc-threshold")
                        .help("Positive and negative log2FC cutoffs (default 1,-1)")
                        .long("fc-threshold")
                        .required(false)
                        .allow_hyphen_values(true)
                        .value_parser(parse_pair)
                        .value_name("UP,DOWN"),
                )
                .arg(
                    Arg::new("padj-threshold")
                        .help("Adjusted p-value cutoff (default 0.05)")
                        .long("padj-threshold")
                        .required(false)
                        .value_parser(value_parser!(f64)),
                )
                .arg(color_arg("ref-line-color", "Threshold line color (default grey)"))
                .arg(
                    Arg::new("ref-line-width")
                        .help("Threshold line width in pixels (default 1)")
                        .long("ref-line-width")
                        .required(false)
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("solid-ref-lines")
                        .help("Draw threshold lines solid instead of dashed")
                        .long("solid-ref-lines")
                        .required(false)
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn set_from<T: Clone + Send + Sync + 'static>(slot: &mut T, sub: &ArgMatches, id: &str) {
    if let Some(v) = sub.get_one::<T>(id) {
        *slot = v.clone();
    }
}

/// Defaults, then the TOML file, then command-line flags.
fn build_config(sub: &ArgMatches) -> Result<PlotConfig> {
    let mut cfg = PlotConfig::default();
    if let Some(path) = sub.get_one::<String>("config") {
        let file = FileConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config: {}", path))?;
        cfg.apply_file(file)?;
        log::info!("Config: {}", path);
    }

    set_from(&mut cfg.id_col, sub, "id-col");
    set_from(&mut cfg.x_col, sub, "x-col");
    set_from(&mut cfg.y_col, sub, "y-col");
    if let Some(d) = sub.get_one::<u8>("delimiter") {
        cfg.delimiter = Some(*d);
    }
    set_from(&mut cfg.colors.up, sub, "up-color");
    set_from(&mut cfg.colors.down, sub, "down-color");
    set_from(&mut cfg.colors.neutral, sub, "neutral-color");

    if sub.get_flag("label") {
        cfg.label_genes = true;
    }
    if let Some(names) = sub.get_one::<String>("label-genes") {
        cfg.label_genes = true;
        cfg.genes_to_label = LabelSelection::explicit(
            names.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()),
        );
    }
    if let Some(n) = sub.get_one::<usize>("label-top") {
        cfg.label_genes = true;
        cfg.genes_to_label = LabelSelection::TopN(*n);
    }

    set_from(&mut cfg.plot_title, sub, "title");
    set_from(&mut cfg.point_size, sub, "point-size");
    set_from(&mut cfg.alpha, sub, "alpha");
    if let Some(l) = sub.get_one::<(f64, f64)>("x-lim") {
        cfg.x_lim = Some(*l);
    }
    if let Some(b) = sub.get_one::<f64>("x-break") {
        cfg.x_break = Some(*b);
    }
    if let Some(l) = sub.get_one::<(f64, f64)>("y-lim") {
        cfg.y_lim = Some(*l);
    }
    if let Some(b) = sub.get_one::<f64>("y-break") {
        cfg.y_break = Some(*b);
    }
    set_from(&mut cfg.x_label_size, sub, "x-label-size");
    set_from(&mut cfg.y_label_size, sub, "y-label-size");
    set_from(&mut cfg.x_title_size, sub, "x-title-size");
    set_from(&mut cfg.y_title_size, sub, "y-title-size");
    set_from(&mut cfg.label_size, sub, "label-size");
    set_from(&mut cfg.title_size, sub, "title-size");
    set_from(&mut cfg.width, sub, "width");
    set_from(&mut cfg.height, sub, "height");
    if let Some(&(up, down)) = sub.get_one::<(f64, f64)>("fc-threshold") {
        cfg.thresholds.fc_up = up;
        cfg.thresholds.fc_down = down;
    }
    set_from(&mut cfg.thresholds.padj, sub, "padj-threshold");
    set_from(&mut cfg.ref_line.color, sub, "ref-line-color");
    set_from(&mut cfg.ref_line.width, sub, "ref-line-width");
    if sub.get_flag("solid-ref-lines") {
        cfg.ref_line.dashed = false;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn real_main() -> Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("vol", sub)) => {
            let cfg = build_config(sub)?;
            log::info!("Size  : {}x{}", cfg.width, cfg.height);
            log::info!(
                "Thresh: log2FC >= {} / <= {}, padj <= {}",
                cfg.thresholds.fc_up,
                cfg.thresholds.fc_down,
                cfg.thresholds.padj
            );

            if let Some(multi) = sub.get_one::<String>("multi") {
                let inputs = batch::split_paths(multi);
                if inputs.is_empty() {
                    anyhow::bail!("--multi must list at least one file");
                }
                let out_dir: Option<PathBuf> = sub.get_one::<String>("output").map(PathBuf::from);
                if let Some(dir) = &out_dir {
                    std::fs::create_dir_all(dir).with_context(|| {
                        format!("Failed to create output directory {}", dir.display())
                    })?;
                }
                let ext = sub
                    .get_one::<String>("format")
                    .map(String::as_str)
                    .unwrap_or("png");
                let threads = sub.get_one::<usize>("threads").copied();
                if let Some(n) = threads {
                    log::info!("rayon threads = {}", n);
                }
                log::info!("MULTI : {} files", inputs.len());

                let report = batch::run_batch(&inputs, &cfg, out_dir.as_deref(), ext, threads);
                if !report.failed.is_empty() {
                    anyhow::bail!(
                        "{} of {} files failed",
                        report.failed.len(),
                        inputs.len()
                    );
                }
                Ok(())
            } else {
                let input: PathBuf = sub
                    .get_one::<String>("input")
                    .map(PathBuf::from)
                    .context("either --input or --multi is required")?;
                let output: PathBuf = match sub.get_one::<String>("output") {
                    Some(o) => PathBuf::from(o),
                    None => batch::derive_output_path(&input, None, "png"),
                };
                log::info!("Input : {}", input.display());
                log::info!("Output: {}", output.display());

                volcano::plot_volcano(&input, &cfg, &output)
                    .with_context(|| format!("Failed to plot {}", input.display()))?;
                Ok(())
            }
        }
        _ => {
            // No subcommand: print help
            cli().print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(args: &[&str]) -> ArgMatches {
        let mut full = vec!["volcanoplotter", "vol"];
        full.extend_from_slice(args);
        let m = cli().try_get_matches_from(full).unwrap();
        m.subcommand_matches("vol").unwrap().clone()
    }

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let sub = matches(&[
            "-i",
            "res.csv",
            "--fc-threshold",
            "2,-1.5",
            "--padj-threshold",
            "0.01",
            "--x-lim",
            "-6,6",
            "--up-color",
            "#ff8800",
            "--label-top",
            "5",
        ]);
        let cfg = build_config(&sub).unwrap();
        assert_eq!(cfg.thresholds.fc_up, 2.0);
        assert_eq!(cfg.thresholds.fc_down, -1.5);
        assert_eq!(cfg.thresholds.padj, 0.01);
        assert_eq!(cfg.x_lim, Some((-6.0, 6.0)));
        assert_eq!(cfg.colors.up, RGBColor(255, 136, 0));
        assert!(cfg.label_genes);
        assert_eq!(cfg.genes_to_label, LabelSelection::TopN(5));
    }

    #[test]
    fn label_genes_list() {
        let sub = matches(&["-i", "res.csv", "--label-genes", "TP53, MYC"]);
        let cfg = build_config(&sub).unwrap();
        assert_eq!(cfg.genes_to_label, LabelSelection::explicit(["TP53", "MYC"]));
    }

    #[test]
    fn misordered_thresholds_are_rejected() {
        let sub = matches(&["-i", "res.csv", "--fc-threshold", "-1,1"]);
        assert!(build_config(&sub).is_err());
    }

    #[test]
    fn config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("volcano.toml");
        std::fs::write(&toml_path, "plot_title = \"From file\"\nalpha = 0.3\n").unwrap();
        let sub = matches(&[
            "-i",
            "res.csv",
            "-c",
            toml_path.to_str().unwrap(),
            "--alpha",
            "0.9",
        ]);
        let cfg = build_config(&sub).unwrap();
        assert_eq!(cfg.plot_title, "From file");
        assert_eq!(cfg.alpha, 0.9);
    }

    #[test]
    fn input_or_multi_required() {
        assert!(cli().try_get_matches_from(["volcanoplotter", "vol"]).is_err());
    }
}
