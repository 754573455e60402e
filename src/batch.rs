use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::PlotConfig;
use crate::error::VolcanoError;
use crate::volcano::plot_volcano;

/// Split a comma-separated list of paths, dropping empty entries.
pub fn split_paths(csv: &str) -> Vec<PathBuf> {
    csv.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// `<dir>/<stem>.<ext>`, where `dir` defaults to the input's own directory.
pub fn derive_output_path(input: &Path, out_dir: Option<&Path>, ext: &str) -> PathBuf {
    let parent = out_dir.unwrap_or_else(|| input.parent().unwrap_or_else(|| Path::new(".")));
    let stem = input
        .file_stem()
        .unwrap_or_else(|| std::ffi::OsStr::new("volcano"));
    parent.join(format!("{}.{}", stem.to_string_lossy(), ext))
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, VolcanoError)>,
}

/// Render every input independently in parallel. One file failing does not stop the others.
pub fn run_batch(
    inputs: &[PathBuf],
    cfg: &PlotConfig,
    out_dir: Option<&Path>,
    ext: &str,
    threads: Option<usize>,
) -> BatchReport {
    if let Some(n) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok();
    }

    let outputs: Vec<PathBuf> = inputs
        .iter()
        .map(|input| derive_output_path(input, out_dir, ext))
        .collect();
    let mut claims: HashMap<&Path, usize> = HashMap::new();
    for out in &outputs {
        *claims.entry(out.as_path()).or_default() += 1;
    }

    // Inputs that would write the same image are refused, the rest still render.
    let results: Vec<(PathBuf, Result<PathBuf, VolcanoError>)> = inputs
        .par_iter()
        .zip(outputs.par_iter())
        .map(|(input, output)| {
            let res = if claims[output.as_path()] > 1 {
                Err(VolcanoError::config(format!(
                    "output {} is shared by several inputs; rename the inputs or drop -o",
                    output.display()
                )))
            } else {
                plot_volcano(input, cfg, output).map(|_| output.clone())
            };
            (input.clone(), res)
        })
        .collect();

    let mut report = BatchReport::default();
    for (input, res) in results {
        match res {
            Ok(out) => report.written.push(out),
            Err(e) => {
                log::error!("{}: {}", input.display(), e);
                report.failed.push((input, e));
            }
        }
    }
    log::info!(
        "Batch complete: {} written, {} failed",
        report.written.len(),
        report.failed.len()
    );
    report
}
