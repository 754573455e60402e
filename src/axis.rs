use std::ops::Range;

use crate::error::{VolcanoError, VolcanoResult};

/// Fraction of the data span added on each side when nothing is specified.
const AUTO_MARGIN: f64 = 0.05;

fn check_lim(axis: &str, lim: (f64, f64)) -> VolcanoResult<Range<f64>> {
    let (lo, hi) = lim;
    if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
        return Err(VolcanoError::config(format!(
            "{axis} limit must be finite with min < max, got ({lo}, {hi})"
        )));
    }
    Ok(lo..hi)
}

fn check_break(axis: &str, brk: f64) -> VolcanoResult<f64> {
    if !brk.is_finite() || brk < 0.0 {
        return Err(VolcanoError::config(format!(
            "{axis} break must be a non-negative number, got {brk}"
        )));
    }
    Ok(brk)
}

/// Extent of `values` plus any `extra` positions (reference lines), padded.
fn auto_range(values: &[f64], extra: &[f64]) -> Range<f64> {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &v in values.iter().chain(extra) {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo <= f64::EPSILON {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * AUTO_MARGIN;
    (lo - pad)..(hi + pad)
}

/// x axis: explicit limit, else `[min - break, max + break]`, else auto.
/// A zero break counts as unset.
pub fn resolve_x_range(
    lim: Option<(f64, f64)>,
    brk: Option<f64>,
    fcs: &[f64],
    xs: &[f64],
    ref_lines: &[f64],
) -> VolcanoResult<Range<f64>> {
    if let Some(l) = lim {
        return check_lim("x", l);
    }
    if let Some(b) = brk.filter(|&b| b != 0.0) {
        let b = check_break("x", b)?;
        let lo = fcs.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = fcs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() {
            return check_lim("x", (lo - b, hi + b));
        }
    }
    Ok(auto_range(xs, ref_lines))
}

/// y axis: explicit limit, else `[-log10(max padj) - break, break]`, else auto.
/// A zero break counts as unset.
pub fn resolve_y_range(
    lim: Option<(f64, f64)>,
    brk: Option<f64>,
    padjs: &[f64],
    ys: &[f64],
    ref_lines: &[f64],
) -> VolcanoResult<Range<f64>> {
    if let Some(l) = lim {
        return check_lim("y", l);
    }
    if let Some(b) = brk.filter(|&b| b != 0.0) {
        let b = check_break("y", b)?;
        let max_p = padjs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max_p.is_finite() && max_p > 0.0 {
            // very small padj maxima put the lower end above the upper one
            let (a, z) = (-max_p.log10() - b, b);
            return check_lim("y", (a.min(z), a.max(z)));
        }
    }
    Ok(auto_range(ys, ref_lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_limit_is_verbatim() {
        let r = resolve_x_range(Some((-10.0, 10.0)), Some(2.0), &[-3.0, 5.0], &[-3.0, 5.0], &[]).unwrap();
        assert_eq!(r, -10.0..10.0);
    }

    #[test]
    fn x_break_pads_data_extent() {
        let r = resolve_x_range(None, Some(2.0), &[-3.0, 0.0, 5.0], &[0.0], &[1.0, -1.0]).unwrap();
        assert_eq!(r, -5.0..7.0);
    }

    #[test]
    fn y_break_uses_max_padj() {
        let r = resolve_y_range(None, Some(1.0), &[0.01, 0.1], &[2.0, 1.0], &[]).unwrap();
        assert!((r.start - 0.0).abs() < 1e-12);
        assert!((r.end - 1.0).abs() < 1e-12);

        let r = resolve_y_range(None, Some(0.5), &[1.0, 0.2], &[0.0, 0.7], &[]).unwrap();
        assert_eq!(r, -0.5..0.5);
    }

    #[test]
    fn y_break_endpoints_are_ordered() {
        let r = resolve_y_range(None, Some(1.0), &[0.001], &[3.0], &[]).unwrap();
        assert!((r.start - 1.0).abs() < 1e-12);
        assert!((r.end - 2.0).abs() < 1e-12);
    }

    #[test]
    fn auto_range_includes_reference_lines_with_margin() {
        let r = resolve_x_range(None, None, &[0.0, 0.5], &[0.0, 0.5], &[1.0, -1.0]).unwrap();
        assert!((r.start - (-1.1)).abs() < 1e-12);
        assert!((r.end - 1.1).abs() < 1e-12);
    }

    #[test]
    fn degenerate_extent_is_widened() {
        let r = resolve_y_range(None, None, &[0.1], &[1.0], &[]).unwrap();
        assert_eq!(r, 0.0..2.0);
    }

    #[test]
    fn inverted_limit_is_configuration_error() {
        assert!(matches!(
            resolve_x_range(Some((3.0, -3.0)), None, &[0.0], &[0.0], &[]),
            Err(VolcanoError::Configuration(_))
        ));
    }

    #[test]
    fn zero_break_falls_back_to_auto() {
        let r = resolve_x_range(None, Some(0.0), &[2.0], &[2.0], &[]).unwrap();
        assert_eq!(r, 1.0..3.0);
        let r = resolve_x_range(None, Some(0.0), &[-3.0, 5.0], &[-3.0, 5.0], &[]).unwrap();
        assert_eq!(r, auto_range(&[-3.0, 5.0], &[]));

        let r = resolve_y_range(None, Some(0.0), &[1.0], &[0.0], &[]).unwrap();
        assert_eq!(r, -1.0..1.0);
        let r = resolve_y_range(None, Some(0.0), &[0.01, 0.5], &[2.0, 0.3], &[1.3]).unwrap();
        assert_eq!(r, auto_range(&[2.0, 0.3], &[1.3]));
    }

    #[test]
    fn negative_break_is_configuration_error() {
        assert!(resolve_y_range(None, Some(-1.0), &[0.5], &[0.3], &[]).is_err());
    }
}
