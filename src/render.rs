use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::classify::Category;
use crate::error::{VolcanoError, VolcanoResult};
use crate::figure::{RefLine, VolcanoFigure};

/// Pixels per typographic point at the reference width (10 in at 100 dpi).
const REF_WIDTH_PX: f64 = 1000.0;
const PX_PER_PT: f64 = 100.0 / 72.0;

/// Number of dashes drawn along a full-span reference line.
const DASHES_PER_LINE: usize = 60;

fn render_err<E: std::fmt::Display>(e: E) -> VolcanoError {
    VolcanoError::Render(e.to_string())
}

fn within(r: &Range<f64>, v: f64) -> bool {
    v >= r.start && v <= r.end
}

/// Font points to pixels, scaled with the output width.
fn pt_to_px(pt: u32, width: u32) -> f64 {
    pt as f64 * PX_PER_PT * (width as f64 / REF_WIDTH_PX)
}

/// Marker radius in pixels for a scatter size given as area in pt².
pub fn marker_radius(point_size: f64, width: u32) -> u32 {
    let diameter_pt = point_size.max(0.0).sqrt();
    let r = diameter_pt / 2.0 * PX_PER_PT * (width as f64 / REF_WIDTH_PX);
    (r.round() as u32).max(1)
}

/// Split the segment a→b into `dashes` visible pieces with equal gaps between.
pub fn dash_segments(a: (f64, f64), b: (f64, f64), dashes: usize) -> Vec<[(f64, f64); 2]> {
    let pieces = dashes.max(1) * 2 - 1;
    let (dx, dy) = ((b.0 - a.0) / pieces as f64, (b.1 - a.1) / pieces as f64);
    (0..pieces)
        .step_by(2)
        .map(|i| {
            let t0 = i as f64;
            let t1 = t0 + 1.0;
            [(a.0 + dx * t0, a.1 + dy * t0), (a.0 + dx * t1, a.1 + dy * t1)]
        })
        .collect()
}

/// Write `fig` to `output`. `.svg` uses the SVG backend, anything else PNG.
pub fn draw(fig: &VolcanoFigure, output: &Path) -> VolcanoResult<()> {
    let size = (fig.style.width, fig.style.height);
    let is_svg = output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if is_svg {
        let root = SVGBackend::new(output, size).into_drawing_area();
        draw_on(&root, fig)?;
    } else {
        let root = BitMapBackend::new(output, size).into_drawing_area();
        draw_on(&root, fig)?;
    }
    log::info!(
        "Wrote {} ({} points, {} labels)",
        output.display(),
        fig.points.len(),
        fig.labels.len()
    );
    Ok(())
}

fn draw_on<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    fig: &VolcanoFigure,
) -> VolcanoResult<()> {
    let st = &fig.style;
    let w = st.width;
    root.fill(&WHITE).map_err(render_err)?;

    let y_title_px = pt_to_px(st.y_title_size, w);
    let y_area = (pt_to_px(st.y_label_size, w) * 4.0 + y_title_px * 1.5) as u32;
    let x_area = (pt_to_px(st.x_label_size, w) * 1.5 + pt_to_px(st.x_title_size, w) * 2.0) as u32;

    let mut chart = ChartBuilder::on(root)
        .caption(&fig.title, ("sans-serif", pt_to_px(st.title_size, w)))
        .margin(20)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(fig.x_range.clone(), fig.y_range.clone())
        .map_err(render_err)?;

    // The mesh only takes one axis-title style, so the y title is drawn separately below.
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(fig.x_title.as_str())
        .axis_desc_style(("sans-serif", pt_to_px(st.x_title_size, w)))
        .x_label_style(("sans-serif", pt_to_px(st.x_label_size, w)))
        .y_label_style(("sans-serif", pt_to_px(st.y_label_size, w)))
        .draw()
        .map_err(render_err)?;

    let (_, root_h) = root.dim_in_pixel();
    root.draw(&Text::new(
        fig.y_title.clone(),
        (20 + (y_title_px * 0.6) as i32, root_h as i32 / 2),
        ("sans-serif", y_title_px)
            .into_font()
            .transform(FontTransform::Rotate270)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))
    .map_err(render_err)?;

    // Reference lines first (lowest layer)
    let (x0, x1) = (fig.x_range.start, fig.x_range.end);
    let (y0, y1) = (fig.y_range.start, fig.y_range.end);
    let line_style = st.ref_line.color.stroke_width(st.ref_line.width);
    for line in &fig.ref_lines {
        let (a, b) = match *line {
            RefLine::Horizontal(y) if within(&fig.y_range, y) => ((x0, y), (x1, y)),
            RefLine::Vertical(x) if within(&fig.x_range, x) => ((x, y0), (x, y1)),
            _ => continue,
        };
        let segments = if st.ref_line.dashed {
            dash_segments(a, b, DASHES_PER_LINE)
        } else {
            vec![[a, b]]
        };
        chart
            .draw_series(
                segments
                    .into_iter()
                    .map(|seg| PathElement::new(seg.to_vec(), line_style)),
            )
            .map_err(render_err)?;
    }

    // Neutral first, Up last (topmost)
    let radius = marker_radius(st.point_size, w);
    for cat in [Category::Neutral, Category::Down, Category::Up] {
        let fill = st.colors.color_of(cat).mix(st.alpha).filled();
        chart
            .draw_series(
                fig.points_in(cat)
                    .filter(|p| within(&fig.x_range, p.x) && within(&fig.y_range, p.y))
                    .map(|p| Circle::new((p.x, p.y), radius, fill)),
            )
            .map_err(render_err)?;
    }

    let label_font = ("sans-serif", pt_to_px(st.label_size, w))
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Bottom));
    chart
        .draw_series(
            fig.labels
                .iter()
                .filter(|l| within(&fig.x_range, l.x) && within(&fig.y_range, l.y))
                .map(|l| Text::new(l.text.clone(), (l.x, l.y), label_font.clone())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashes_cover_the_segment_ends() {
        let segs = dash_segments((0.0, 0.0), (9.0, 0.0), 5);
        assert_eq!(segs.len(), 5);
        assert_eq!(segs[0], [(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(segs[4], [(8.0, 0.0), (9.0, 0.0)]);
    }

    #[test]
    fn single_dash_is_solid() {
        let segs = dash_segments((1.0, 2.0), (1.0, 5.0), 1);
        assert_eq!(segs, vec![[(1.0, 2.0), (1.0, 5.0)]]);
    }

    #[test]
    fn marker_radius_scales_with_area_and_width() {
        assert_eq!(marker_radius(50.0, 1000), 5);
        assert_eq!(marker_radius(50.0, 2000), 10);
        assert_eq!(marker_radius(0.0, 1000), 1);
    }

    #[test]
    fn points_to_pixels() {
        assert!((pt_to_px(72, 1000) - 100.0).abs() < 1e-9);
    }
}
