use plotters::style::RGBColor;
use regex::Regex;

use crate::error::{VolcanoError, VolcanoResult};

/// Matplotlib base and common CSS names.
const NAMED: &[(&str, RGBColor)] = &[
    ("red", RGBColor(255, 0, 0)),
    ("green", RGBColor(0, 128, 0)),
    ("blue", RGBColor(0, 0, 255)),
    ("grey", RGBColor(128, 128, 128)),
    ("gray", RGBColor(128, 128, 128)),
    ("lightgrey", RGBColor(211, 211, 211)),
    ("lightgray", RGBColor(211, 211, 211)),
    ("darkgrey", RGBColor(169, 169, 169)),
    ("darkgray", RGBColor(169, 169, 169)),
    ("black", RGBColor(0, 0, 0)),
    ("white", RGBColor(255, 255, 255)),
    ("orange", RGBColor(255, 165, 0)),
    ("purple", RGBColor(128, 0, 128)),
    ("magenta", RGBColor(255, 0, 255)),
    ("cyan", RGBColor(0, 255, 255)),
    ("yellow", RGBColor(255, 255, 0)),
    ("brown", RGBColor(165, 42, 42)),
    ("pink", RGBColor(255, 192, 203)),
    ("navy", RGBColor(0, 0, 128)),
    ("teal", RGBColor(0, 128, 128)),
    ("firebrick", RGBColor(178, 34, 34)),
    ("steelblue", RGBColor(70, 130, 180)),
    ("forestgreen", RGBColor(34, 139, 34)),
    // matplotlib single-letter shorthands
    ("r", RGBColor(255, 0, 0)),
    ("g", RGBColor(0, 128, 0)),
    ("b", RGBColor(0, 0, 255)),
    ("k", RGBColor(0, 0, 0)),
    ("w", RGBColor(255, 255, 255)),
    ("c", RGBColor(0, 191, 191)),
    ("m", RGBColor(191, 0, 191)),
    ("y", RGBColor(191, 191, 0)),
];

/// Parse a color given as a name, `#rgb`, `#rrggbb`, `rgb(r,g,b)` or `hsl(h,s%,l%)`.
pub fn parse_color(s: &str) -> VolcanoResult<RGBColor> {
    let t = s.trim().to_ascii_lowercase();
    if let Some((_, c)) = NAMED.iter().find(|(name, _)| *name == t) {
        return Ok(*c);
    }

    let re_hex = Regex::new(r"^#([0-9a-f]{3}|[0-9a-f]{6})$").expect("invalid regex");
    if let Some(cap) = re_hex.captures(&t) {
        let hex = &cap[1];
        let expanded: String = if hex.len() == 3 {
            hex.chars().flat_map(|c| [c, c]).collect()
        } else {
            hex.to_string()
        };
        let byte = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16);
        if let (Ok(r), Ok(g), Ok(b)) = (byte(0), byte(2), byte(4)) {
            return Ok(RGBColor(r, g, b));
        }
    }

    let re_rgb = Regex::new(r"^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$")
        .expect("invalid regex");
    if let Some(cap) = re_rgb.captures(&t) {
        let chan = |i: usize| cap[i].parse::<u8>();
        if let (Ok(r), Ok(g), Ok(b)) = (chan(1), chan(2), chan(3)) {
            return Ok(RGBColor(r, g, b));
        }
    }

    let re_hsl = Regex::new(
        r"^hsl\(\s*(\d+(?:\.\d+)?)\s*,\s*(\d+(?:\.\d+)?)%\s*,\s*(\d+(?:\.\d+)?)%\s*\)$",
    )
    .expect("invalid regex");
    if let Some(cap) = re_hsl.captures(&t) {
        let h: f64 = cap[1].parse().unwrap_or(0.0);
        let sat: f64 = cap[2].parse().unwrap_or(0.0);
        let l: f64 = cap[3].parse().unwrap_or(0.0);
        if sat <= 100.0 && l <= 100.0 {
            return Ok(hsl_to_rgb(h % 360.0, sat / 100.0, l / 100.0));
        }
    }

    Err(VolcanoError::config(format!("unrecognised color '{}'", s)))
}

/// Minimal HSL -> RGB conversion returning a Plotters RGBColor
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> RGBColor {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let (r1, g1, b1) = if (0.0..1.0).contains(&h_prime) {
        (c, x, 0.0)
    } else if (1.0..2.0).contains(&h_prime) {
        (x, c, 0.0)
    } else if (2.0..3.0).contains(&h_prime) {
        (0.0, c, x)
    } else if (3.0..4.0).contains(&h_prime) {
        (0.0, x, c)
    } else if (4.0..5.0).contains(&h_prime) {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    let m = l - c / 2.0;
    RGBColor(
        ((r1 + m).clamp(0.0, 1.0) * 255.0).round() as u8,
        ((g1 + m).clamp(0.0, 1.0) * 255.0).round() as u8,
        ((b1 + m).clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}
