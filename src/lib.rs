//! Volcano plots from differential-expression tables.
//!
//! [`volcano::build_volcano`] loads a delimited table, classifies each row as
//! up / down / neutral against fold-change and adjusted p-value cutoffs and
//! returns a [`figure::VolcanoFigure`]; [`volcano::plot_volcano`] additionally
//! draws it with plotters.

pub mod axis;
pub mod batch;
pub mod classify;
pub mod color;
pub mod config;
pub mod error;
pub mod figure;
pub mod labels;
pub mod render;
pub mod table;
pub mod volcano;

pub use config::PlotConfig;
pub use error::{VolcanoError, VolcanoResult};
pub use figure::VolcanoFigure;
pub use volcano::{build_volcano, plot_volcano};
