//! Chart and table rendering for one run.

pub mod bar;
pub mod histogram;
pub mod table;

pub use bar::render_bar_chart;
pub use histogram::render_histograms;
pub use table::write_summary_csv;
