use crate::model::{RunSummary, trans_bytes};
use anyhow::Context;
use log::info;
use std::fs;
use std::path::Path;

/// Write `avg_latency.csv`: a header row of human-readable sizes followed by
/// one row per known verb observed in the run, in the fixed verb order. Every
/// record carries a trailing empty field, matching the format the benchmark's
/// downstream tooling expects. A verb observed at only some sizes gets a
/// shorter row covering just those sizes.
pub fn write_summary_csv(
    summary: &RunSummary,
    verbs: &[&str],
    out_dir: &Path,
) -> crate::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;
    let path = out_dir.join("avg_latency.csv");

    // Rows differ in length when a verb is missing at some sizes.
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut header = vec!["-".to_string()];
    header.extend(summary.sizes.iter().map(|&s| trans_bytes(s)));
    header.push(String::new());
    writer.write_record(&header)?;

    for &verb in verbs {
        let Some(series) = summary.series.get(verb) else {
            continue;
        };
        let mut row = vec![verb.to_string()];
        row.extend(series.iter().map(|avg| format!("{avg:.2}")));
        row.push(String::new());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    info!("save: {}", path.display());
    Ok(())
}
