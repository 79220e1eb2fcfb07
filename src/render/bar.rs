use crate::model::{RunSummary, trans_bytes};
use anyhow::Context;
use log::info;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Render the per-size mean latencies of one run as a stacked bar chart
/// (`all_bar.png`). Segments stack bottom-up in the given verb order with a
/// per-verb legend; verbs missing at a size are skipped, so partial sweeps
/// still stack correctly.
pub fn render_bar_chart(
    summary: &RunSummary,
    verbs: &[&str],
    out_dir: &Path,
    uid: &str,
) -> crate::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;
    let path = out_dir.join("all_bar.png");

    // (size index, bottom, top) per verb; one draw_series call per verb so
    // each gets its own color and legend entry.
    let mut segments: BTreeMap<&str, Vec<(u32, f64, f64)>> = BTreeMap::new();
    let mut y_max = 0.0f64;
    for (i, &size) in summary.sizes.iter().enumerate() {
        for (verb, bottom, top) in summary.stack_for(size, verbs) {
            y_max = y_max.max(top);
            segments.entry(verb).or_default().push((i as u32, bottom, top));
        }
    }
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let labels: Vec<String> = summary.sizes.iter().map(|&s| trans_bytes(s)).collect();
    let n = summary.sizes.len().max(1) as u32;

    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("ibverbs latency for different transfer size @ {uid}"),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("packet size")
        .y_desc("latency: uSecond")
        .x_label_formatter(&|seg| match seg {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                labels.get(*i as usize).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .draw()?;

    for (vi, verb) in verbs.iter().enumerate() {
        let Some(segs) = segments.get(verb) else {
            continue;
        };
        let color = Palette99::pick(vi).to_rgba();
        chart
            .draw_series(segs.iter().map(|&(i, bottom, top)| {
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), bottom),
                        (SegmentValue::Exact(i + 1), top),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 10, 10);
                bar
            }))?
            .label(*verb)
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .label_font(("sans-serif", 13))
        .draw()?;

    root.present()?;
    info!("save: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RunData, RunSummary, SampleMap};

    #[test]
    fn bar_chart_written_for_two_sizes() {
        let mut data = RunData::new();
        data.insert(
            64,
            SampleMap::from([
                ("ibv_post_send".to_string(), vec![10, 20]),
                ("ibv_poll_cq".to_string(), vec![5]),
            ]),
        );
        data.insert(
            1024,
            SampleMap::from([("ibv_post_send".to_string(), vec![30])]),
        );

        let dir = tempfile::tempdir().unwrap();
        render_bar_chart(
            &RunSummary::build(&data),
            &crate::verbs::IBV_VERBS,
            dir.path(),
            "test-run",
        )
        .unwrap();
        assert!(dir.path().join("all_bar.png").is_file());
    }

    #[test]
    fn empty_run_still_produces_a_chart() {
        let dir = tempfile::tempdir().unwrap();
        render_bar_chart(
            &RunSummary::build(&RunData::new()),
            &crate::verbs::IBV_VERBS,
            dir.path(),
            "empty",
        )
        .unwrap();
        assert!(dir.path().join("all_bar.png").is_file());
    }
}
