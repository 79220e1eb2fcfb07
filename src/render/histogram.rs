use crate::model::SampleMap;
use anyhow::Context;
use log::info;
use plotters::prelude::*;
use std::fs;
use std::path::Path;

const BINS: usize = 50;

/// Render one latency histogram per verb present in `samples`, saved into
/// `out_dir` (created if absent) as `size-<N>-<verb>.png`.
pub fn render_histograms(samples: &SampleMap, size: u64, out_dir: &Path) -> crate::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    for (verb, latencies) in samples {
        let path = out_dir.join(format!("size-{size}-{verb}.png"));
        draw_histogram(verb, latencies, &path)?;
        info!("save: {}", path.display());
    }

    Ok(())
}

fn draw_histogram(verb: &str, latencies: &[u64], path: &Path) -> crate::Result<()> {
    let (lo, hi) = match (latencies.iter().min(), latencies.iter().max()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => return Ok(()),
    };
    // Degenerate sample sets (all values equal) still get a drawable range.
    let hi = if hi == lo { lo + 1 } else { hi };
    let width = (hi - lo) as f64 / BINS as f64;

    let mut counts = [0u32; BINS];
    for &v in latencies {
        let mut idx = ((v - lo) as f64 / width) as usize;
        if idx >= BINS {
            idx = BINS - 1;
        }
        counts[idx] += 1;
    }
    let y_max = counts.iter().copied().max().unwrap_or(0).max(1);

    let root = BitMapBackend::new(path, (960, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("ibverb {verb} latency distribution"),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(lo as f64..hi as f64, 0u32..y_max + 1)?;

    chart
        .configure_mesh()
        .x_desc("time: usecond")
        .y_desc("frequency")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().filter(|&(_, &c)| c > 0).map(
        |(i, &c)| {
            let x0 = lo as f64 + i as f64 * width;
            Rectangle::new([(x0, 0), (x0 + width, c)], BLUE.filled())
        },
    ))?;

    root.present()?;
    Ok(())
}
