//! Aggregation model: per-file sample maps combined into a run summary.

use std::collections::BTreeMap;

/// Per-size data: verb name -> latency samples (microseconds) in file order.
pub type SampleMap = BTreeMap<String, Vec<u64>>;

/// Aggregate data for one run: transfer size (bytes) -> per-size data.
pub type RunData = BTreeMap<u64, SampleMap>;

/// Arithmetic mean of a sample list.
pub fn mean(samples: &[u64]) -> f64 {
    samples.iter().sum::<u64>() as f64 / samples.len() as f64
}

/// Human-readable size label, integer division at powers of 1024.
pub fn trans_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;
    if bytes < KB {
        format!("{bytes}B")
    } else if bytes < MB {
        format!("{}KB", bytes / KB)
    } else if bytes < GB {
        format!("{}MB", bytes / MB)
    } else {
        format!("{}GB", bytes / GB)
    }
}

/// Mean latencies of one run, ready for the bar chart and the CSV table.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Distinct transfer sizes, ascending.
    pub sizes: Vec<u64>,
    /// size -> verb -> mean latency, for verbs actually observed at that size.
    pub means: BTreeMap<u64, BTreeMap<String, f64>>,
    /// verb -> mean per observed size, in ascending size order. A verb
    /// missing at some sizes gets a shorter series, never a zero-fill.
    pub series: BTreeMap<String, Vec<f64>>,
}

impl RunSummary {
    pub fn build(data: &RunData) -> Self {
        let sizes: Vec<u64> = data.keys().copied().collect();

        let mut means: BTreeMap<u64, BTreeMap<String, f64>> = BTreeMap::new();
        let mut series: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (&size, samples) in data {
            let per_size = means.entry(size).or_default();
            for (verb, latencies) in samples {
                let avg = mean(latencies);
                per_size.insert(verb.clone(), avg);
                series.entry(verb.clone()).or_default().push(avg);
            }
        }

        RunSummary { sizes, means, series }
    }

    /// Bar segments for one size: (verb, bottom, top) stacked bottom-up in
    /// the given verb order. Verbs not observed at this size are skipped by
    /// membership check and contribute nothing to the offsets.
    pub fn stack_for<'a>(&self, size: u64, verbs: &[&'a str]) -> Vec<(&'a str, f64, f64)> {
        let mut out = Vec::new();
        let Some(per_size) = self.means.get(&size) else {
            return out;
        };
        let mut offset = 0.0;
        for &verb in verbs {
            if let Some(&avg) = per_size.get(verb) {
                out.push((verb, offset, offset + avg));
                offset += avg;
            }
        }
        out
    }
}
