//! Run discovery and orchestration: one work unit per size file, fanned out
//! to a bounded worker pool, then a sequential summary per run.

use crate::model::{RunData, RunSummary, SampleMap};
use crate::parse::parse_log_file;
use crate::render;
use crate::verbs::IBV_VERBS;
use anyhow::{Context, bail};
use log::info;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_WORKERS: usize = 8;

/// One size file awaiting parse + histogram rendering.
struct WorkItem {
    run: PathBuf,
    img_dir: PathBuf,
    size: u64,
    path: PathBuf,
}

/// Parse one file and render its histograms. The returned sample map feeds
/// the run summary once every work unit of the run has completed.
fn work(item: &WorkItem) -> crate::Result<(PathBuf, u64, SampleMap)> {
    let samples = parse_log_file(&item.path)?;
    render::render_histograms(&samples, item.size, &item.img_dir)?;
    Ok((item.run.clone(), item.size, samples))
}

/// Batch mode: every subdirectory of the logs root that is not an output
/// directory is an independent run. All runs share one worker pool; any
/// failed work unit aborts the whole batch before summaries are written.
pub fn handle_log_root(log_root: &str) -> crate::Result<()> {
    let root = Path::new(log_root);
    let mut runs: Vec<PathBuf> = Vec::new();
    for entry in
        fs::read_dir(root).with_context(|| format!("read logs root {}", root.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().contains("_img") {
            continue;
        }
        runs.push(path);
    }
    runs.sort();

    let mut items = Vec::new();
    let mut by_run: BTreeMap<PathBuf, RunData> = BTreeMap::new();
    for run in &runs {
        by_run.insert(run.clone(), RunData::new());
        items.extend(collect_run_items(run)?);
    }

    for (run, size, samples) in dispatch(items)? {
        if let Some(data) = by_run.get_mut(&run) {
            data.insert(size, samples);
        }
    }

    for (run, data) in &by_run {
        summarize_run(run, data)?;
    }
    Ok(())
}

/// Single-run mode: one named subdirectory under the logs root.
pub fn handle_run(log_root: &str, run_name: &str) -> crate::Result<()> {
    let run = Path::new(log_root).join(run_name);
    let items = collect_run_items(&run)?;

    let mut data = RunData::new();
    for (_, size, samples) in dispatch(items)? {
        data.insert(size, samples);
    }
    summarize_run(&run, &data)
}

/// Submit all work units to a bounded pool and join. No ordering guarantee;
/// the first error aborts the collection.
fn dispatch(items: Vec<WorkItem>) -> crate::Result<Vec<(PathBuf, u64, SampleMap)>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(MAX_WORKERS)
        .build()
        .context("build worker pool")?;
    pool.install(|| items.par_iter().map(work).collect())
}

/// Discover `size-<bytes>.txt` files in one run directory.
fn collect_run_items(run_dir: &Path) -> crate::Result<Vec<WorkItem>> {
    let img_dir = img_dir_for(run_dir);
    let mut items = Vec::new();
    for entry in fs::read_dir(run_dir)
        .with_context(|| format!("read run directory {}", run_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(size) = parse_size_file_name(&name)? else {
            continue;
        };
        info!("handle: {name}");
        items.push(WorkItem {
            run: run_dir.to_path_buf(),
            img_dir: img_dir.clone(),
            size,
            path: entry.path(),
        });
    }
    Ok(items)
}

/// Sequential aggregation, run only after every work unit has completed.
fn summarize_run(run: &Path, data: &RunData) -> crate::Result<()> {
    let img_dir = img_dir_for(run);
    let uid = run
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let summary = RunSummary::build(data);
    render::render_bar_chart(&summary, &IBV_VERBS, &img_dir, &uid)?;
    render::write_summary_csv(&summary, &IBV_VERBS, &img_dir)?;
    Ok(())
}

/// Extract the transfer size from a `size-<bytes>.txt` file name: the token
/// between the first `-` and the first following `.`. Names without both the
/// `size-` and `.txt` markers are not size files; a marked name whose size
/// token is not a positive integer is an error.
fn parse_size_file_name(name: &str) -> crate::Result<Option<u64>> {
    if !name.contains("size-") || !name.contains(".txt") {
        return Ok(None);
    }
    let token = name
        .split('-')
        .nth(1)
        .unwrap_or_default()
        .split('.')
        .next()
        .unwrap_or_default();
    let size: u64 = token
        .parse()
        .with_context(|| format!("bad size token in file name {name:?}"))?;
    if size == 0 {
        bail!("transfer size must be positive in file name {name:?}");
    }
    Ok(Some(size))
}

/// Output directory for run `D` is the sibling `D_img`.
fn img_dir_for(run_dir: &Path) -> PathBuf {
    let mut name = run_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str("_img");
    run_dir.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn size_file_names() {
        assert_eq!(parse_size_file_name("size-64.txt").unwrap(), Some(64));
        assert_eq!(
            parse_size_file_name("size-1048576.txt").unwrap(),
            Some(1048576)
        );
        assert_eq!(parse_size_file_name("readme.md").unwrap(), None);
        assert_eq!(parse_size_file_name("size64.txt").unwrap(), None);
        assert_eq!(parse_size_file_name("notes-size.doc").unwrap(), None);
        assert!(parse_size_file_name("size-abc.txt").is_err());
        assert!(parse_size_file_name("size-0.txt").is_err());
    }

    #[test]
    fn img_dir_is_a_sibling() {
        assert_eq!(
            img_dir_for(Path::new("./log/mlx5_0")),
            PathBuf::from("./log/mlx5_0_img")
        );
    }

    #[test]
    fn single_run_end_to_end() {
        let root = tempfile::tempdir().unwrap();
        let run = root.path().join("mlx5_0");
        fs::create_dir(&run).unwrap();
        fs::write(
            run.join("size-64.txt"),
            "ibv_post_send 10\nibv_post_send 20\nibv_poll_cq 5\n",
        )
        .unwrap();
        fs::write(
            run.join("size-1024.txt"),
            "# warmup done\nibv_post_send 30\nibv_poll_cq 7\n",
        )
        .unwrap();

        handle_run(root.path().to_str().unwrap(), "mlx5_0").unwrap();

        let img = root.path().join("mlx5_0_img");
        assert!(img.join("size-64-ibv_post_send.png").is_file());
        assert!(img.join("size-64-ibv_poll_cq.png").is_file());
        assert!(img.join("size-1024-ibv_post_send.png").is_file());
        assert!(img.join("size-1024-ibv_poll_cq.png").is_file());
        assert!(img.join("all_bar.png").is_file());

        let csv = fs::read_to_string(img.join("avg_latency.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "-,64B,1KB,",
                "ibv_post_send,15.00,30.00,",
                "ibv_poll_cq,5.00,7.00,",
            ]
        );
    }

    #[test]
    fn batch_mode_processes_every_run_and_skips_img_dirs() {
        let root = tempfile::tempdir().unwrap();
        let run_a = root.path().join("run_a");
        let run_b = root.path().join("run_b");
        fs::create_dir(&run_a).unwrap();
        fs::create_dir(&run_b).unwrap();
        fs::write(run_a.join("size-64.txt"), "ibv_post_send 10\n").unwrap();
        fs::write(run_b.join("size-128.txt"), "ibv_poll_cq 4\n").unwrap();
        // Must be skipped: stale output dir and a stray file at the root.
        fs::create_dir(root.path().join("run_a_img")).unwrap();
        fs::write(root.path().join("size-64.txt"), "ibv_post_send 1\n").unwrap();

        handle_log_root(root.path().to_str().unwrap()).unwrap();

        assert!(
            root.path()
                .join("run_a_img")
                .join("avg_latency.csv")
                .is_file()
        );
        assert!(root.path().join("run_b_img").join("all_bar.png").is_file());
        assert!(!root.path().join("run_a_img_img").exists());
    }

    #[test]
    fn malformed_file_aborts_the_batch() {
        let root = tempfile::tempdir().unwrap();
        let run = root.path().join("bad");
        fs::create_dir(&run).unwrap();
        fs::write(run.join("size-64.txt"), "ibv_post_send oops\n").unwrap();

        assert!(handle_log_root(root.path().to_str().unwrap()).is_err());
        assert!(!root.path().join("bad_img").join("avg_latency.csv").exists());
    }
}
