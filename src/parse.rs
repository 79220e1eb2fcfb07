use crate::model::SampleMap;
use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Parse one benchmark log file into a verb -> latency-samples map.
///
/// Relevant lines look like:
///
/// ibv_post_send 37 ...
///
/// i.e. a verb token followed by a whitespace-separated integer latency in
/// microseconds; anything after the latency is ignored. Lines not starting
/// with an `ibv_` token are skipped. A matching line whose latency token is
/// not an integer is an error.
pub fn parse_log_file(path: &Path) -> anyhow::Result<SampleMap> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read log file {}", path.display()))?;

    let re = Regex::new(r"^(ibv_\S*)\s+(\S+)")?;

    let mut out = SampleMap::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;

        let caps = match re.captures(line) {
            Some(c) => c,
            None => continue,
        };

        let verb = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let token = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let latency: u64 = token.parse().with_context(|| {
            format!("bad latency token at {}:{}: {:?}", path.display(), lno, token)
        })?;

        out.entry(verb.to_string()).or_default().push(latency);
    }

    Ok(out)
}
