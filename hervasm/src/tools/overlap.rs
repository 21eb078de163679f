//! Detection of loci whose spanning records overlap each other.
//!
//! Clustering is behind [`IntervalClusterer`]: [`LapperClusterer`] does it
//! in-process with a `rust-lapper` index, [`BedtoolsClusterer`] shells out
//! to `bedtools cluster`. Both put overlapping and book-ended intervals in
//! the same cluster.

use std::collections::{
    BTreeMap,
    VecDeque,
};
use std::io::Write;
use std::process::{
    Command,
    Stdio,
};

use anyhow::{
    anyhow,
    Context,
};
use itertools::Itertools;
use log::{
    debug,
    info,
};
use rust_lapper::{
    Interval,
    Lapper,
};

use crate::data_structs::typedef::{
    GroupId,
    LocusId,
    PosType,
};
use crate::data_structs::AnnotationRecord;

type Iv = Interval<PosType, usize>;

/// Assigns a cluster id to each interval so that transitively overlapping
/// intervals share one. The returned ids are aligned with `spans`.
pub trait IntervalClusterer {
    fn cluster(
        &self,
        spans: &[AnnotationRecord],
    ) -> anyhow::Result<Vec<GroupId>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LapperClusterer;

impl IntervalClusterer for LapperClusterer {
    fn cluster(
        &self,
        spans: &[AnnotationRecord],
    ) -> anyhow::Result<Vec<GroupId>> {
        let mut by_chrom: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, span) in spans.iter().enumerate() {
            by_chrom.entry(span.chrom.as_str()).or_default().push(idx);
        }

        let mut ids = vec![0; spans.len()];
        let mut next_id: GroupId = 1;
        for (chrom, indices) in by_chrom {
            let intervals = indices
                .iter()
                .map(|&idx| {
                    Iv {
                        start: spans[idx].start,
                        stop:  spans[idx].end + 1,
                        val:   idx,
                    }
                })
                .collect_vec();
            let lapper = Lapper::new(intervals);

            let mut assigned = vec![false; spans.len()];
            let ordered = indices
                .iter()
                .copied()
                .sorted_by_key(|&idx| (spans[idx].start, spans[idx].end));
            for seed in ordered {
                if assigned[seed] {
                    continue;
                }
                assigned[seed] = true;
                let mut queue = VecDeque::from([seed]);
                while let Some(idx) = queue.pop_front() {
                    ids[idx] = next_id;
                    // Widen by one base on each side so book-ended
                    // neighbours are found too.
                    let query_start = spans[idx].start.saturating_sub(1);
                    let query_stop = spans[idx].end + 2;
                    for hit in lapper.find(query_start, query_stop) {
                        if !assigned[hit.val] {
                            assigned[hit.val] = true;
                            queue.push_back(hit.val);
                        }
                    }
                }
                next_id += 1;
            }
            debug!("Clustered spans on {}", chrom);
        }
        Ok(ids)
    }
}

/// Runs `bedtools cluster -i -` on the text form of the spans.
#[derive(Debug, Clone)]
pub struct BedtoolsClusterer {
    pub program: String,
}

impl Default for BedtoolsClusterer {
    fn default() -> Self {
        Self {
            program: "bedtools".to_string(),
        }
    }
}

impl IntervalClusterer for BedtoolsClusterer {
    fn cluster(
        &self,
        spans: &[AnnotationRecord],
    ) -> anyhow::Result<Vec<GroupId>> {
        let input = spans.iter().map(|s| format!("{}\n", s)).join("");
        let mut child = Command::new(&self.program)
            .args(["cluster", "-i", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("Could not open stdin of {}", self.program))?;
        // stdin is written on its own thread while stdout is drained.
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));
        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| anyhow!("Writer thread panicked"))??;

        anyhow::ensure!(
            output.status.success(),
            "{} cluster exited with {}",
            self.program,
            output.status
        );
        parse_cluster_output(&String::from_utf8_lossy(&output.stdout), spans.len())
    }
}

/// Reads the trailing cluster id of every line of `bedtools cluster`
/// output. The output must have one line per input interval.
pub fn parse_cluster_output(
    text: &str,
    expected: usize,
) -> anyhow::Result<Vec<GroupId>> {
    let ids = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let field = line.rsplit('\t').next().unwrap_or_default();
            field
                .trim()
                .parse::<GroupId>()
                .with_context(|| format!("Invalid cluster id in line: {}", line))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    anyhow::ensure!(
        ids.len() == expected,
        "Clusterer returned {} lines for {} intervals",
        ids.len(),
        expected
    );
    Ok(ids)
}

/// Spanning records of loci that overlap each other.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapGroup {
    pub id:    GroupId,
    pub spans: Vec<AnnotationRecord>,
}

impl OverlapGroup {
    pub fn len(&self) -> usize { self.spans.len() }

    pub fn is_empty(&self) -> bool { self.spans.is_empty() }

    /// Member locus ids in group order. Spans without a `locus` attribute
    /// are listed by their label.
    pub fn locus_ids(&self) -> Vec<LocusId> {
        self.spans
            .iter()
            .map(|s| s.locus().unwrap_or_else(|| s.label()))
            .collect_vec()
    }

    /// Banner shown to an operator before asking for a command.
    pub fn describe(&self) -> String {
        let mut text = format!("### Overlap group {} ###\n", self.id);
        for span in self.spans.iter() {
            let attr = |key: &str| {
                span.attributes
                    .get(key)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| ".".to_string())
            };
            text.push_str(&format!(
                "### {}\t{}\t{}\n",
                attr("locus"),
                attr("model_cov"),
                attr("category")
            ));
        }
        for span in self.spans.iter() {
            text.push_str(&format!("{}\n", span));
        }
        text
    }
}

/// Clusters the spanning records and keeps clusters with more than one
/// member. Spans are handed to the clusterer sorted by chromosome and
/// start.
pub fn find_overlap_groups<'a, I>(
    spans: I,
    clusterer: &dyn IntervalClusterer,
) -> anyhow::Result<BTreeMap<GroupId, OverlapGroup>>
where
    I: IntoIterator<Item = &'a AnnotationRecord>, {
    let spans = spans
        .into_iter()
        .sorted_by(|a, b| {
            a.chrom
                .cmp(&b.chrom)
                .then(a.start.cmp(&b.start))
                .then(a.end.cmp(&b.end))
        })
        .cloned()
        .collect_vec();
    let ids = clusterer.cluster(&spans)?;
    anyhow::ensure!(
        ids.len() == spans.len(),
        "Clusterer returned {} ids for {} intervals",
        ids.len(),
        spans.len()
    );

    let mut groups: BTreeMap<GroupId, OverlapGroup> = BTreeMap::new();
    for (id, span) in ids.into_iter().zip(spans) {
        groups
            .entry(id)
            .or_insert_with(|| {
                OverlapGroup {
                    id,
                    spans: Vec::new(),
                }
            })
            .spans
            .push(span);
    }
    groups.retain(|_, group| group.len() > 1);
    info!("Found {} groups with conflict", groups.len());
    Ok(groups)
}
