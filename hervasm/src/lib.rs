//! # hervasm
//!
//! `hervasm` reconstructs endogenous retrovirus (HERV) loci from fragmented
//! RepeatMasker annotations and resolves conflicts between loci that
//! overlap each other.
//!
//! ## Pipeline
//!
//! 1. [`tools::fix_model_coordinates`] infers the length of every repeat
//!    model and corrects `repStart`/`repEnd`/`repLeft` so that all records
//!    of a model agree on it.
//! 2. [`tools::HitMergerConfig::merge`] sweeps raw hits of one model into
//!    candidate loci using genomic distance and model progress.
//! 3. [`tools::assemble`] removes overlaps within each locus, classifies it
//!    (`internal`, `prototype`, `oneside`) and writes a spanning record with
//!    the internal model coverage.
//! 4. [`tools::find_overlap_groups`] clusters spanning records and returns
//!    the groups of loci overlapping each other.
//! 5. [`tools::ConflictResolver`] applies one `ignore`, `reject`, `diff` or
//!    `merge` command per group, from a replayable [`tools::CommandScript`]
//!    or from an operator prompt.
//! 6. [`tools::FilterConfig`] keeps loci with enough internal coverage.
//!
//! ## Structure
//!
//! * [`data_structs`]: records, attributes, loci and the locus table.
//! * [`io`]: GTF reading and writing.
//! * [`tools`]: the pipeline steps above.
//! * [`error`]: the [`error::LocusError`] taxonomy.
//!
//! ## Usage
//!
//! ```no_run
//! use std::fs::File;
//! use hervasm::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let records = read_records(File::open("loci.gtf")?)?;
//!     let mut table = LocusTable::from_records(records)?;
//!
//!     let groups = find_overlap_groups(table.spans(), &LapperClusterer)?;
//!     let script = CommandScript::from_json(r#"{"1": ["diff"], "2": ["reject"]}"#)?;
//!     let resolver = ConflictResolver::new(ResolverConfig::default(), &table)?;
//!     let report = resolver.resolve_all(&mut table, &groups, &script, None)?;
//!     println!("Dropped {} fragments", report.dropped_fragments.len());
//!
//!     let mut writer = GtfWriter::new(File::create("polished.gtf")?);
//!     writer.write_table(&table)?;
//!     writer.flush()?;
//!     Ok(())
//! }
//! ```

pub mod data_structs;
pub mod error;
pub mod io;
pub mod prelude;
pub mod tools;
pub mod utils;

#[cfg(test)]
mod test_utils;
