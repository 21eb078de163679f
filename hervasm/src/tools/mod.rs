//! Locus reconstruction and conflict resolution.
//!
//! - [`model_length`]: per-model length inference and coordinate correction.
//! - [`merge_hits`]: sweeps raw hits into candidate loci.
//! - [`adjust`], [`classify`], [`span`]: intra-locus cleanup, categories and
//!   spanning records.
//! - [`assemble`]: builds finished loci from locus-tagged records.
//! - [`overlap`]: finds loci that overlap each other.
//! - [`resolve`]: applies ignore / reject / diff / merge to overlap groups.
//! - [`filter`]: coverage thresholds on finished loci.

pub mod adjust;
pub mod assemble;
pub mod classify;
pub mod filter;
pub mod merge_hits;
pub mod model_length;
pub mod overlap;
pub mod resolve;
pub mod span;


pub use assemble::assemble;
pub use filter::{
    FilterConfig,
    FilterOutcome,
    FilterSummary,
};
pub use merge_hits::HitMergerConfig;
pub use model_length::{
    fix_model_coordinates,
    ModelLengths,
};
pub use overlap::{
    find_overlap_groups,
    BedtoolsClusterer,
    IntervalClusterer,
    LapperClusterer,
    OverlapGroup,
};
pub use resolve::{
    CommandScript,
    ConflictResolver,
    ResolutionCommand,
    ResolverConfig,
};
