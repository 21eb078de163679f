pub use crate::data_structs::{
    AnnotationRecord,
    AttrValue,
    Attributes,
    Category,
    CategoryKind,
    Locus,
    LocusTable,
    Strand,
};
pub use crate::data_structs::typedef::{
    GroupId,
    LocusId,
};
pub use crate::error::{
    DataInconsistency,
    LocusError,
    LocusResult,
    UsageError,
};
pub use crate::io::{
    read_intersect_pairs,
    read_records,
    GtfReader,
    GtfWriter,
};
pub use crate::tools::resolve::{
    CommandSource,
    EmptyLocusPolicy,
    GroupOutcome,
    LinePrompt,
    PromptState,
    ResolutionReport,
};
pub use crate::tools::{
    assemble,
    find_overlap_groups,
    fix_model_coordinates,
    BedtoolsClusterer,
    CommandScript,
    ConflictResolver,
    FilterConfig,
    HitMergerConfig,
    IntervalClusterer,
    LapperClusterer,
    ModelLengths,
    OverlapGroup,
    ResolutionCommand,
    ResolverConfig,
};
