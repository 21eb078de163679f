//! Core data structures for RepeatMasker annotation records and the loci
//! assembled from them.
//!
//! - [`attributes`]: the typed, ordered attribute bag of a GTF record
//!   ([`AttrValue`], [`Attributes`]).
//! - [`record`]: [`AnnotationRecord`], one GTF line, with typed accessors for
//!   the model coordinates (`repStart`, `repEnd`, `repLeft`).
//! - [`locus`]: [`Locus`] (members plus one spanning record) and the
//!   [`LocusTable`] that owns every locus of a run.
//! - Enumerations for [`Strand`] and locus [`Category`].
//! - [`typedef`]: coordinate and identifier aliases.

pub mod attributes;
mod enums;
pub mod locus;
pub mod record;
pub mod typedef;

#[cfg(test)]
mod tests;

pub use attributes::{
    AttrValue,
    Attributes,
};
pub use enums::{
    Category,
    CategoryKind,
    Strand,
};
pub use locus::{
    Locus,
    LocusTable,
};
pub use record::{
    AnnotationRecord,
    RawGtfRecord,
};
