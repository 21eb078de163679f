//! Reading and writing GTF annotation files.
//!
//! Records are tab separated with a `key "value";` attribute column. Lines
//! starting with `#` are comments; the `### locus ###` headers written in
//! front of every locus are comments too, so written files read back
//! without special handling.

pub mod gtf;


pub use gtf::{
    read_intersect_pairs,
    read_records,
    GtfReader,
    GtfWriter,
};
