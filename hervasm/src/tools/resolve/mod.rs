//! Resolution of conflicts between overlapping loci.
//!
//! Each overlap group gets one [`ResolutionCommand`] (`ignore`, `reject`,
//! `diff` or `merge`). Commands come from a [`CommandScript`] or, for groups
//! the script does not cover, from a [`CommandSource`] such as an operator
//! prompt. Every command applied ends up in the
//! [`ResolutionReport`], so an interactive run can be replayed in batch.

mod command;
mod prompt;
mod resolver;

#[cfg(test)]
mod tests;

pub use command::{
    CommandScript,
    ResolutionCommand,
    ACTIONS,
};
pub use prompt::{
    CommandSource,
    LinePrompt,
    PromptState,
    INVALID_BANNER,
    PROMPT_HELP,
    PROMPT_TEXT,
};
pub use resolver::{
    clip_records,
    trim_side,
    ConflictResolver,
    EmptyLocusPolicy,
    GroupOutcome,
    ResolutionReport,
    ResolverConfig,
    TrimSide,
    MIN_FRAGMENT_LEN,
};
