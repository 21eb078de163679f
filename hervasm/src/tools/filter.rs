use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::info;

use crate::data_structs::{
    Category,
    Locus,
    LocusTable,
};
use crate::error::LocusResult;
use crate::with_field_fn;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Minimum number of query bases matching the internal model.
    pub min_internal_bases: i64,
    /// Minimum fraction (0..=1) of the internal model matched.
    pub min_internal_pct:   f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_internal_bases: 0,
            min_internal_pct:   0.0,
        }
    }
}

impl FilterConfig {
    with_field_fn!(min_internal_bases, i64);

    with_field_fn!(min_internal_pct, f64);

    pub fn passes(
        &self,
        locus: &Locus,
    ) -> LocusResult<bool> {
        let span = locus.span();
        let model_pct = span.float_attr("model_pct")?;
        let model_cov = span.int_attr("model_cov")?;
        Ok(model_pct >= self.min_internal_pct * 100.0
            && model_cov >= self.min_internal_bases)
    }

    /// Splits the table into passing and rejected loci, both in emission
    /// order.
    pub fn apply(
        &self,
        table: &LocusTable,
    ) -> LocusResult<FilterOutcome> {
        let mut outcome = FilterOutcome::default();
        for locus in table.sorted() {
            if self.passes(locus)? {
                let kind = match locus.category() {
                    Some(category) => Category::from_str(&category)?.kind.as_str(),
                    None => "unknown",
                };
                *outcome.summary.counts.entry(kind).or_insert(0) += 1;
                outcome.passed.push(locus.clone());
            }
            else {
                *outcome.summary.counts.entry(REJECTED).or_insert(0) += 1;
                outcome.rejected.push(locus.clone());
            }
        }
        info!(
            "{} loci passed, {} rejected",
            outcome.passed.len(),
            outcome.rejected.len()
        );
        Ok(outcome)
    }
}

const REJECTED: &str = "rejected";
const SUMMARY_ORDER: [&str; 6] =
    ["internal", "prototype", "oneside", "merged", "unknown", REJECTED];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSummary {
    pub counts: BTreeMap<&'static str, usize>,
}

impl FilterSummary {
    pub fn count(
        &self,
        key: &str,
    ) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }
}

impl fmt::Display for FilterSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Summary:")?;
        for key in SUMMARY_ORDER {
            writeln!(f, "{:<20}{}", key, self.count(key))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub passed:   Vec<Locus>,
    pub rejected: Vec<Locus>,
    pub summary:  FilterSummary,
}
