use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::LocusError;

#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum Strand {
    /// Forward strand.
    Forward,
    /// Reverse strand.
    Reverse,
    /// Unknown strand, also used to flag inverted members of merged loci.
    None,
}

impl Strand {
    /// Plus-strand formulas apply only to [`Strand::Forward`]; everything
    /// else uses the minus-strand pairing of model coordinates.
    pub fn is_forward(&self) -> bool { matches!(self, Strand::Forward) }
}

impl FromStr for Strand {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Ok(Strand::None),
        }
    }
}

impl From<Strand> for char {
    fn from(value: Strand) -> Self {
        match value {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::None => '.',
        }
    }
}

impl Display for Strand {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl Serialize for Strand {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Strand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Structural class of a locus, decided by whether it starts and/or ends
/// with an LTR.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum CategoryKind {
    Internal,
    Prototype,
    Oneside,
    Unknown,
    Merged,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Internal => "internal",
            CategoryKind::Prototype => "prototype",
            CategoryKind::Oneside => "oneside",
            CategoryKind::Unknown => "unknown",
            CategoryKind::Merged => "merged",
        }
    }
}

/// Locus category as written to the `category` attribute. Categories of
/// loci rewritten by conflict resolution carry a trailing `*`.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug)]
pub struct Category {
    pub kind:     CategoryKind,
    pub resolved: bool,
}

impl Category {
    pub fn new(kind: CategoryKind) -> Self {
        Self {
            kind,
            resolved: false,
        }
    }

    pub fn merged() -> Self {
        Self {
            kind:     CategoryKind::Merged,
            resolved: true,
        }
    }

    pub fn resolved(self) -> Self {
        Self {
            resolved: true,
            ..self
        }
    }
}

impl Display for Category {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        if self.resolved {
            write!(f, "*")?;
        }
        Ok(())
    }
}

impl FromStr for Category {
    type Err = LocusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, resolved) = match s.strip_suffix('*') {
            Some(name) => (name, true),
            None => (s, false),
        };
        let kind = match name {
            "internal" => CategoryKind::Internal,
            "prototype" => CategoryKind::Prototype,
            "oneside" => CategoryKind::Oneside,
            "unknown" => CategoryKind::Unknown,
            "merged" => CategoryKind::Merged,
            other => return Err(LocusError::UnknownCategory(other.to_string())),
        };
        Ok(Self { kind, resolved })
    }
}
