use std::collections::BTreeMap;
use std::fmt;
use std::io::{
    Read,
    Write,
};

use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::{
    GroupId,
    LocusId,
};
use crate::error::UsageError;

pub const ACTIONS: [&str; 4] = ["ignore", "reject", "diff", "merge"];

/// What to do with one overlap group. Explicit id lists are optional; each
/// action has a default that only looks at the group itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum ResolutionCommand {
    /// Leave the loci as they are.
    Ignore,
    /// Drop the named loci, or every locus but the best covered one.
    Reject(Option<Vec<LocusId>>),
    /// Trim the first locus so it no longer overlaps the second. Without
    /// ids the better covered locus is trimmed.
    Diff(Option<(LocusId, LocusId)>),
    /// Combine the named loci, or all of them.
    Merge(Option<Vec<LocusId>>),
}

fn malformed<S: AsRef<str>>(
    tokens: &[S],
    reason: &str,
) -> UsageError {
    UsageError::MalformedCommand {
        command: tokens.iter().map(|t| t.as_ref().to_string()).collect(),
        reason:  reason.to_string(),
    }
}

fn split_ids(
    arg: &str,
    sep: char,
) -> Vec<LocusId> {
    arg.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect_vec()
}

impl ResolutionCommand {
    /// Builds a command from its token list, e.g. `["diff", "a-b"]`. The
    /// verb is case-insensitive.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, UsageError> {
        let (verb, arg) = match tokens {
            [verb] => (verb.as_ref(), None),
            [verb, arg] => (verb.as_ref(), Some(arg.as_ref())),
            [] => return Err(malformed(tokens, "empty command")),
            _ => return Err(malformed(tokens, "expected an action and at most one argument")),
        };

        let command = match (verb.to_lowercase().as_str(), arg) {
            ("ignore", None) => ResolutionCommand::Ignore,
            ("ignore", Some(_)) => return Err(malformed(tokens, "ignore takes no argument")),
            ("reject", None) => ResolutionCommand::Reject(None),
            ("reject", Some(arg)) => {
                let ids = split_ids(arg, ',');
                if ids.is_empty() {
                    return Err(malformed(tokens, "no locus ids given"));
                }
                ResolutionCommand::Reject(Some(ids))
            },
            ("diff", None) => ResolutionCommand::Diff(None),
            ("diff", Some(arg)) => {
                match arg.split_once('-') {
                    Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
                        ResolutionCommand::Diff(Some((a.trim().to_string(), b.trim().to_string())))
                    },
                    _ => return Err(malformed(tokens, "diff expects loc1-loc2")),
                }
            },
            ("merge", None) => ResolutionCommand::Merge(None),
            ("merge", Some(arg)) => {
                let ids = split_ids(arg, '+');
                if ids.is_empty() {
                    return Err(malformed(tokens, "no locus ids given"));
                }
                ResolutionCommand::Merge(Some(ids))
            },
            _ => return Err(UsageError::UnknownAction(verb.to_string())),
        };
        Ok(command)
    }

    /// Parses a whitespace separated command line.
    pub fn parse_line(line: &str) -> Result<Self, UsageError> {
        let tokens = line.split_whitespace().collect_vec();
        Self::from_tokens(&tokens)
    }

    pub fn action(&self) -> &'static str {
        match self {
            ResolutionCommand::Ignore => "ignore",
            ResolutionCommand::Reject(_) => "reject",
            ResolutionCommand::Diff(_) => "diff",
            ResolutionCommand::Merge(_) => "merge",
        }
    }

    pub fn to_tokens(&self) -> Vec<String> {
        let arg = match self {
            ResolutionCommand::Ignore
            | ResolutionCommand::Reject(None)
            | ResolutionCommand::Diff(None)
            | ResolutionCommand::Merge(None) => None,
            ResolutionCommand::Reject(Some(ids)) => Some(ids.join(",")),
            ResolutionCommand::Diff(Some((a, b))) => Some(format!("{}-{}", a, b)),
            ResolutionCommand::Merge(Some(ids)) => Some(ids.join("+")),
        };
        std::iter::once(self.action().to_string())
            .chain(arg)
            .collect_vec()
    }

    /// Locus ids named explicitly by the command.
    pub fn named_loci(&self) -> Vec<&str> {
        match self {
            ResolutionCommand::Ignore
            | ResolutionCommand::Reject(None)
            | ResolutionCommand::Diff(None)
            | ResolutionCommand::Merge(None) => Vec::new(),
            ResolutionCommand::Reject(Some(ids)) | ResolutionCommand::Merge(Some(ids)) => {
                ids.iter().map(String::as_str).collect_vec()
            },
            ResolutionCommand::Diff(Some((a, b))) => vec![a.as_str(), b.as_str()],
        }
    }

    /// Every explicitly named locus has to be a member of the group.
    pub fn check_members(
        &self,
        members: &[LocusId],
    ) -> Result<(), UsageError> {
        match self
            .named_loci()
            .into_iter()
            .find(|id| !members.iter().any(|m| m == id))
        {
            Some(unknown) => {
                Err(UsageError::UnknownLocus {
                    command: self.to_string(),
                    locus:   unknown.to_string(),
                })
            },
            None => Ok(()),
        }
    }

    /// Checks the command against the group it will be applied to: named
    /// loci must be distinct members and diff needs exactly two loci.
    pub fn validate(
        &self,
        group: GroupId,
        members: &[LocusId],
    ) -> Result<(), UsageError> {
        if matches!(self, ResolutionCommand::Diff(_)) && members.len() != 2 {
            return Err(UsageError::DiffGroupSize {
                group,
                size: members.len(),
            });
        }
        if let Some(repeated) = self.named_loci().into_iter().duplicates().next() {
            return Err(malformed(
                &self.to_tokens(),
                &format!("locus {} is named more than once", repeated),
            ));
        }
        self.check_members(members)
    }
}

impl TryFrom<Vec<String>> for ResolutionCommand {
    type Error = UsageError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> { Self::from_tokens(&value) }
}

impl From<ResolutionCommand> for Vec<String> {
    fn from(value: ResolutionCommand) -> Self { value.to_tokens() }
}

impl fmt::Display for ResolutionCommand {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.to_tokens().join(" "))
    }
}

/// Resolution commands keyed by overlap group id. Serialised as a JSON
/// object with the decimal group ids as keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandScript {
    commands: BTreeMap<GroupId, ResolutionCommand>,
}

impl CommandScript {
    pub fn new() -> Self { Self::default() }

    pub fn get(
        &self,
        group: GroupId,
    ) -> Option<&ResolutionCommand> {
        self.commands.get(&group)
    }

    pub fn insert(
        &mut self,
        group: GroupId,
        command: ResolutionCommand,
    ) -> Option<ResolutionCommand> {
        self.commands.insert(group, command)
    }

    pub fn contains(
        &self,
        group: GroupId,
    ) -> bool {
        self.commands.contains_key(&group)
    }

    pub fn len(&self) -> usize { self.commands.len() }

    pub fn is_empty(&self) -> bool { self.commands.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupId, &ResolutionCommand)> {
        self.commands.iter()
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> { Ok(serde_json::from_str(text)?) }

    pub fn to_json(&self) -> anyhow::Result<String> { Ok(serde_json::to_string(self)?) }

    pub fn read_json<R: Read>(reader: R) -> anyhow::Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write_json<W: Write>(
        &self,
        writer: W,
    ) -> anyhow::Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}

impl FromIterator<(GroupId, ResolutionCommand)> for CommandScript {
    fn from_iter<T: IntoIterator<Item = (GroupId, ResolutionCommand)>>(iter: T) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}
