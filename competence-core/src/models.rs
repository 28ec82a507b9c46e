use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::sequence::{next_member_seq, Sequenced};

/// Identifier of a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for TeamId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TeamId)
    }
}

/// Identifier of a competence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetenceId(pub u32);

impl fmt::Display for CompetenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for CompetenceId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CompetenceId)
    }
}

/// Identifier of a member, scoped to its team: `TT.MM`
///
/// Ordering is by team, then by sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId {
    pub team: TeamId,
    pub seq: u32,
}

impl MemberId {
    pub fn new(team: TeamId, seq: u32) -> Self {
        Self { team, seq }
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.team, self.seq)
    }
}

/// Error returned when a string is not a `TT.MM` member id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid member id '{0}', expected TT.MM")]
pub struct ParseMemberIdError(String);

impl FromStr for MemberId {
    type Err = ParseMemberIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMemberIdError(s.to_string());
        let (team, seq) = s.trim().split_once('.').ok_or_else(err)?;
        let team = team.parse::<u32>().map_err(|_| err())?;
        let seq = seq.parse::<u32>().map_err(|_| err())?;
        Ok(MemberId::new(TeamId(team), seq))
    }
}

impl TryFrom<String> for MemberId {
    type Error = ParseMemberIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.to_string()
    }
}

/// A person on a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.id, self.name)
    }
}

/// A team and its ordered roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Team {
    /// Creates a team with no members
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Creates a team from a newline-delimited roster.
    ///
    /// Blank lines are skipped; every other line becomes a member, trimmed.
    pub fn with_roster(id: TeamId, name: impl Into<String>, roster: &str) -> Self {
        let mut team = Self::new(id, name);
        for line in roster.lines().map(str::trim).filter(|l| !l.is_empty()) {
            team.add_member(line);
        }
        team
    }

    /// Appends a member with the next free sub-id and returns that id
    pub fn add_member(&mut self, name: impl Into<String>) -> MemberId {
        let id = MemberId::new(self.id, next_member_seq(self));
        self.members.push(Member::new(id, name));
        id
    }

    /// Removes the given members. Remaining members keep their ids.
    pub fn remove_members(&mut self, ids: &[MemberId]) {
        self.members.retain(|m| !ids.contains(&m.id));
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == *id)
    }

    pub fn member_mut(&mut self, id: &MemberId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == *id)
    }

    pub fn has_member(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }

    /// Member names joined by newlines, the inverse of [`Team::with_roster`]
    pub fn roster(&self) -> String {
        self.members
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Sequenced for Team {
    fn seq(&self) -> u32 {
        self.id.0
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.id, self.name)
    }
}

/// Members of one team that hold a competence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLink {
    pub team: TeamId,
    pub members: Vec<MemberId>,
}

/// A competence and the team members holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competence {
    pub id: CompetenceId,
    pub description: String,
    /// One entry per team with at least one linked member, in link order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_to: Vec<TeamLink>,
}

impl Competence {
    pub fn new(id: CompetenceId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            linked_to: Vec::new(),
        }
    }

    /// Linked members of `team`, if the team has an entry
    pub fn members_in(&self, team: TeamId) -> Option<&[MemberId]> {
        self.linked_to
            .iter()
            .find(|l| l.team == team)
            .map(|l| l.members.as_slice())
    }

    pub fn has_team(&self, team: TeamId) -> bool {
        self.members_in(team).is_some()
    }

    /// Whether `member` holds this competence under any team
    pub fn is_held_by(&self, member: &MemberId) -> bool {
        self.linked_to.iter().any(|l| l.members.contains(member))
    }
}

impl Sequenced for Competence {
    fn seq(&self) -> u32 {
        self.id.0
    }
}

impl fmt::Display for Competence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.id, self.description)
    }
}

/// One `(competence, team, member)` association
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
    pub competence: CompetenceId,
    pub team: TeamId,
    pub member: MemberId,
}

impl Link {
    pub fn new(competence: CompetenceId, team: TeamId, member: MemberId) -> Self {
        Self {
            competence,
            team,
            member,
        }
    }
}
