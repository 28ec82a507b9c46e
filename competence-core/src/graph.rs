//! Relationship graph between competences and (team, member) pairs
//!
//! The graph is not stored separately: it is the union of every
//! competence's `linked_to` entries. All keys are ids, so renaming a team
//! or member never touches this module.
//!
//! # Invariants
//! - A team entry exists only while at least one of its members is linked.
//! - A member appears at most once per team entry.
//! - A member is only ever linked under its own team.
//!
//! Cascades and bulk unlinks are planned first as a list of [`GraphEdit`]s
//! and then applied in one pass.

use log::debug;
use std::collections::BTreeSet;

use crate::list::EntityList;
use crate::models::{Competence, CompetenceId, Link, MemberId, TeamId, TeamLink};
use crate::sequence::next_id;

/// A single pending change to the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEdit {
    /// Remove one member from one team entry of one competence
    Unlink(Link),
    /// Discard a whole team entry of one competence
    DropTeam {
        competence: CompetenceId,
        team: TeamId,
    },
}

// Competence store operations

impl EntityList<Competence> {
    /// Appends a new competence with the next free id
    pub fn add_competence(&mut self, description: impl Into<String>) -> CompetenceId {
        let id = CompetenceId(next_id(self));
        self.add(Competence::new(id, description));
        id
    }

    pub fn competence(&self, id: CompetenceId) -> Option<&Competence> {
        self.find(|c| c.id == id)
    }

    /// Changes a competence description; false if the id is unknown
    pub fn rename_competence(&mut self, id: CompetenceId, description: impl Into<String>) -> bool {
        let Some(index) = self.position(|c| c.id == id) else {
            return false;
        };
        let Ok(current) = self.get_at(index) else {
            return false;
        };
        let mut renamed = current.clone();
        renamed.description = description.into();
        self.replace_at(renamed, index)
    }

    /// Removes competences together with their links
    pub fn remove_competences(&mut self, ids: &[CompetenceId]) {
        let indices: Vec<usize> = ids
            .iter()
            .filter_map(|id| self.position(|c| c.id == *id))
            .collect();
        self.remove_at_many(&indices);
    }
}

// Mutations

impl EntityList<Competence> {
    /// Links `member` of `team` to `competence`.
    ///
    /// No-op if the competence is unknown, the member belongs to another
    /// team, or the link already exists.
    pub fn link(&mut self, competence: CompetenceId, team: TeamId, member: MemberId) {
        if member.team != team {
            return;
        }
        let Some(comp) = self.find_mut(|c| c.id == competence) else {
            return;
        };
        match comp.linked_to.iter_mut().find(|l| l.team == team) {
            Some(entry) => {
                if !entry.members.contains(&member) {
                    entry.members.push(member);
                }
            }
            None => comp.linked_to.push(TeamLink {
                team,
                members: vec![member],
            }),
        }
    }

    /// Removes one link, dropping the team entry once it is empty.
    /// No-op if the link does not exist.
    pub fn unlink(&mut self, competence: CompetenceId, team: TeamId, member: MemberId) {
        let Some(comp) = self.find_mut(|c| c.id == competence) else {
            return;
        };
        let Some(index) = comp.linked_to.iter().position(|l| l.team == team) else {
            return;
        };
        let entry = &mut comp.linked_to[index];
        let Some(pos) = entry.members.iter().position(|m| *m == member) else {
            return;
        };
        entry.members.remove(pos);
        if entry.members.is_empty() {
            comp.linked_to.remove(index);
        }
    }

    /// Links every selected member of every selected team to every selected
    /// competence
    pub fn link_all(&mut self, competences: &[CompetenceId], teams: &[TeamId], members: &[MemberId]) {
        debug!(
            "linking {} member(s) in {} team(s) to {} competence(s)",
            members.len(),
            teams.len(),
            competences.len()
        );
        for &competence in competences {
            for &team in teams {
                for &member in members.iter().filter(|m| m.team == team) {
                    self.link(competence, team, member);
                }
            }
        }
    }

    /// Applies planned edits in order
    pub fn apply(&mut self, edits: &[GraphEdit]) {
        for edit in edits {
            match *edit {
                GraphEdit::Unlink(link) => self.unlink(link.competence, link.team, link.member),
                GraphEdit::DropTeam { competence, team } => {
                    if let Some(comp) = self.find_mut(|c| c.id == competence) {
                        comp.linked_to.retain(|l| l.team != team);
                    }
                }
            }
        }
    }
}

// Edit planning

impl EntityList<Competence> {
    /// Cascade for deleted teams: every entry keyed by one of `teams`
    pub fn plan_drop_teams(&self, teams: &[TeamId]) -> Vec<GraphEdit> {
        let edits: Vec<GraphEdit> = self
            .iter()
            .flat_map(|c| {
                teams
                    .iter()
                    .filter(move |t| c.has_team(**t))
                    .map(move |&team| GraphEdit::DropTeam {
                        competence: c.id,
                        team,
                    })
            })
            .collect();
        debug!("team cascade for {:?}: {} edit(s)", teams, edits.len());
        edits
    }

    /// Cascade for deleted members: every link held by one of `members`.
    /// Other members of the same teams stay linked.
    pub fn plan_drop_members(&self, members: &[MemberId]) -> Vec<GraphEdit> {
        let edits = self.member_unlinks(self.iter(), members);
        debug!("member cascade for {:?}: {} edit(s)", members, edits.len());
        edits
    }

    /// Team-scoped unlink: every member of each selected team loses each
    /// selected competence
    pub fn plan_unlink_teams(&self, competences: &[CompetenceId], teams: &[TeamId]) -> Vec<GraphEdit> {
        self.selected(competences)
            .flat_map(|c| {
                teams
                    .iter()
                    .filter(move |t| c.has_team(**t))
                    .map(move |&team| GraphEdit::DropTeam {
                        competence: c.id,
                        team,
                    })
            })
            .collect()
    }

    /// Member-scoped unlink: the selected members lose each selected
    /// competence wherever they hold it
    pub fn plan_unlink_members(&self, competences: &[CompetenceId], members: &[MemberId]) -> Vec<GraphEdit> {
        self.member_unlinks(self.selected(competences), members)
    }

    /// Explicit unlink of every existing `(competence, team, member)` in the
    /// cross product of the selections
    pub fn plan_unlink_triples(
        &self,
        competences: &[CompetenceId],
        teams: &[TeamId],
        members: &[MemberId],
    ) -> Vec<GraphEdit> {
        let mut edits = Vec::new();
        for comp in self.selected(competences) {
            for &team in teams {
                let Some(linked) = comp.members_in(team) else {
                    continue;
                };
                for &member in members.iter().filter(|m| linked.contains(m)) {
                    edits.push(GraphEdit::Unlink(Link::new(comp.id, team, member)));
                }
            }
        }
        edits
    }

    fn selected<'a>(&'a self, ids: &'a [CompetenceId]) -> impl Iterator<Item = &'a Competence> + 'a {
        self.iter().filter(move |c| ids.contains(&c.id))
    }

    fn member_unlinks<'a>(
        &self,
        competences: impl Iterator<Item = &'a Competence>,
        members: &[MemberId],
    ) -> Vec<GraphEdit> {
        let mut edits = Vec::new();
        for comp in competences {
            for entry in &comp.linked_to {
                for member in entry.members.iter().filter(|m| members.contains(m)) {
                    edits.push(GraphEdit::Unlink(Link::new(comp.id, entry.team, *member)));
                }
            }
        }
        edits
    }
}

// Queries

impl EntityList<Competence> {
    /// Every link, in competence, team entry, then member order
    pub fn links(&self) -> Vec<Link> {
        self.iter()
            .flat_map(|c| {
                c.linked_to.iter().flat_map(move |entry| {
                    entry
                        .members
                        .iter()
                        .map(move |&m| Link::new(c.id, entry.team, m))
                })
            })
            .collect()
    }

    /// Teams present under every one of `competences`, ascending
    pub fn teams_with_all(&self, competences: &[CompetenceId]) -> Vec<TeamId> {
        let selected: Vec<&Competence> = self.selected(competences).collect();
        if selected.is_empty() {
            return Vec::new();
        }
        let teams: BTreeSet<TeamId> = selected
            .iter()
            .flat_map(|c| c.linked_to.iter().map(|l| l.team))
            .filter(|team| selected.iter().all(|c| c.has_team(*team)))
            .collect();
        teams.into_iter().collect()
    }

    /// Competences held by any of `members`, in list order
    pub fn competences_held_by(&self, members: &[MemberId]) -> Vec<CompetenceId> {
        self.iter()
            .filter(|c| members.iter().any(|m| c.is_held_by(m)))
            .map(|c| c.id)
            .collect()
    }

    /// Members holding the selected competences, ascending.
    ///
    /// With a team selection: members linked under any selected competence
    /// within any selected team. Without: members holding every selected
    /// competence.
    pub fn members_with(&self, competences: &[CompetenceId], teams: &[TeamId]) -> Vec<MemberId> {
        let selected: Vec<&Competence> = self.selected(competences).collect();
        let members: BTreeSet<MemberId> = if teams.is_empty() {
            selected
                .iter()
                .flat_map(|c| c.linked_to.iter().flat_map(|l| l.members.iter().copied()))
                .filter(|m| selected.iter().all(|c| c.is_held_by(m)))
                .collect()
        } else {
            selected
                .iter()
                .flat_map(|c| c.linked_to.iter())
                .filter(|l| teams.contains(&l.team))
                .flat_map(|l| l.members.iter().copied())
                .collect()
        };
        members.into_iter().collect()
    }
}
