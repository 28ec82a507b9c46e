//! Session facade
//!
//! A [`Session`] owns the team and competence stores for one open file and
//! is the only surface front-ends call. Every mutation marks the session
//! unsaved. Team and member removals cascade into the relationship graph
//! before the entities leave their store.

use log::info;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::graph::GraphEdit;
use crate::list::EntityList;
use crate::models::{Competence, CompetenceId, Link, Member, MemberId, Team, TeamId};
use crate::storage::{SessionData, Storage};

/// In-memory state of one open session file
#[derive(Debug, Clone, Default)]
pub struct Session {
    teams: EntityList<Team>,
    competences: EntityList<Competence>,
    saved: bool,
    never_saved: bool,
    file_path: Option<PathBuf>,
}

impl Session {
    /// Creates an empty session that has never been saved
    pub fn new() -> Self {
        Self {
            never_saved: true,
            ..Self::default()
        }
    }

    /// Opens a session file. See [`Session::open`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let mut session = Self::new();
        session.open(path)?;
        Ok(session)
    }

    /// Discards all state, as for a brand new file
    pub fn reset(&mut self) {
        self.teams.remove_all();
        self.competences.remove_all();
        self.file_path = None;
        self.never_saved = true;
        self.saved = false;
        info!("started a new session");
    }

    pub fn teams(&self) -> &[Team] {
        self.teams.as_slice()
    }

    pub fn competences(&self) -> &[Competence] {
        self.competences.as_slice()
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.team(id)
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.teams.member(id)
    }

    pub fn competence(&self, id: CompetenceId) -> Option<&Competence> {
        self.competences.competence(id)
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn never_saved(&self) -> bool {
        self.never_saved
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    fn touch(&mut self) {
        self.saved = false;
    }

    // Entity lifecycle

    pub fn add_team(&mut self, name: impl Into<String>, roster: &str) -> TeamId {
        self.touch();
        self.teams.add_team(name, roster)
    }

    pub fn add_member(&mut self, team: TeamId, name: impl Into<String>) -> Option<MemberId> {
        let id = self.teams.add_member(team, name);
        if id.is_some() {
            self.touch();
        }
        id
    }

    pub fn add_competence(&mut self, description: impl Into<String>) -> CompetenceId {
        self.touch();
        self.competences.add_competence(description)
    }

    pub fn rename_team(&mut self, id: TeamId, name: impl Into<String>) -> bool {
        let renamed = self.teams.rename_team(id, name);
        if renamed {
            self.touch();
        }
        renamed
    }

    pub fn rename_member(&mut self, id: &MemberId, name: impl Into<String>) -> bool {
        let renamed = self.teams.rename_member(id, name);
        if renamed {
            self.touch();
        }
        renamed
    }

    pub fn rename_competence(&mut self, id: CompetenceId, description: impl Into<String>) -> bool {
        let renamed = self.competences.rename_competence(id, description);
        if renamed {
            self.touch();
        }
        renamed
    }

    /// Removes teams after dropping every link filed under them
    pub fn remove_teams(&mut self, ids: &[TeamId]) {
        let edits = self.competences.plan_drop_teams(ids);
        self.competences.apply(&edits);
        self.teams.remove_teams(ids);
        self.touch();
    }

    /// Removes members after dropping every link they hold
    pub fn remove_members(&mut self, ids: &[MemberId]) {
        let edits = self.competences.plan_drop_members(ids);
        self.competences.apply(&edits);
        self.teams.remove_members(ids);
        self.touch();
    }

    pub fn remove_competences(&mut self, ids: &[CompetenceId]) {
        self.competences.remove_competences(ids);
        self.touch();
    }

    // Linking

    /// Links every selected member of every selected team to every selected
    /// competence.
    ///
    /// Teams missing from the team store and members missing from their
    /// team's roster are skipped, so the graph never names an absent entity.
    pub fn link(&mut self, competences: &[CompetenceId], teams: &[TeamId], members: &[MemberId]) {
        let teams: Vec<TeamId> = teams
            .iter()
            .copied()
            .filter(|&id| self.teams.team(id).is_some())
            .collect();
        let members: Vec<MemberId> = members
            .iter()
            .copied()
            .filter(|id| self.teams.member(id).is_some())
            .collect();
        self.competences.link_all(competences, &teams, &members);
        self.touch();
    }

    /// Unlinks each exact `(competence, team, member)` of the selections
    pub fn unlink(&mut self, competences: &[CompetenceId], teams: &[TeamId], members: &[MemberId]) {
        let edits = self
            .competences
            .plan_unlink_triples(competences, teams, members);
        self.commit(&edits);
    }

    /// Unlinks every member of the selected teams from the selected competences
    pub fn unlink_teams(&mut self, competences: &[CompetenceId], teams: &[TeamId]) {
        let edits = self.competences.plan_unlink_teams(competences, teams);
        self.commit(&edits);
    }

    /// Unlinks the selected members from the selected competences, in
    /// whichever team they hold them
    pub fn unlink_members(&mut self, competences: &[CompetenceId], members: &[MemberId]) {
        let edits = self.competences.plan_unlink_members(competences, members);
        self.commit(&edits);
    }

    fn commit(&mut self, edits: &[GraphEdit]) {
        self.competences.apply(edits);
        self.touch();
    }

    // Queries

    pub fn links(&self) -> Vec<Link> {
        self.competences.links()
    }

    pub fn teams_with_all(&self, competences: &[CompetenceId]) -> Vec<TeamId> {
        self.competences.teams_with_all(competences)
    }

    pub fn competences_held_by(&self, members: &[MemberId]) -> Vec<CompetenceId> {
        self.competences.competences_held_by(members)
    }

    pub fn members_with(&self, competences: &[CompetenceId], teams: &[TeamId]) -> Vec<MemberId> {
        self.competences.members_with(competences, teams)
    }

    pub fn members_of_teams(&self, teams: &[TeamId]) -> Vec<&Member> {
        self.teams.members_of_teams(teams)
    }

    // Persistence

    /// Snapshot of the stores for serialization
    pub fn to_data(&self) -> SessionData {
        SessionData::new(self.teams.as_slice().to_vec(), self.competences.as_slice().to_vec())
    }

    /// Replaces the whole session with the contents of `path`.
    ///
    /// On error the current state is left untouched.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), StorageError> {
        let data = Storage::new(path.as_ref()).load()?;
        self.teams = data.teams.into();
        self.competences = data.competences.into();
        self.file_path = Some(path.as_ref().to_path_buf());
        self.never_saved = false;
        self.saved = true;
        Ok(())
    }

    /// Writes the session to the path it was opened from or last saved to
    pub fn save(&mut self) -> Result<(), StorageError> {
        let path = self.file_path.clone().ok_or(StorageError::NoPath)?;
        Storage::new(&path).save(&self.to_data())?;
        self.never_saved = false;
        self.saved = true;
        Ok(())
    }

    /// Writes the session to `path` and makes it the current file
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), StorageError> {
        Storage::new(path.as_ref()).save(&self.to_data())?;
        self.file_path = Some(path.as_ref().to_path_buf());
        self.never_saved = false;
        self.saved = true;
        Ok(())
    }

    /// Fills the session with `count` teams of `count` members and `count`
    /// competences; competence *i* is held by every member of team *i*
    pub fn populate_sample(&mut self, count: u32) {
        for i in 1..=count {
            let roster: Vec<String> = (1..=count).map(|y| format!("Member {:02}", y)).collect();
            let team = self.teams.add_team(format!("Team {:02}", i), &roster.join("\n"));
            let competence = self.competences.add_competence(format!("Competence {:02}", i));
            let members: Vec<MemberId> = self
                .teams
                .team(team)
                .map(|t| t.members.iter().map(|m| m.id).collect())
                .unwrap_or_default();
            self.competences.link_all(&[competence], &[team], &members);
        }
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn m(team: u32, seq: u32) -> MemberId {
        MemberId::new(TeamId(team), seq)
    }

    fn link_set(session: &Session) -> BTreeSet<Link> {
        session.links().into_iter().collect()
    }

    #[test]
    fn test_new_session_flags() {
        let session = Session::new();
        assert!(session.never_saved());
        assert!(!session.is_saved());
        assert!(session.teams().is_empty());
        assert!(session.file_path().is_none());
    }

    #[test]
    fn test_every_mutation_marks_unsaved() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::new();
        session.save_as(temp_dir.path().join("s.yaml")).unwrap();
        assert!(session.is_saved());

        fn check(session: &mut Session, op: &str, f: impl FnOnce(&mut Session)) {
            session.save().unwrap();
            assert!(session.is_saved());
            f(session);
            assert!(!session.is_saved(), "{} left the session saved", op);
        }

        check(&mut session, "add_team", |s| {
            s.add_team("Backend", "Alice\nBob");
        });
        check(&mut session, "add_member", |s| {
            s.add_member(TeamId(1), "Carol");
        });
        check(&mut session, "add_competence", |s| {
            s.add_competence("Python");
        });
        check(&mut session, "add_competence", |s| {
            s.add_competence("Rust");
        });
        check(&mut session, "rename_team", |s| {
            s.rename_team(TeamId(1), "Platform");
        });
        check(&mut session, "rename_member", |s| {
            s.rename_member(&m(1, 1), "Alicia");
        });
        check(&mut session, "rename_competence", |s| {
            s.rename_competence(CompetenceId(1), "Python 3");
        });
        check(&mut session, "link", |s| {
            s.link(&[CompetenceId(1), CompetenceId(2)], &[TeamId(1)], &[m(1, 1), m(1, 2), m(1, 3)]);
        });
        check(&mut session, "unlink", |s| {
            s.unlink(&[CompetenceId(1)], &[TeamId(1)], &[m(1, 1)]);
        });
        check(&mut session, "unlink_members", |s| {
            s.unlink_members(&[CompetenceId(1)], &[m(1, 2)]);
        });
        check(&mut session, "unlink_teams", |s| {
            s.unlink_teams(&[CompetenceId(2)], &[TeamId(1)]);
        });
        check(&mut session, "populate_sample", |s| {
            s.populate_sample(2);
        });
        check(&mut session, "remove_members", |s| {
            s.remove_members(&[m(1, 3)]);
        });
        check(&mut session, "remove_competences", |s| {
            s.remove_competences(&[CompetenceId(1)]);
        });
        check(&mut session, "remove_teams", |s| {
            s.remove_teams(&[TeamId(1)]);
        });
    }

    #[test]
    fn test_link_skips_unknown_member() {
        let mut session = Session::new();
        let backend = session.add_team("Backend", "Alice");
        let python = session.add_competence("Python");

        session.link(&[python], &[backend], &[m(1, 1), m(1, 99)]);

        assert_eq!(session.links(), vec![Link::new(python, backend, m(1, 1))]);
    }

    #[test]
    fn test_link_skips_unknown_team() {
        let mut session = Session::new();
        session.add_team("Backend", "Alice");
        let python = session.add_competence("Python");

        session.link(&[python], &[TeamId(7)], &[m(7, 1)]);

        assert!(session.links().is_empty());
        assert!(session.teams_with_all(&[python]).is_empty());
    }

    #[test]
    fn test_link_to_unborn_member_not_inherited() {
        let mut session = Session::new();
        let backend = session.add_team("Backend", "Alice");
        let python = session.add_competence("Python");

        session.link(&[python], &[backend], &[m(1, 2)]);
        let carol = session.add_member(backend, "Carol").unwrap();

        assert_eq!(carol, m(1, 2));
        assert!(session.competences_held_by(&[carol]).is_empty());
    }

    #[test]
    fn test_file_reopens_after_bogus_link() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.yaml");

        let mut session = Session::new();
        let backend = session.add_team("Backend", "Alice");
        let python = session.add_competence("Python");
        session.link(&[python], &[backend, TeamId(9)], &[m(1, 1), m(1, 99), m(9, 1)]);
        session.save_as(&path).unwrap();

        let reopened = Session::from_file(&path).unwrap();
        assert_eq!(reopened.links(), vec![Link::new(python, backend, m(1, 1))]);
    }

    #[test]
    fn test_failed_save_as_keeps_path() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.yaml");
        let blocked = temp_dir.path().join("blocked.yaml");
        std::fs::create_dir(&blocked).unwrap();

        let mut session = Session::new();
        session.add_team("Backend", "Alice");
        session.save_as(&good).unwrap();
        session.add_competence("Python");

        assert!(session.save_as(&blocked).is_err());
        assert_eq!(session.file_path(), Some(good.as_path()));
        assert!(!session.is_saved());

        let mut fresh = Session::new();
        assert!(fresh.save_as(&blocked).is_err());
        assert!(fresh.file_path().is_none());
        assert!(fresh.never_saved());
    }

    #[test]
    fn test_deleted_team_leaves_no_links() {
        let mut session = Session::new();
        let backend = session.add_team("Backend", "Alice");
        let python = session.add_competence("Python");
        session.link(&[python], &[backend], &[m(1, 1)]);
        assert_eq!(session.teams_with_all(&[python]), vec![backend]);

        session.remove_teams(&[backend]);

        assert!(session.teams_with_all(&[python]).is_empty());
        assert!(session.competences().iter().all(|c| !c.has_team(backend)));
        assert!(session.teams().is_empty());
    }

    #[test]
    fn test_deleted_member_leaves_teammates_linked() {
        let mut session = Session::new();
        let backend = session.add_team("Backend", "Alice\nBob");
        let python = session.add_competence("Python");
        let rust = session.add_competence("Rust");
        session.link(&[python], &[backend], &[m(1, 1), m(1, 2)]);
        session.link(&[rust], &[backend], &[m(1, 1)]);

        session.remove_members(&[m(1, 1)]);

        assert_eq!(
            session.links(),
            vec![Link::new(python, backend, m(1, 2))]
        );
        assert!(!session.competence(rust).unwrap().has_team(backend));
        assert!(session.member(&m(1, 1)).is_none());
    }

    #[test]
    fn test_rename_keeps_link_structure() {
        let mut session = Session::new();
        session.populate_sample(3);
        let before = link_set(&session);

        assert!(session.rename_team(TeamId(2), "Platform"));
        assert!(session.rename_member(&m(2, 1), "Alice"));

        assert_eq!(link_set(&session), before);
        let members = session.members_with(&[CompetenceId(2)], &[]);
        assert_eq!(session.member(&members[0]).unwrap().name, "Alice");
        assert_eq!(session.team(members[0].team).unwrap().name, "Platform");
    }

    #[test]
    fn test_freed_highest_team_id_is_reused() {
        let mut session = Session::new();
        for name in ["A", "B", "C"] {
            session.add_team(name, "");
        }
        session.remove_teams(&[TeamId(3)]);
        assert_eq!(session.add_team("D", ""), TeamId(3));
    }

    #[test]
    fn test_unlink_member_from_two_competences() {
        // Bob is on T1 (01.02) and T2 (02.01)
        let mut session = Session::new();
        let t1 = session.add_team("T1", "Alice\nBob");
        let t2 = session.add_team("T2", "Bob\nCarol");
        let c1 = session.add_competence("C1");
        let c2 = session.add_competence("C2");
        session.link(&[c1, c2], &[t1, t2], &[m(1, 1), m(1, 2), m(2, 1), m(2, 2)]);

        session.unlink_members(&[c1, c2], &[m(1, 2), m(2, 1)]);

        for c in [c1, c2] {
            assert_eq!(session.members_with(&[c], &[]), vec![m(1, 1), m(2, 2)]);
        }
    }

    #[test]
    fn test_member_sub_id_reused_after_removal() {
        let mut session = Session::new();
        let backend = session.add_team("Backend", "Alice\nBob");
        session.remove_members(&[m(1, 1)]);
        assert_eq!(session.add_member(backend, "Carol"), Some(m(1, 3)));

        let mut session = Session::new();
        let backend = session.add_team("Backend", "Alice\nBob");
        session.remove_members(&[m(1, 2)]);
        assert_eq!(session.add_member(backend, "Carol"), Some(m(1, 2)));
    }

    #[test]
    fn test_unlink_teams_only_touches_selection() {
        let mut session = Session::new();
        session.populate_sample(2);
        session.link(&[CompetenceId(1)], &[TeamId(2)], &[m(2, 1)]);

        session.unlink_teams(&[CompetenceId(1)], &[TeamId(1)]);

        assert_eq!(session.teams_with_all(&[CompetenceId(1)]), vec![TeamId(2)]);
        assert_eq!(session.teams_with_all(&[CompetenceId(2)]), vec![TeamId(2)]);
    }

    #[test]
    fn test_unlink_triple_is_idempotent() {
        let mut session = Session::new();
        session.populate_sample(2);
        session.unlink(&[CompetenceId(1)], &[TeamId(1)], &[m(1, 1)]);
        let after_first = link_set(&session);
        session.unlink(&[CompetenceId(1)], &[TeamId(1)], &[m(1, 1)]);
        assert_eq!(link_set(&session), after_first);
        assert_eq!(after_first.len(), 3);
    }

    #[test]
    fn test_save_and_open_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.yaml");

        let mut session = Session::new();
        session.populate_sample(3);
        session.remove_members(&[m(2, 2)]);
        session.save_as(&path).unwrap();
        assert!(!session.never_saved());

        let reopened = Session::from_file(&path).unwrap();
        assert_eq!(reopened.teams(), session.teams());
        assert_eq!(reopened.competences(), session.competences());
        assert!(reopened.is_saved());
        assert_eq!(reopened.file_path(), Some(path.as_path()));
    }

    #[test]
    fn test_failed_open_keeps_state() {
        let temp_dir = TempDir::new().unwrap();
        let bad = temp_dir.path().join("bad.yaml");
        std::fs::write(&bad, "version: 1\nsaved_at: nope\n").unwrap();

        let mut session = Session::new();
        session.populate_sample(2);
        let before = session.to_data();

        assert!(session.open(&bad).is_err());
        assert!(session.open(temp_dir.path().join("missing.yaml")).is_err());
        assert_eq!(session.teams(), before.teams.as_slice());
        assert_eq!(session.competences(), before.competences.as_slice());
        assert!(session.never_saved());
    }

    #[test]
    fn test_save_without_path() {
        let mut session = Session::new();
        assert!(matches!(session.save(), Err(StorageError::NoPath)));
    }

    #[test]
    fn test_reset_discards_everything() {
        let mut session = Session::new();
        session.populate_sample(2);
        session.reset();
        assert!(session.teams().is_empty());
        assert!(session.competences().is_empty());
        assert!(session.never_saved());
        assert!(!session.is_saved());
    }
}
