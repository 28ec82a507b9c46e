//! Team store operations
//!
//! These only touch the team list. Cascading into the relationship graph is
//! the session's job, see [`crate::session::Session`].

use crate::list::EntityList;
use crate::models::{Member, MemberId, Team, TeamId};
use crate::sequence::next_id;

impl EntityList<Team> {
    /// Appends a new team with the next free id and a newline-delimited roster
    pub fn add_team(&mut self, name: impl Into<String>, roster: &str) -> TeamId {
        let id = TeamId(next_id(self));
        self.add(Team::with_roster(id, name, roster));
        id
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.find(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.find_mut(|t| t.id == id)
    }

    /// Looks up a member through the team encoded in its id
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.team(id.team).and_then(|t| t.member(id))
    }

    /// Adds a member to `team`; None if the team does not exist
    pub fn add_member(&mut self, team: TeamId, name: impl Into<String>) -> Option<MemberId> {
        self.team_mut(team).map(|t| t.add_member(name))
    }

    /// Changes a team name in place; false if the id is unknown
    pub fn rename_team(&mut self, id: TeamId, name: impl Into<String>) -> bool {
        let Some(index) = self.position(|t| t.id == id) else {
            return false;
        };
        let Ok(current) = self.get_at(index) else {
            return false;
        };
        let mut renamed = current.clone();
        renamed.name = name.into();
        self.replace_at(renamed, index)
    }

    /// Changes a member name in place; false if the member is unknown
    pub fn rename_member(&mut self, id: &MemberId, name: impl Into<String>) -> bool {
        match self.team_mut(id.team).and_then(|t| t.member_mut(id)) {
            Some(member) => {
                member.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_teams(&mut self, ids: &[TeamId]) {
        let indices: Vec<usize> = ids
            .iter()
            .filter_map(|id| self.position(|t| t.id == *id))
            .collect();
        self.remove_at_many(&indices);
    }

    /// Removes members from whichever teams hold them
    pub fn remove_members(&mut self, ids: &[MemberId]) {
        for team in self.iter_mut() {
            if ids.iter().any(|id| id.team == team.id) {
                team.remove_members(ids);
            }
        }
    }

    /// Members of the selected teams, ascending by id
    pub fn members_of_teams(&self, teams: &[TeamId]) -> Vec<&Member> {
        let mut members: Vec<&Member> = self
            .iter()
            .filter(|t| teams.contains(&t.id))
            .flat_map(|t| t.members.iter())
            .collect();
        members.sort_by_key(|m| m.id);
        members.dedup_by_key(|m| m.id);
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntityList<Team> {
        let mut teams = EntityList::new();
        teams.add_team("Backend", "Alice\nBob");
        teams.add_team("Frontend", "Carol");
        teams
    }

    #[test]
    fn test_add_team_assigns_sequential_ids() {
        let mut teams = sample();
        assert_eq!(teams.add_team("Ops", ""), TeamId(3));
        assert_eq!(
            teams.to_string_list(),
            vec!["01 : Backend", "02 : Frontend", "03 : Ops"]
        );
    }

    #[test]
    fn test_add_member_to_unknown_team() {
        let mut teams = sample();
        assert_eq!(teams.add_member(TeamId(9), "Zed"), None);
        assert_eq!(
            teams.add_member(TeamId(2), "Dave"),
            Some(MemberId::new(TeamId(2), 2))
        );
    }

    #[test]
    fn test_removed_member_sub_id_is_reused() {
        let mut teams = sample();
        let bob = MemberId::new(TeamId(1), 2);
        teams.remove_members(&[bob]);
        assert_eq!(teams.add_member(TeamId(1), "Dave"), Some(bob));
    }

    #[test]
    fn test_rename_team_and_member() {
        let mut teams = sample();
        assert!(teams.rename_team(TeamId(1), "Platform"));
        assert!(!teams.rename_team(TeamId(5), "Nope"));
        assert_eq!(teams.team(TeamId(1)).unwrap().name, "Platform");
        assert_eq!(teams.team(TeamId(1)).unwrap().members.len(), 2);

        let alice = MemberId::new(TeamId(1), 1);
        assert!(teams.rename_member(&alice, "Alicia"));
        assert!(!teams.rename_member(&MemberId::new(TeamId(1), 7), "Ghost"));
        assert_eq!(teams.member(&alice).unwrap().name, "Alicia");
    }

    #[test]
    fn test_remove_teams_ignores_unknown_ids() {
        let mut teams = sample();
        teams.remove_teams(&[TeamId(1), TeamId(42)]);
        assert_eq!(teams.to_string_list(), vec!["02 : Frontend"]);
    }

    #[test]
    fn test_members_of_teams_sorted() {
        let teams = sample();
        let names: Vec<&str> = teams
            .members_of_teams(&[TeamId(2), TeamId(1)])
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    }
}
