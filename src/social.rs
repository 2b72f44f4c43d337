use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Like,
    Save,
}

/// Like/save membership carried by recipes and meal plans.
///
/// `likes` is derived: it always equals `liked_by.len()` after any mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SocialState {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub liked_by: BTreeSet<String>,
    #[serde(default)]
    pub saved_by: BTreeSet<String>,
}

impl SocialState {
    /// Flips membership of `user_id` and returns whether the user is now a member.
    pub fn toggle(&mut self, relation: Relation, user_id: &str) -> bool {
        let member = !self.contains(relation, user_id);
        self.set(relation, user_id, member)
    }

    /// Forces membership to `member`; returns the resulting membership.
    pub fn set(&mut self, relation: Relation, user_id: &str, member: bool) -> bool {
        let set = self.members_mut(relation);
        if member {
            set.insert(user_id.to_owned());
        } else {
            set.remove(user_id);
        }
        self.likes = self.liked_by.len() as u64;
        member
    }

    pub fn contains(&self, relation: Relation, user_id: &str) -> bool {
        match relation {
            Relation::Like => self.liked_by.contains(user_id),
            Relation::Save => self.saved_by.contains(user_id),
        }
    }

    fn members_mut(&mut self, relation: Relation) -> &mut BTreeSet<String> {
        match relation {
            Relation::Like => &mut self.liked_by,
            Relation::Save => &mut self.saved_by,
        }
    }
}

/// Counter-only like action used by the curated catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeAction {
    Like,
    Unlike,
}

impl LikeAction {
    pub fn apply(self, likes: u64) -> u64 {
        match self {
            LikeAction::Like => likes.saturating_add(1),
            LikeAction::Unlike => likes.saturating_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_membership_and_counter() {
        let mut state = SocialState::default();
        state.toggle(Relation::Like, "other");
        let before = state.clone();

        assert!(state.toggle(Relation::Like, "u1"));
        assert_eq!(state.likes, 2);
        assert!(!state.toggle(Relation::Like, "u1"));

        assert_eq!(state, before);
    }

    #[test]
    fn save_does_not_touch_like_counter() {
        let mut state = SocialState::default();
        assert!(state.toggle(Relation::Save, "u1"));
        assert_eq!(state.likes, 0);
        assert!(state.saved_by.contains("u1"));
    }

    #[test]
    fn set_is_idempotent() {
        let mut state = SocialState::default();
        state.set(Relation::Like, "u1", true);
        state.set(Relation::Like, "u1", true);
        assert_eq!(state.likes, 1);
        state.set(Relation::Like, "u1", false);
        state.set(Relation::Like, "u1", false);
        assert_eq!(state.likes, 0);
    }

    #[test]
    fn unlike_saturates_at_zero() {
        assert_eq!(LikeAction::Unlike.apply(0), 0);
        assert_eq!(LikeAction::Like.apply(0), 1);
    }
}
