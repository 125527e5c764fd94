//! Player identity and round-end profile accounting
//!
//! The core never talks to an account backend directly. It reads a
//! [`PlayerProfile`] snapshot supplied by the host and, when a round
//! finishes, computes a [`ProfileDelta`] describing everything the
//! backend should persist. The delta goes out through the outbox; the
//! host dispatches it fire-and-forget.

use serde::{Deserialize, Serialize};

use crate::levels::GameMode;

/// Unlockable milestones, granted at most once per profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Achievement {
    /// First round with a score of 50 or more
    FirstFifty,
    /// Finished a scoring round without a single collision or absorb
    Untouchable,
    /// Used a SlowMo pickup
    TimeBender,
    /// Played the 100th round
    Centurion,
}

impl Achievement {
    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstFifty => "Half Century",
            Achievement::Untouchable => "Untouchable",
            Achievement::TimeBender => "Time Bender",
            Achievement::Centurion => "Centurion",
        }
    }
}

/// Snapshot of the signed-in player, as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Guest sessions get a throwaway id and no leaderboard presence
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub high_score: u32,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

impl PlayerProfile {
    pub fn has(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }

    /// True when a leaderboard entry may carry this player's name.
    pub fn can_submit_scores(&self) -> bool {
        !self.anonymous && !self.user_id.is_empty() && self.display_name.is_some()
    }
}

/// What happened in one finished round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u32,
    pub coins: u32,
    pub difficulty: String,
    pub mode: GameMode,
    pub shield_absorbs: u32,
    pub slowmo_used: bool,
    pub collisions: u32,
    pub duration_frames: u64,
}

/// Everything the backend should persist after a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDelta {
    /// Set only when the round beat the stored high score
    pub new_high_score: Option<u32>,
    pub games_played: u32,
    pub xp_gain: u32,
    pub unlocked: Vec<Achievement>,
    pub last_game: RoundSummary,
}

/// Fold one finished round into the profile.
///
/// Zen rounds count toward games played and XP from coins but never
/// touch the high score or score-based achievements; Zen has no score
/// to keep.
pub fn apply_round(profile: &PlayerProfile, summary: &RoundSummary) -> ProfileDelta {
    let scoring = summary.mode != GameMode::Zen;
    let games_played = profile.games_played.saturating_add(1);

    let new_high_score = if scoring && summary.score > profile.high_score {
        Some(summary.score)
    } else {
        None
    };

    let xp_gain = if scoring {
        summary.score * 10 + summary.coins * 5
    } else {
        summary.coins * 5
    };

    let mut unlocked = Vec::new();
    if scoring && summary.score >= 50 && !profile.has(Achievement::FirstFifty) {
        unlocked.push(Achievement::FirstFifty);
    }
    if scoring
        && summary.score > 0
        && summary.collisions == 0
        && summary.shield_absorbs == 0
        && !profile.has(Achievement::Untouchable)
    {
        unlocked.push(Achievement::Untouchable);
    }
    if summary.slowmo_used && !profile.has(Achievement::TimeBender) {
        unlocked.push(Achievement::TimeBender);
    }
    if games_played == 100 && !profile.has(Achievement::Centurion) {
        unlocked.push(Achievement::Centurion);
    }

    ProfileDelta {
        new_high_score,
        games_played,
        xp_gain,
        unlocked,
        last_game: summary.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(score: u32) -> RoundSummary {
        RoundSummary {
            score,
            coins: 3,
            difficulty: "normal".to_string(),
            mode: GameMode::Classic,
            shield_absorbs: 0,
            slowmo_used: false,
            collisions: 0,
            duration_frames: 1800,
        }
    }

    #[test]
    fn high_score_only_recorded_when_beaten() {
        let mut profile = PlayerProfile {
            high_score: 20,
            ..Default::default()
        };
        assert_eq!(apply_round(&profile, &summary(21)).new_high_score, Some(21));
        assert_eq!(apply_round(&profile, &summary(20)).new_high_score, None);
        profile.high_score = 0;
        assert_eq!(apply_round(&profile, &summary(0)).new_high_score, None);
    }

    #[test]
    fn zen_rounds_never_touch_the_high_score() {
        let profile = PlayerProfile::default();
        let mut s = summary(500);
        s.mode = GameMode::Zen;
        let delta = apply_round(&profile, &s);
        assert_eq!(delta.new_high_score, None);
        assert!(!delta.unlocked.contains(&Achievement::FirstFifty));
        assert_eq!(delta.games_played, 1);
        assert_eq!(delta.xp_gain, 15); // coins only
    }

    #[test]
    fn first_fifty_unlocks_once() {
        let mut profile = PlayerProfile::default();
        let delta = apply_round(&profile, &summary(50));
        assert!(delta.unlocked.contains(&Achievement::FirstFifty));

        profile.achievements.push(Achievement::FirstFifty);
        let delta = apply_round(&profile, &summary(80));
        assert!(!delta.unlocked.contains(&Achievement::FirstFifty));
    }

    #[test]
    fn untouchable_requires_a_clean_scoring_round() {
        let profile = PlayerProfile::default();
        let delta = apply_round(&profile, &summary(5));
        assert!(delta.unlocked.contains(&Achievement::Untouchable));

        let mut absorbed = summary(5);
        absorbed.shield_absorbs = 1;
        let delta = apply_round(&profile, &absorbed);
        assert!(!delta.unlocked.contains(&Achievement::Untouchable));

        // A zero-score round proves nothing
        let delta = apply_round(&profile, &summary(0));
        assert!(!delta.unlocked.contains(&Achievement::Untouchable));
    }

    #[test]
    fn centurion_lands_on_the_hundredth_game() {
        let mut profile = PlayerProfile {
            games_played: 98,
            ..Default::default()
        };
        assert!(
            !apply_round(&profile, &summary(1))
                .unlocked
                .contains(&Achievement::Centurion)
        );
        profile.games_played = 99;
        assert!(
            apply_round(&profile, &summary(1))
                .unlocked
                .contains(&Achievement::Centurion)
        );
    }

    #[test]
    fn slowmo_use_unlocks_time_bender_even_in_zen() {
        let profile = PlayerProfile::default();
        let mut s = summary(0);
        s.mode = GameMode::Zen;
        s.slowmo_used = true;
        let delta = apply_round(&profile, &s);
        assert!(delta.unlocked.contains(&Achievement::TimeBender));
    }

    #[test]
    fn submission_requires_named_non_anonymous_identity() {
        let mut profile = PlayerProfile {
            user_id: "u1".to_string(),
            display_name: Some("Robin".to_string()),
            ..Default::default()
        };
        assert!(profile.can_submit_scores());
        profile.anonymous = true;
        assert!(!profile.can_submit_scores());
        profile.anonymous = false;
        profile.display_name = None;
        assert!(!profile.can_submit_scores());
    }
}
