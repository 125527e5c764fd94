//! Outbound event queue for round results
//!
//! Gameplay code never calls a sink. The round controller enqueues typed
//! events here at the `Over` transition and a host-side dispatcher drains
//! them afterwards, fire-and-forget. A sink failure is the dispatcher's
//! problem to log; nothing in here retries or blocks.

use serde::{Deserialize, Serialize};

use crate::levels::GameMode;
use crate::profile::{PlayerProfile, ProfileDelta, RoundSummary, apply_round};

/// Coarse device bucket for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    Desktop,
    Mobile,
    Unknown,
}

/// One outbound record, addressed to a specific sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    ProfileUpdate {
        user_id: String,
        delta: ProfileDelta,
    },
    LeaderboardEntry {
        display_name: String,
        score: u32,
        difficulty: String,
        timestamp_ms: u64,
    },
    Telemetry {
        user_id: String,
        score: u32,
        difficulty: String,
        timestamp_ms: u64,
        device_class: DeviceClass,
    },
}

/// FIFO queue between the round controller and the host dispatcher.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<RoundEvent>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: RoundEvent) {
        self.events.push(event);
    }

    /// Hand every queued event to the dispatcher, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Enqueue everything a finished round produces.
///
/// Gating rules:
/// - telemetry goes out for every round, signed in or not;
/// - a profile update goes out whenever an identity with a non-empty
///   user id is present (there is nobody to address one to otherwise);
/// - a leaderboard entry needs a named non-anonymous identity, a mode
///   that keeps score (not Zen) and a score above zero.
///
/// Returns the profile delta so the host can also refresh its local view.
pub fn round_completed(
    outbox: &mut Outbox,
    profile: Option<&PlayerProfile>,
    summary: &RoundSummary,
    timestamp_ms: u64,
    device_class: DeviceClass,
) -> Option<ProfileDelta> {
    let user_id = profile
        .map(|p| p.user_id.clone())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "anonymous".to_string());

    outbox.push(RoundEvent::Telemetry {
        user_id: user_id.clone(),
        score: summary.score,
        difficulty: summary.difficulty.clone(),
        timestamp_ms,
        device_class,
    });

    let delta = profile.map(|p| apply_round(p, summary));

    if let (Some(p), Some(d)) = (profile, delta.as_ref()) {
        if !p.user_id.is_empty() {
            outbox.push(RoundEvent::ProfileUpdate {
                user_id,
                delta: d.clone(),
            });
        }

        if p.can_submit_scores() && summary.mode != GameMode::Zen && summary.score > 0 {
            if let Some(name) = p.display_name.as_ref() {
                outbox.push(RoundEvent::LeaderboardEntry {
                    display_name: name.clone(),
                    score: summary.score,
                    difficulty: summary.difficulty.clone(),
                    timestamp_ms,
                });
            }
        }
    }

    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(score: u32, mode: GameMode) -> RoundSummary {
        RoundSummary {
            score,
            coins: 0,
            difficulty: "hard".to_string(),
            mode,
            shield_absorbs: 0,
            slowmo_used: false,
            collisions: 0,
            duration_frames: 600,
        }
    }

    fn named_profile() -> PlayerProfile {
        PlayerProfile {
            user_id: "u42".to_string(),
            display_name: Some("Alex".to_string()),
            ..Default::default()
        }
    }

    fn has_leaderboard(events: &[RoundEvent]) -> bool {
        events
            .iter()
            .any(|e| matches!(e, RoundEvent::LeaderboardEntry { .. }))
    }

    #[test]
    fn anonymous_round_emits_telemetry_only() {
        let mut outbox = Outbox::new();
        let delta = round_completed(
            &mut outbox,
            None,
            &summary(7, GameMode::Classic),
            1_000,
            DeviceClass::Desktop,
        );
        assert!(delta.is_none());
        let events = outbox.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            RoundEvent::Telemetry { user_id, score: 7, .. } if user_id == "anonymous"
        ));
        assert!(outbox.is_empty());
    }

    #[test]
    fn named_player_gets_all_three_sinks() {
        let mut outbox = Outbox::new();
        let profile = named_profile();
        let delta = round_completed(
            &mut outbox,
            Some(&profile),
            &summary(12, GameMode::Classic),
            2_000,
            DeviceClass::Mobile,
        );
        assert_eq!(delta.map(|d| d.new_high_score), Some(Some(12)));
        let events = outbox.drain();
        assert_eq!(events.len(), 3);
        assert!(has_leaderboard(&events));
    }

    #[test]
    fn zen_round_skips_the_leaderboard() {
        let mut outbox = Outbox::new();
        let profile = named_profile();
        round_completed(
            &mut outbox,
            Some(&profile),
            &summary(12, GameMode::Zen),
            0,
            DeviceClass::Unknown,
        );
        let events = outbox.drain();
        assert_eq!(events.len(), 2);
        assert!(!has_leaderboard(&events));
    }

    #[test]
    fn zero_score_rounds_skip_the_leaderboard() {
        let mut outbox = Outbox::new();
        let profile = named_profile();
        round_completed(
            &mut outbox,
            Some(&profile),
            &summary(0, GameMode::Classic),
            0,
            DeviceClass::Desktop,
        );
        assert!(!has_leaderboard(&outbox.drain()));
    }

    #[test]
    fn anonymous_identity_skips_the_leaderboard() {
        let mut outbox = Outbox::new();
        let mut profile = named_profile();
        profile.anonymous = true;
        round_completed(
            &mut outbox,
            Some(&profile),
            &summary(12, GameMode::Classic),
            0,
            DeviceClass::Desktop,
        );
        let events = outbox.drain();
        // Profile update and telemetry still flow
        assert_eq!(events.len(), 2);
        assert!(!has_leaderboard(&events));
    }

    #[test]
    fn empty_user_id_emits_telemetry_only() {
        let mut outbox = Outbox::new();
        let profile = PlayerProfile {
            display_name: Some("Alex".to_string()),
            ..Default::default()
        };
        assert!(profile.user_id.is_empty());
        round_completed(
            &mut outbox,
            Some(&profile),
            &summary(9, GameMode::Classic),
            0,
            DeviceClass::Desktop,
        );
        let events = outbox.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            RoundEvent::Telemetry { user_id, .. } if user_id == "anonymous"
        ));
    }

    #[test]
    fn drain_empties_the_queue() {
        let mut outbox = Outbox::new();
        round_completed(
            &mut outbox,
            None,
            &summary(1, GameMode::Classic),
            0,
            DeviceClass::Desktop,
        );
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox.drain().len(), 1);
        assert!(outbox.drain().is_empty());
    }
}
