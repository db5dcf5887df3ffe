//! Decision policies for permission rolls and reward candidate matching.
use serde::Deserialize;

use crate::catalog::records::{Permission, Reward};

use super::dice::RandomSource;

/// What happens when the probabilistic permission roll fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionPolicy {
    /// A failed roll still grants: once mood reaches `min_mood` permission is always given.
    #[default]
    FallThrough,
    /// A failed roll denies.
    Strict,
}

impl PermissionPolicy {
    pub fn label(self) -> &'static str {
        match self {
            Self::FallThrough => "fall_through",
            Self::Strict => "strict",
        }
    }

    pub fn decide(self, mood: f64, permission: &Permission, dice: &mut dyn RandomSource) -> bool {
        if mood < permission.min_mood {
            return false;
        }

        if mood < permission.certain_mood {
            let probability =
                (mood - permission.min_mood) / (permission.certain_mood - permission.min_mood);
            if dice.roll() <= probability {
                return true;
            }
            return match self {
                Self::FallThrough => true,
                Self::Strict => false,
            };
        }

        true
    }
}

/// How the reward candidate set is compared against the smallest deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardMatchPolicy {
    /// Keeps rewards whose value equals the smallest deviation itself.
    #[default]
    Deviation,
    /// Keeps every reward sitting at the smallest distance from the target.
    ClosestValue,
}

impl RewardMatchPolicy {
    pub fn label(self) -> &'static str {
        match self {
            Self::Deviation => "deviation",
            Self::ClosestValue => "closest_value",
        }
    }

    pub fn matches(self, value: f64, target: f64, smallest_deviation: f64) -> bool {
        match self {
            Self::Deviation => value == smallest_deviation,
            Self::ClosestValue => {
                let deviation = value - target;
                deviation * deviation == smallest_deviation * smallest_deviation
            }
        }
    }
}

/// Signed deviation `value - target` with the smallest square.
///
/// The search starts from `initial_bound` and only replaces it on a strictly
/// smaller square, so the first reward wins among equally distant ones.
pub fn smallest_deviation(rewards: &[Reward], target: f64, initial_bound: f64) -> f64 {
    let mut smallest = initial_bound;
    for reward in rewards {
        let current = reward.value - target;
        if current * current < smallest * smallest {
            smallest = current;
        }
    }
    smallest
}

pub fn reward_candidates<'a>(
    rewards: &'a [Reward],
    target: f64,
    initial_bound: f64,
    policy: RewardMatchPolicy,
) -> Vec<&'a Reward> {
    let smallest = smallest_deviation(rewards, target, initial_bound);
    rewards
        .iter()
        .filter(|reward| policy.matches(reward.value, target, smallest))
        .collect()
}
