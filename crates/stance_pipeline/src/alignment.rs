//! "You vs everyone": where one rater stands relative to the population.

use serde::Serialize;

use stance_core::{ConsensusLevel, ConsensusSnapshot, Rating, Stance};

/// The population figures a display layer shows next to the user's stance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PopulationSummary {
    pub support_percent: u8,
    pub neutral_percent: u8,
    pub oppose_percent: u8,
    pub total_participants: u64,
    pub consensus_level: ConsensusLevel,
    pub majority: Option<Stance>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Alignment {
    pub user_stance: Option<Stance>,
    /// Share of the population on the user's side (support/neutral/oppose bucket).
    pub agreeing_percent: Option<u8>,
    /// Whether the user sides with a strict majority; `None` without a rating or majority.
    pub with_majority: Option<bool>,
    pub population: PopulationSummary,
}

pub fn you_vs_everyone(user: Option<Rating>, snapshot: &ConsensusSnapshot) -> Alignment {
    let user_stance = user.map(Rating::stance);
    let empty = snapshot.total_participants == 0;

    let agreeing_percent = match user_stance {
        Some(s) if !empty => Some(snapshot.percent_of(s)),
        _ => None,
    };
    let with_majority = match (user_stance, snapshot.majority) {
        (Some(s), Some(m)) => Some(s == m),
        _ => None,
    };

    Alignment {
        user_stance,
        agreeing_percent,
        with_majority,
        population: PopulationSummary {
            support_percent: snapshot.support_percent,
            neutral_percent: snapshot.distribution.neutral,
            oppose_percent: snapshot.oppose_percent,
            total_participants: snapshot.total_participants,
            consensus_level: snapshot.consensus_level,
            majority: snapshot.majority,
        },
    }
}
