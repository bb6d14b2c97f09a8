//! Consensus aggregation over one policy's population ratings.
//!
//! Bucketing: support `r > 0`, oppose `r < 0`, neutral `r == 0`.
//! Percentages are whole numbers that sum to exactly 100 (see
//! `stance_core::rounding::apportion_percent`); the consensus level compares
//! the majority side's raw count against the thresholds in integers.

use std::collections::BTreeMap;

use stance_core::{
    rounding::{apportion_percent, ge_percent},
    ConsensusConfig, ConsensusLevel, ConsensusSnapshot, Counts, Distribution, GroupBreakdown,
    GroupId, PopulationRating, Stance,
};

fn tally<'a, I: IntoIterator<Item = &'a PopulationRating>>(rows: I) -> Counts {
    let mut c = Counts::default();
    for row in rows {
        match row.rating.stance() {
            Stance::Support => c.support += 1,
            Stance::Neutral => c.neutral += 1,
            Stance::Oppose => c.oppose += 1,
        }
    }
    c
}

/// `[support, oppose, neutral]`: the drift-absorbing tie order.
fn percents(c: &Counts) -> Distribution {
    let [support, oppose, neutral] = apportion_percent([c.support, c.oppose, c.neutral]);
    Distribution { support, neutral, oppose }
}

fn level(c: &Counts, cfg: &ConsensusConfig) -> ConsensusLevel {
    let total = c.total();
    let majority = c.support.max(c.oppose);
    if ge_percent(majority, total, cfg.strong_pct) {
        ConsensusLevel::Strong
    } else if ge_percent(majority, total, cfg.moderate_pct) {
        ConsensusLevel::Moderate
    } else {
        ConsensusLevel::Divided
    }
}

fn majority(c: &Counts) -> Option<Stance> {
    use core::cmp::Ordering::*;
    match c.support.cmp(&c.oppose) {
        Greater => Some(Stance::Support),
        Less => Some(Stance::Oppose),
        Equal => None,
    }
}

/// Aggregate population rows into a snapshot. Empty input yields
/// `ConsensusSnapshot::empty()`.
pub fn aggregate(rows: &[PopulationRating], cfg: &ConsensusConfig) -> ConsensusSnapshot {
    if rows.is_empty() {
        return ConsensusSnapshot::empty();
    }

    let counts = tally(rows);
    let distribution = percents(&counts);

    let mut grouped: BTreeMap<&GroupId, Vec<&PopulationRating>> = BTreeMap::new();
    for row in rows {
        if let Some(g) = &row.group {
            grouped.entry(g).or_default().push(row);
        }
    }
    let by_group = if grouped.is_empty() {
        None
    } else {
        Some(
            grouped
                .into_iter()
                .map(|(g, members)| {
                    let c = tally(members);
                    let d = percents(&c);
                    (
                        g.clone(),
                        GroupBreakdown { support: d.support, oppose: d.oppose, participants: c.total() },
                    )
                })
                .collect(),
        )
    };

    ConsensusSnapshot {
        support_percent: distribution.support,
        oppose_percent: distribution.oppose,
        distribution,
        total_participants: counts.total(),
        counts,
        by_group,
        consensus_level: level(&counts, cfg),
        majority: majority(&counts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::Rating;

    fn rows(vals: &[i8]) -> Vec<PopulationRating> {
        vals.iter().map(|&v| PopulationRating::new(Rating::new(v).unwrap())).collect()
    }

    fn grouped(vals: &[(i8, &str)]) -> Vec<PopulationRating> {
        vals.iter()
            .map(|&(v, g)| PopulationRating::in_group(Rating::new(v).unwrap(), g.parse().unwrap()))
            .collect()
    }

    #[test]
    fn split_population_is_divided() {
        let s = aggregate(&rows(&[2, 2, 1, 0, -1, -2, -2]), &ConsensusConfig::default());
        assert_eq!(s.support_percent, 43);
        assert_eq!(s.oppose_percent, 43);
        assert_eq!(s.distribution.neutral, 14);
        assert_eq!(s.total_participants, 7);
        assert_eq!(s.counts, Counts { support: 3, neutral: 1, oppose: 3 });
        assert_eq!(s.consensus_level, ConsensusLevel::Divided);
        assert_eq!(s.majority, None);
        assert!(s.by_group.is_none());
    }

    #[test]
    fn thresholds_are_inclusive_integer_tests() {
        let cfg = ConsensusConfig::default();
        // 7 of 10 support: exactly 70%.
        let s = aggregate(&rows(&[1, 1, 1, 1, 1, 1, 2, -1, 0, 0]), &cfg);
        assert_eq!(s.consensus_level, ConsensusLevel::Strong);
        assert_eq!(s.majority, Some(Stance::Support));
        // 11 of 20 oppose: exactly 55%.
        let mut v = vec![-1i8; 11];
        v.extend([1i8; 9]);
        let s = aggregate(&rows(&v), &cfg);
        assert_eq!(s.consensus_level, ConsensusLevel::Moderate);
        assert_eq!(s.majority, Some(Stance::Oppose));
    }

    #[test]
    fn empty_input_is_zeroed() {
        let s = aggregate(&[], &ConsensusConfig::default());
        assert_eq!(s, ConsensusSnapshot::empty());
    }

    #[test]
    fn groups_report_their_own_split() {
        let mut input = grouped(&[(2, "north"), (1, "north"), (-1, "south"), (0, "south")]);
        input.push(PopulationRating::new(Rating::SUPPORT));
        let s = aggregate(&input, &ConsensusConfig::default());
        assert_eq!(s.total_participants, 5);
        let g = s.by_group.unwrap();
        assert_eq!(g.len(), 2);
        let north = g[&"north".parse::<GroupId>().unwrap()];
        assert_eq!((north.support, north.oppose, north.participants), (100, 0, 2));
        let south = g[&"south".parse::<GroupId>().unwrap()];
        assert_eq!((south.support, south.oppose, south.participants), (0, 50, 2));
    }

    #[test]
    fn drift_goes_to_largest_bucket() {
        // 1/3 each: support wins the tie and takes the extra point.
        let s = aggregate(&rows(&[1, -1, 0]), &ConsensusConfig::default());
        assert_eq!((s.support_percent, s.oppose_percent, s.distribution.neutral), (34, 33, 33));
    }
}
