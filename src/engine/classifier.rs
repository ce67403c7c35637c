use crate::core::config::SorterConfig;
use crate::core::domain::Side::{After, Before};
use crate::core::domain::{BondLengths, Classification, OutcomeCategory, Side};

use self::Condition::{Broken, Formed};

/// A single geometric test on the terminal bond lengths of one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    /// Bond (0-based position) is longer than the break threshold.
    Broken { side: Side, bond: usize },
    /// Bond (0-based position) is shorter than the formation threshold.
    Formed { side: Side, bond: usize },
}

/// Both conditions must hold for the rule to fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub conditions: [Condition; 2],
    pub outcome: Classification,
}

impl Rule {
    const fn new(
        first: Condition,
        second: Condition,
        category: OutcomeCategory,
        reverse_first: bool,
    ) -> Self {
        Self {
            conditions: [first, second],
            outcome: Classification {
                category,
                reverse_first,
            },
        }
    }
}

/// The reaction's decision table, highest priority first.
pub const STANDARD_RULES: [Rule; 5] = [
    Rule::new(
        Broken { side: Before, bond: 0 },
        Broken { side: After, bond: 0 },
        OutcomeCategory::RecrossReactant,
        true,
    ),
    Rule::new(
        Broken { side: Before, bond: 0 },
        Formed { side: After, bond: 1 },
        OutcomeCategory::ProductChannel1,
        true,
    ),
    Rule::new(
        Broken { side: After, bond: 0 },
        Formed { side: Before, bond: 1 },
        OutcomeCategory::ProductChannel1,
        false,
    ),
    Rule::new(
        Broken { side: Before, bond: 0 },
        Formed { side: After, bond: 2 },
        OutcomeCategory::ProductChannel2,
        true,
    ),
    Rule::new(
        Broken { side: After, bond: 0 },
        Formed { side: Before, bond: 2 },
        OutcomeCategory::ProductChannel2,
        false,
    ),
];

pub const FALLBACK: Classification = Classification {
    category: OutcomeCategory::Generic,
    reverse_first: true,
};

/// First-match-wins evaluation of an ordered rule list.
///
/// Total: anything no rule claims (including NaN lengths, which fail every
/// comparison) gets the fallback.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    fallback: Classification,
    break_threshold: f64,
    formation_threshold: f64,
}

impl Classifier {
    pub fn new(break_threshold: f64, formation_threshold: f64) -> Self {
        Self {
            rules: STANDARD_RULES.to_vec(),
            fallback: FALLBACK,
            break_threshold,
            formation_threshold,
        }
    }

    pub fn from_config(config: &SorterConfig) -> Self {
        Self::new(config.break_threshold, config.formation_threshold)
    }

    fn holds(&self, cond: &Condition, before: &BondLengths, after: &BondLengths) -> bool {
        let pick = |side: Side| match side {
            Side::Before => before,
            Side::After => after,
        };
        match *cond {
            Broken { side, bond } => pick(side)
                .get(bond)
                .map_or(false, |d| d > self.break_threshold),
            Formed { side, bond } => pick(side)
                .get(bond)
                .map_or(false, |d| d < self.formation_threshold),
        }
    }

    /// Position of the rule that fires, `None` for the fallback.
    pub fn matching_rule(&self, before: &BondLengths, after: &BondLengths) -> Option<usize> {
        self.rules.iter().position(|rule| {
            rule.conditions
                .iter()
                .all(|c| self.holds(c, before, after))
        })
    }

    pub fn classify(&self, before: &BondLengths, after: &BondLengths) -> Classification {
        self.matching_rule(before, after)
            .map(|i| self.rules[i].outcome)
            .unwrap_or(self.fallback)
    }
}
