use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-request health profile used to bias structuring and score dishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Ordered by priority, without duplicates.
    pub goals: Vec<String>,
    pub restrictions: BTreeSet<String>,
    #[serde(default)]
    pub recent_patterns: Vec<String>,
}

impl UserProfile {
    pub fn new<G, R, P>(goals: G, restrictions: R, recent_patterns: P) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let goals = goals
            .into_iter()
            .map(|goal| goal.into().trim().to_string())
            .filter(|goal| !goal.is_empty() && seen.insert(goal.clone()))
            .collect();

        let restrictions = restrictions
            .into_iter()
            .map(|r| r.into().trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        let recent_patterns = recent_patterns
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.trim().is_empty())
            .collect();

        Self {
            goals,
            restrictions,
            recent_patterns,
        }
    }

    pub fn goals_line(&self) -> String {
        join_or_none(self.goals.iter())
    }

    pub fn restrictions_line(&self) -> String {
        join_or_none(self.restrictions.iter())
    }

    pub fn patterns_line(&self) -> String {
        join_or_none(self.recent_patterns.iter())
    }
}

fn join_or_none<'a>(values: impl Iterator<Item = &'a String>) -> String {
    let joined = values.map(String::as_str).collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goals_keep_first_occurrence_order() {
        let profile = UserProfile::new(
            ["muscle-gain", "low-sugar", "muscle-gain", " "],
            ["vegan", "gluten-free", "vegan"],
            Vec::<String>::new(),
        );

        assert_eq!(profile.goals, vec!["muscle-gain", "low-sugar"]);
        assert_eq!(profile.restrictions.len(), 2);
        assert_eq!(profile.restrictions_line(), "gluten-free, vegan");
        assert_eq!(profile.patterns_line(), "none");
    }
}
