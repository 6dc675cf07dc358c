use serde::Serialize;

use crate::models::enums::AnimationStep;
use crate::models::structs::ParsedQuery;

/// Ordered, query-specific subsequence of [`AnimationStep::CANONICAL`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StepPlan {
    steps: Vec<AnimationStep>,
}

impl StepPlan {
    pub fn for_query(query: &ParsedQuery) -> Self {
        if query.tables.is_empty() {
            return Self::default();
        }

        let steps = AnimationStep::CANONICAL
            .into_iter()
            .filter(|step| match step {
                AnimationStep::Parse
                | AnimationStep::Select
                | AnimationStep::From
                | AnimationStep::Result => true,
                AnimationStep::Join => !query.joins.is_empty(),
                AnimationStep::Where => !query.where_conditions.is_empty(),
                AnimationStep::GroupBy => !query.group_by_columns.is_empty(),
                AnimationStep::Having => !query.having_conditions.is_empty(),
                AnimationStep::OrderBy => query.order_by.is_some(),
            })
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<AnimationStep> {
        self.steps.get(index).copied()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    /// Ordinal of `step` within this plan, if planned.
    pub fn position(&self, step: AnimationStep) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    /// Only Parse, Select, From and Result: nothing filters, groups or sorts.
    pub fn is_minimal(&self) -> bool {
        self.steps.len() == 4
    }

    /// Plain-language description of the step at `index`.
    pub fn describe(&self, index: usize) -> Option<&'static str> {
        let text = match self.get(index)? {
            AnimationStep::Parse => "Parsing the query text",
            AnimationStep::Select => "Identifying the selected columns",
            AnimationStep::From => "Reading rows from the source tables",
            AnimationStep::Join => "Joining tables on their join conditions",
            AnimationStep::Where => "Filtering rows with the WHERE conditions",
            AnimationStep::GroupBy => "Grouping rows by the GROUP BY columns",
            AnimationStep::Having => "Filtering groups with the HAVING conditions",
            AnimationStep::OrderBy => "Sorting rows by the ORDER BY expression",
            AnimationStep::Result if self.is_minimal() => {
                "Returning the rows read from the source tables"
            }
            AnimationStep::Result => "Returning the joined, filtered and ordered result set",
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_ast::analyze;

    #[test]
    fn empty_without_tables() {
        let plan = StepPlan::for_query(&analyze("SELECT 1"));
        assert!(plan.is_empty());
        assert_eq!(plan.last_index(), None);
        assert_eq!(plan.describe(0), None);
    }

    #[test]
    fn ordinals_depend_on_present_clauses() {
        let plan = StepPlan::for_query(&analyze("SELECT a FROM t GROUP BY a HAVING COUNT(*) > 1"));
        assert_eq!(
            plan.steps(),
            &[
                AnimationStep::Parse,
                AnimationStep::Select,
                AnimationStep::From,
                AnimationStep::GroupBy,
                AnimationStep::Having,
                AnimationStep::Result,
            ]
        );
        assert_eq!(plan.position(AnimationStep::GroupBy), Some(3));
        assert_eq!(plan.position(AnimationStep::Join), None);
    }

    #[test]
    fn result_description_depends_on_plan_richness() {
        let minimal = StepPlan::for_query(&analyze("SELECT a FROM t"));
        let rich = StepPlan::for_query(&analyze("SELECT a FROM t WHERE a = 1"));
        let minimal_text = minimal.describe(minimal.len() - 1);
        let rich_text = rich.describe(rich.len() - 1);
        assert!(minimal.is_minimal());
        assert!(!rich.is_minimal());
        assert_ne!(minimal_text, rich_text);
    }
}
