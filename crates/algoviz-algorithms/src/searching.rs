//! Linear and binary search over the array instance.

use algoviz_engine::{
    Algorithm, Cancelled, Driver, Outcome, Pace, Patch, RunInput, SearchRange, StatKind, Step,
    StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

use crate::sorting::WorkingArray;

/// Scans left to right and stops at the first match.
#[derive(Debug, Default)]
pub struct LinearSearch;

impl Driver for LinearSearch {
    fn algorithm(&self) -> Algorithm {
        Algorithm::LinearSearch
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let array = WorkingArray::from_instance(&input.instance);
            let Some(target) = input.target else {
                return no_target(&emitter).await;
            };
            start(&emitter, target).await?;

            for i in 0..array.len() {
                let value = array.value(i);
                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::probe(i))
                            .patch(Patch::CodeLine(Some(1)))
                            .log(format!("Checking index {i}: value {value}"))
                            .stat(StatKind::Comparison),
                    )
                    .await?;
                if value == target {
                    return found(&emitter, target, i).await;
                }
            }
            not_found(&emitter, target).await
        }
        .boxed()
    }
}

/// Halving search on a sorted array. An unsorted instance is sorted first.
#[derive(Debug, Default)]
pub struct BinarySearch;

impl Driver for BinarySearch {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BinarySearch
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let mut array = WorkingArray::from_instance(&input.instance);
            let Some(target) = input.target else {
                return no_target(&emitter).await;
            };

            if !array.is_sorted() {
                let reorder = array.sort_stable();
                emitter
                    .emit(
                        Step::new()
                            .patch(reorder)
                            .log("Array sorted automatically for Binary Search."),
                    )
                    .await?;
            }
            start(&emitter, target).await?;

            if array.is_empty() {
                return not_found(&emitter, target).await;
            }
            let (mut low, mut high) = (0, array.len() - 1);
            while low <= high {
                let mid = low + (high - low) / 2;
                let value = array.value(mid);
                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::SearchRange(Some(SearchRange { low, mid, high })))
                            .patch(Patch::probe(mid))
                            .patch(Patch::CodeLine(Some(2)))
                            .log(format!("Checking middle index {mid} (value {value})"))
                            .stat(StatKind::Comparison),
                    )
                    .await?;

                if value == target {
                    return found(&emitter, target, mid).await;
                }
                if value < target {
                    low = mid + 1;
                } else if mid == 0 {
                    break;
                } else {
                    high = mid - 1;
                }
            }
            not_found(&emitter, target).await
        }
        .boxed()
    }
}

async fn start(emitter: &StepEmitter, target: i64) -> Result<(), Cancelled> {
    emitter
        .emit(
            Step::new()
                .patch(Patch::Target(Some(target)))
                .patch(Patch::Found(None))
                .patch(Patch::describe(format!("Searching for {target}")))
                .log(format!("Searching for {target}..."))
                .pace(Pace::Half),
        )
        .await
}

async fn found(emitter: &StepEmitter, target: i64, index: usize) -> Result<Outcome, Cancelled> {
    emitter
        .emit(
            Step::new()
                .patch(Patch::Found(Some(index)))
                .patch(Patch::SearchRange(None))
                .patch(Patch::CodeLine(None))
                .patch(Patch::describe(format!("Found {target}")))
                .log(format!("Found {target} at index {index}!")),
        )
        .await?;
    Ok(Outcome::Found { index })
}

async fn not_found(emitter: &StepEmitter, target: i64) -> Result<Outcome, Cancelled> {
    emitter
        .emit(
            Step::new()
                .patch(Patch::ClearHighlights)
                .patch(Patch::NotFound)
                .patch(Patch::SearchRange(None))
                .patch(Patch::CodeLine(None))
                .patch(Patch::describe(format!("{target} not found")))
                .log(format!("{target} not found in array.")),
        )
        .await?;
    Ok(Outcome::NotFound)
}

async fn no_target(emitter: &StepEmitter) -> Result<Outcome, Cancelled> {
    emitter
        .emit(Step::new().log("No search target set.").pace(Pace::Instant))
        .await?;
    Ok(Outcome::Skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{log_lines, run};
    use algoviz_engine::{Element, ProblemInstance, Scenario};

    fn scenario(values: &[i64], target: i64) -> Scenario {
        Scenario::new(ProblemInstance::Array(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Element::new(i as u64, *v))
                .collect(),
        ))
        .with_target(target)
    }

    #[tokio::test]
    async fn binary_search_probes_two_four_three() {
        let (outcome, state) = run(&mut BinarySearch, scenario(&[1, 3, 5, 7, 9, 11], 7)).await;
        assert_eq!(outcome, Outcome::Found { index: 3 });
        let probes: Vec<String> = log_lines(&state)
            .into_iter()
            .filter(|l| l.starts_with("Checking middle"))
            .collect();
        assert_eq!(
            probes,
            vec![
                "Checking middle index 2 (value 5)",
                "Checking middle index 4 (value 9)",
                "Checking middle index 3 (value 7)",
            ]
        );
        assert_eq!(state.markers.found, Some(3));
    }

    #[tokio::test]
    async fn binary_search_sorts_unsorted_input() {
        let (outcome, state) = run(&mut BinarySearch, scenario(&[9, 1, 5], 9)).await;
        assert_eq!(outcome, Outcome::Found { index: 2 });
        assert!(log_lines(&state).contains(&"Array sorted automatically for Binary Search.".to_string()));
        let values: Vec<i64> = state.instance.as_array().unwrap().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1, 5, 9]);
    }

    #[tokio::test]
    async fn binary_search_below_range_does_not_underflow() {
        let (outcome, state) = run(&mut BinarySearch, scenario(&[4, 6, 8], 1)).await;
        assert_eq!(outcome, Outcome::NotFound);
        assert!(state.markers.not_found);
        assert!(state.stats.comparisons <= 2);
    }

    #[tokio::test]
    async fn linear_search_returns_first_match() {
        let (outcome, state) = run(&mut LinearSearch, scenario(&[4, 7, 2, 7], 7)).await;
        assert_eq!(outcome, Outcome::Found { index: 1 });
        assert_eq!(state.stats.comparisons, 2);
    }

    #[tokio::test]
    async fn empty_instance_is_not_found() {
        let (outcome, _) = run(&mut LinearSearch, scenario(&[], 3)).await;
        assert_eq!(outcome, Outcome::NotFound);
        let (outcome, _) = run(&mut BinarySearch, scenario(&[], 3)).await;
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[tokio::test]
    async fn missing_target_is_skipped() {
        let scenario = Scenario::new(ProblemInstance::Array(vec![Element::new(0, 1)]));
        let (outcome, state) = run(&mut LinearSearch, scenario).await;
        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(state.stats.comparisons, 0);
    }
}
