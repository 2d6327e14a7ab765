use algoviz_engine::{
    Algorithm, Cancelled, Driver, Outcome, Patch, RunInput, Step, StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

use super::{announce, compare, finish, swap, WorkingArray};

/// Insertion sort, sinking each key by adjacent swaps.
#[derive(Debug, Default)]
pub struct InsertionSort;

impl Driver for InsertionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::InsertionSort
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        sort(WorkingArray::from_instance(&input.instance), emitter).boxed()
    }
}

async fn sort(mut array: WorkingArray, emitter: StepEmitter) -> Result<Outcome, Cancelled> {
    announce(&emitter, "Starting Insertion Sort...").await?;

    for i in 1..array.len() {
        let key = array.value(i);
        emitter
            .emit(
                Step::new()
                    .patch(Patch::probe(i))
                    .patch(Patch::CodeLine(Some(1)))
                    .log(format!("Selecting key: {key} at index {i}")),
            )
            .await?;

        let mut j = i;
        while j > 0 {
            let left = array.value(j - 1);
            compare(&emitter, j - 1, j, 2, format!("Comparing {left} with key {key}")).await?;
            // Strict: equal values never pass each other.
            if left <= key {
                break;
            }
            swap(&emitter, &mut array, j - 1, j, 3, format!("Moving {left} to position {j}")).await?;
            j -= 1;
        }

        emitter
            .emit(
                Step::new()
                    .patch(Patch::ClearHighlights)
                    .patch(Patch::SetSorted {
                        indices: (0..=i).collect(),
                    }),
            )
            .await?;
    }

    finish(&emitter, "Array Sorted!").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::run;
    use algoviz_engine::{Element, ProblemInstance, Scenario};

    #[tokio::test]
    async fn sorts_and_keeps_equal_keys_in_order() {
        let items = vec![
            Element::new(0, 4),
            Element::new(1, 2),
            Element::new(2, 4),
            Element::new(3, 1),
        ];
        let (outcome, state) =
            run(&mut InsertionSort, Scenario::new(ProblemInstance::Array(items))).await;
        assert_eq!(outcome, Outcome::Sorted);
        let ids: Vec<u64> = state.instance.as_array().unwrap().iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![3, 1, 0, 2]);
        assert_eq!(state.markers.sorted.len(), 4);
    }

    #[tokio::test]
    async fn reverse_sorted_swaps_every_pair() {
        let items = (0..4).map(|i| Element::new(i, 4 - i as i64)).collect();
        let (_, state) = run(&mut InsertionSort, Scenario::new(ProblemInstance::Array(items))).await;
        assert_eq!(state.stats.swaps, 6);
        assert_eq!(state.stats.comparisons, 6);
    }
}
