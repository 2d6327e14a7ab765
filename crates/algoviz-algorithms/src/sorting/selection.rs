use algoviz_engine::{
    Algorithm, Cancelled, Driver, Outcome, Pace, Patch, RunInput, StatKind, Step, StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

use super::{announce, finish, mark_sorted, swap, WorkingArray};

/// Selection sort. Scans without a new minimum run at half pace.
#[derive(Debug, Default)]
pub struct SelectionSort;

impl Driver for SelectionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::SelectionSort
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
    let n = array.len();
    announce(&emitter, "Starting Selection Sort...").await?;

    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        emitter
            .emit(
                Step::new()
                    .patch(Patch::probe(i))
                    .patch(Patch::CodeLine(Some(1)))
                    .log(format!("Setting minimum index to {i}")),
            )
            .await?;

        for j in i + 1..n {
            let smaller = array.value(j) < array.value(min);
            let step = Step::new()
                .patch(Patch::compare(min, j))
                .patch(Patch::CodeLine(Some(2)))
                .stat(StatKind::Comparison);
            let step = if smaller {
                step.log(format!("Found new minimum: {} at index {j}", array.value(j)))
            } else {
                step.pace(Pace::Half)
            };
            emitter.emit(step).await?;
            if smaller {
                min = j;
            }
        }

        if min != i {
            let (a, b) = (array.value(i), array.value(min));
            swap(&emitter, &mut array, i, min, 3, format!("Swapped {a} with {b}")).await?;
        }
        mark_sorted(&emitter, vec![i]).await?;
    }

    finish(&emitter, "Array Sorted!").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::run;
    use algoviz_engine::{Element, ProblemInstance, Scenario};

    #[tokio::test]
    async fn sorts_with_at_most_n_minus_one_swaps() {
        let items = [9, 4, 7, 1, 8, 2]
            .iter()
            .enumerate()
            .map(|(i, v)| Element::new(i as u64, *v))
            .collect();
        let (outcome, state) =
            run(&mut SelectionSort, Scenario::new(ProblemInstance::Array(items))).await;
        assert_eq!(outcome, Outcome::Sorted);
        let values: Vec<i64> = state.instance.as_array().unwrap().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1, 2, 4, 7, 8, 9]);
        assert!(state.stats.swaps <= 5);
        assert_eq!(state.stats.comparisons, 15);
    }
}
