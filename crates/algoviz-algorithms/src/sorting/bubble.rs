use algoviz_engine::{Algorithm, Cancelled, Driver, Outcome, RunInput, StepEmitter};
use futures::future::{BoxFuture, FutureExt};

use super::{announce, compare, finish, mark_sorted, swap, WorkingArray};

/// Bubble sort without the early exit: always n·(n-1)/2 comparisons.
#[derive(Debug, Default)]
pub struct BubbleSort;

impl Driver for BubbleSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BubbleSort
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
    announce(&emitter, "Starting Bubble Sort...").await?;

    for i in 0..n.saturating_sub(1) {
        for j in 0..n - i - 1 {
            let (a, b) = (array.value(j), array.value(j + 1));
            compare(&emitter, j, j + 1, 3, format!("Comparing value {a} and {b}")).await?;
            if a > b {
                swap(&emitter, &mut array, j, j + 1, 4, format!("Swapping {a} with {b}")).await?;
            }
        }
        mark_sorted(&emitter, vec![n - i - 1]).await?;
    }

    finish(&emitter, "Bubble Sort Completed.").await
}
