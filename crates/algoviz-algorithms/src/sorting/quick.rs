use algoviz_engine::{
    Algorithm, Cancelled, Driver, Outcome, Patch, RunInput, Step, StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

use super::{compare, finish, mark_sorted, swap, WorkingArray};

/// Quick sort with Lomuto partitioning around the last element.
#[derive(Debug, Default)]
pub struct QuickSort;

impl Driver for QuickSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::QuickSort
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
    // Inclusive ranges, left partitions first.
    let mut pending = Vec::new();
    if array.len() > 1 {
        pending.push((0, array.len() - 1));
    }

    while let Some((low, high)) = pending.pop() {
        let pivot = partition(&mut array, low, high, &emitter).await?;
        if pivot + 1 < high {
            pending.push((pivot + 1, high));
        }
        if pivot > low + 1 {
            pending.push((low, pivot - 1));
        }
    }

    finish(&emitter, "Quick Sort Completed.").await
}

/// Elements strictly smaller than the pivot go left, equal ones stay right.
async fn partition(
    array: &mut WorkingArray,
    low: usize,
    high: usize,
    emitter: &StepEmitter,
) -> Result<usize, Cancelled> {
    let pivot = array.value(high);
    emitter
        .emit(
            Step::new()
                .patch(Patch::probe(high))
                .patch(Patch::CodeLine(Some(1)))
                .log(format!(
                    "Partitioning: Pivot selected at index {high} (Value: {pivot})"
                )),
        )
        .await?;

    let mut store_at = low;
    for j in low..high {
        let value = array.value(j);
        compare(emitter, j, high, 3, format!("Comparing value {value} with pivot {pivot}")).await?;
        if value < pivot {
            if store_at != j {
                let other = array.value(store_at);
                swap(emitter, array, store_at, j, 4, format!("Swapping {other} and {value}")).await?;
            }
            store_at += 1;
        }
    }

    if store_at != high {
        swap(
            emitter,
            array,
            store_at,
            high,
            6,
            format!("Placing pivot {pivot} at correct index {store_at}"),
        )
        .await?;
    }
    mark_sorted(emitter, vec![store_at]).await?;
    Ok(store_at)
}
