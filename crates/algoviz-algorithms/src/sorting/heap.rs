use algoviz_engine::{Algorithm, Cancelled, Driver, Outcome, RunInput, StepEmitter};
use futures::future::{BoxFuture, FutureExt};

use super::{announce, compare, finish, mark_sorted, swap, WorkingArray};

/// Heap sort over an implicit max-heap.
#[derive(Debug, Default)]
pub struct HeapSort;

impl Driver for HeapSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::HeapSort
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
    announce(&emitter, "Starting Heap Sort...").await?;
    announce(&emitter, "Building Max Heap...").await?;
    for i in (0..n / 2).rev() {
        sift_down(&mut array, n, i, &emitter).await?;
    }
    announce(&emitter, "Max Heap built. Extracting elements...").await?;

    for end in (1..n).rev() {
        let max = array.value(0);
        swap(
            &emitter,
            &mut array,
            0,
            end,
            5,
            format!("Extracted max {max}, moved to index {end}"),
        )
        .await?;
        mark_sorted(&emitter, vec![end]).await?;
        sift_down(&mut array, end, 0, &emitter).await?;
    }

    finish(&emitter, "Array Sorted!").await
}

async fn sift_down(
    array: &mut WorkingArray,
    size: usize,
    mut root: usize,
    emitter: &StepEmitter,
) -> Result<(), Cancelled> {
    loop {
        let mut largest = root;
        for child in [2 * root + 1, 2 * root + 2] {
            if child < size {
                compare(
                    emitter,
                    child,
                    largest,
                    2,
                    format!("Comparing {} with {}", array.value(child), array.value(largest)),
                )
                .await?;
                if array.value(child) > array.value(largest) {
                    largest = child;
                }
            }
        }
        if largest == root {
            return Ok(());
        }
        swap(
            emitter,
            array,
            root,
            largest,
            3,
            format!("Heapify: Swapping index {root} with {largest}"),
        )
        .await?;
        root = largest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::run;
    use algoviz_engine::{Element, ProblemInstance, Scenario};

    #[tokio::test]
    async fn sorts_and_marks_everything() {
        let items = [12, 3, 17, 8, 8, 4, 15, 6]
            .iter()
            .enumerate()
            .map(|(i, v)| Element::new(i as u64, *v))
            .collect();
        let (outcome, state) = run(&mut HeapSort, Scenario::new(ProblemInstance::Array(items))).await;
        assert_eq!(outcome, Outcome::Sorted);
        let values: Vec<i64> = state.instance.as_array().unwrap().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![3, 4, 6, 8, 8, 12, 15, 17]);
        assert_eq!(state.markers.sorted.len(), 8);
    }

    #[tokio::test]
    async fn two_elements() {
        let items = vec![Element::new(0, 2), Element::new(1, 1)];
        let (_, state) = run(&mut HeapSort, Scenario::new(ProblemInstance::Array(items))).await;
        let values: Vec<i64> = state.instance.as_array().unwrap().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1, 2]);
    }
}
