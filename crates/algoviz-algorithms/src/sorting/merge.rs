use algoviz_engine::{
    Algorithm, Cancelled, Driver, Element, Outcome, Pace, Patch, RunInput, StatKind, Step,
    StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

use super::{announce, finish, swap, WorkingArray};

/// Top-down merge sort that moves elements by identity.
///
/// The merge step snapshots both halves, then for each output slot finds
/// where the chosen element currently sits and swaps it into place. The
/// element it displaces stays inside the unmerged tail, so no value is ever
/// overwritten.
#[derive(Debug, Default)]
pub struct MergeSort;

impl Driver for MergeSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::MergeSort
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
    announce(&emitter, "Starting Merge Sort...").await?;
    if array.len() > 1 {
        let last = array.len() - 1;
        merge_sort(&mut array, 0, last, &emitter).await?;
    }
    finish(&emitter, "Merge Sort Completed.").await
}

fn merge_sort<'a>(
    array: &'a mut WorkingArray,
    left: usize,
    right: usize,
    emitter: &'a StepEmitter,
) -> BoxFuture<'a, Result<(), Cancelled>> {
    async move {
        if left >= right {
            return Ok(());
        }
        let mid = left + (right - left) / 2;
        emitter
            .emit(Step::new().patch(Patch::CodeLine(Some(1))).pace(Pace::Half))
            .await?;
        merge_sort(array, left, mid, emitter).await?;
        merge_sort(array, mid + 1, right, emitter).await?;
        merge(array, left, mid, right, emitter).await
    }
    .boxed()
}

async fn merge(
    array: &mut WorkingArray,
    left: usize,
    mid: usize,
    right: usize,
    emitter: &StepEmitter,
) -> Result<(), Cancelled> {
    let lhs: Vec<Element> = array.items()[left..=mid].to_vec();
    let rhs: Vec<Element> = array.items()[mid + 1..=right].to_vec();
    let (mut i, mut j, mut k) = (0, 0, left);

    while i < lhs.len() && j < rhs.len() {
        let (a, b) = (lhs[i], rhs[j]);
        let at_a = array.position(a.id).unwrap_or(k);
        let at_b = array.position(b.id).unwrap_or(k);
        emitter
            .emit(
                Step::new()
                    .patch(Patch::compare(at_a, at_b))
                    .patch(Patch::CodeLine(Some(3)))
                    .log(format!("Comparing {} and {}", a.value, b.value))
                    .stat(StatKind::Comparison),
            )
            .await?;

        // `<=` takes from the left half on ties, which keeps the sort stable.
        let chosen = if a.value <= b.value {
            i += 1;
            a
        } else {
            j += 1;
            b
        };
        place(array, chosen, k, emitter).await?;
        k += 1;
    }

    for chosen in lhs[i..].iter().chain(rhs[j..].iter()) {
        place(array, *chosen, k, emitter).await?;
        k += 1;
    }
    Ok(())
}

async fn place(
    array: &mut WorkingArray,
    element: Element,
    k: usize,
    emitter: &StepEmitter,
) -> Result<(), Cancelled> {
    match array.position(element.id) {
        Some(current) if current != k => {
            swap(
                emitter,
                array,
                k,
                current,
                4,
                format!("Moving {} to index {k}", element.value),
            )
            .await
        }
        _ => Ok(()),
    }
}
