//! Comparison sorts over the array instance.
//!
//! Every sort owns one [`WorkingArray`] for the duration of its run and
//! moves elements only through identity swaps, so the store's array and
//! the driver's buffer stay in lock step and the front-end can animate
//! each element along its path.

mod bubble;
mod heap;
mod insertion;
mod merge;
mod quick;
mod selection;

pub use bubble::BubbleSort;
pub use heap::HeapSort;
pub use insertion::InsertionSort;
pub use merge::MergeSort;
pub use quick::QuickSort;
pub use selection::SelectionSort;

use algoviz_engine::{
    Cancelled, Element, ElementId, Outcome, Pace, Patch, ProblemInstance, StatKind, Step,
    StepEmitter,
};

/// A driver's private copy of the array.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct WorkingArray {
    items: Vec<Element>,
}

impl WorkingArray {
    pub fn new(items: Vec<Element>) -> Self {
        Self { items }
    }

    /// Copy of the array variant. Any other shape yields an empty buffer.
    pub fn from_instance(instance: &ProblemInstance) -> Self {
        Self::new(instance.as_array().map(<[Element]>::to_vec).unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn value(&self, index: usize) -> i64 {
        self.items[index].value
    }

    pub fn items(&self) -> &[Element] {
        &self.items
    }

    /// Current slot of the element with identity `id`.
    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.items.iter().position(|e| e.id == id)
    }

    pub fn is_sorted(&self) -> bool {
        self.items.windows(2).all(|w| w[0].value <= w[1].value)
    }

    /// Swap two slots and return the patch that mirrors it in the store.
    pub fn swap(&mut self, i: usize, j: usize) -> Patch {
        let patch = Patch::SwapElements {
            a: self.items[i].id,
            b: self.items[j].id,
        };
        self.items.swap(i, j);
        patch
    }

    /// Stable sort by value. Returns the patch carrying the new order.
    pub fn sort_stable(&mut self) -> Patch {
        self.items.sort_by_key(|e| e.value);
        Patch::Reorder {
            order: self.items.iter().map(|e| e.id).collect(),
        }
    }
}

/// Highlight two slots as compared and count a comparison.
pub(crate) async fn compare(
    emitter: &StepEmitter,
    i: usize,
    j: usize,
    line: u32,
    log: String,
) -> Result<(), Cancelled> {
    emitter
        .emit(
            Step::new()
                .patch(Patch::compare(i, j))
                .patch(Patch::CodeLine(Some(line)))
                .log(log)
                .stat(StatKind::Comparison),
        )
        .await
}

/// Swap two slots in the buffer and the store in one step.
pub(crate) async fn swap(
    emitter: &StepEmitter,
    array: &mut WorkingArray,
    i: usize,
    j: usize,
    line: u32,
    log: String,
) -> Result<(), Cancelled> {
    let moved = array.swap(i, j);
    emitter
        .emit(
            Step::new()
                .patch(Patch::swapping(i, j))
                .patch(moved)
                .patch(Patch::CodeLine(Some(line)))
                .log(log)
                .stat(StatKind::Swap),
        )
        .await
}

pub(crate) async fn mark_sorted(emitter: &StepEmitter, indices: Vec<usize>) -> Result<(), Cancelled> {
    emitter
        .emit(
            Step::new()
                .patch(Patch::ClearHighlights)
                .patch(Patch::MarkSorted { indices })
                .pace(Pace::Instant),
        )
        .await
}

pub(crate) async fn announce(emitter: &StepEmitter, log: &str) -> Result<(), Cancelled> {
    emitter.emit(Step::new().log(log).pace(Pace::Instant)).await
}

/// Final step shared by every sort: everything is in place.
pub(crate) async fn finish(emitter: &StepEmitter, log: &str) -> Result<Outcome, Cancelled> {
    emitter
        .emit(
            Step::new()
                .patch(Patch::ClearHighlights)
                .patch(Patch::MarkAllSorted)
                .patch(Patch::CodeLine(None))
                .log(log)
                .pace(Pace::Instant),
        )
        .await?;
    Ok(Outcome::Sorted)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn array(values: &[i64]) -> WorkingArray {
        WorkingArray::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Element::new(i as u64, *v))
                .collect(),
        )
    }

    #[test]
    fn swap_returns_identity_patch() {
        let mut arr = array(&[4, 7]);
        let patch = arr.swap(0, 1);
        assert_eq!(
            patch,
            Patch::SwapElements {
                a: ElementId(0),
                b: ElementId(1)
            }
        );
        assert_eq!(arr.value(0), 7);
        assert_eq!(arr.position(ElementId(0)), Some(1));
    }

    #[test]
    fn stable_sort_keeps_equal_order() {
        let mut arr = array(&[3, 1, 3, 1]);
        let patch = arr.sort_stable();
        let ids: Vec<u64> = arr.items().iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 3, 0, 2]);
        assert!(matches!(patch, Patch::Reorder { ref order } if order.len() == 4));
        assert!(arr.is_sorted());
    }

    #[test]
    fn non_array_instance_is_empty() {
        assert!(WorkingArray::from_instance(&ProblemInstance::Empty).is_empty());
    }
}
