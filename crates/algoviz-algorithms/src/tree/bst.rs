use algoviz_engine::{Cancelled, Color, Pace, StatKind, Step, StepEmitter};

use super::{publish, BinaryTree, Slot};

/// Unbalanced insert. Equal values descend right. Always inserts.
pub(crate) async fn insert(
    tree: &mut BinaryTree,
    value: i64,
    emitter: &StepEmitter,
) -> Result<Option<usize>, Cancelled> {
    let new = tree.alloc(value);
    let Some(mut current) = tree.root() else {
        tree.set_child(Slot::Root, Some(new));
        tree.set_color(new, Color::Found);
        publish(
            tree,
            emitter,
            Step::new()
                .log(format!("Inserted {value} as root"))
                .stat(StatKind::Operation),
        )
        .await?;
        return Ok(Some(new));
    };

    loop {
        let here = tree.node(current).value;
        tree.set_color(current, Color::Comparing);
        publish(
            tree,
            emitter,
            Step::new()
                .log(format!("Comparing {value} with {here}"))
                .stat(StatKind::Comparison),
        )
        .await?;
        tree.set_color(current, Color::Default);

        let (slot, side) = if value < here {
            (Slot::Left(current), "left")
        } else {
            (Slot::Right(current), "right")
        };
        match tree.child(slot) {
            Some(next) => {
                publish(tree, emitter, Step::new().pace(Pace::Half)).await?;
                current = next;
            }
            None => {
                tree.set_child(slot, Some(new));
                tree.set_color(new, Color::Found);
                publish(
                    tree,
                    emitter,
                    Step::new()
                        .log(format!("Inserted {value} as {side} child of {here}"))
                        .stat(StatKind::Operation),
                )
                .await?;
                return Ok(Some(new));
            }
        }
    }
}
