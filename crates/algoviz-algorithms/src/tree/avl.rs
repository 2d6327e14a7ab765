use std::cmp::Ordering;

use algoviz_engine::{Cancelled, Color, Pace, StatKind, Step, StepEmitter};
use futures::future::{BoxFuture, FutureExt};

use super::{publish, BinaryTree, Slot};

/// Insert and rebalance on the way back up. Returns `None` for a
/// duplicate, which leaves the tree untouched.
pub(crate) async fn insert(
    tree: &mut BinaryTree,
    value: i64,
    emitter: &StepEmitter,
) -> Result<Option<usize>, Cancelled> {
    let new = tree.alloc(value);
    if insert_at(tree, Slot::Root, value, new, emitter).await? {
        tree.set_color(new, Color::Found);
        return Ok(Some(new));
    }
    tree.discard(new);
    publish(
        tree,
        emitter,
        Step::new().log(format!("{value} is already in the tree.")),
    )
    .await?;
    Ok(None)
}

fn insert_at<'a>(
    tree: &'a mut BinaryTree,
    slot: Slot,
    value: i64,
    new: usize,
    emitter: &'a StepEmitter,
) -> BoxFuture<'a, Result<bool, Cancelled>> {
    async move {
        let Some(node) = tree.child(slot) else {
            tree.set_child(slot, Some(new));
            tree.update_height(new);
            publish(
                tree,
                emitter,
                Step::new()
                    .log(format!("Inserted {value}"))
                    .stat(StatKind::Operation),
            )
            .await?;
            return Ok(true);
        };

        let here = tree.node(node).value;
        tree.set_color(node, Color::Comparing);
        publish(
            tree,
            emitter,
            Step::new().stat(StatKind::Comparison).pace(Pace::Half),
        )
        .await?;
        tree.set_color(node, Color::Default);

        let inserted = match value.cmp(&here) {
            Ordering::Less => insert_at(tree, Slot::Left(node), value, new, emitter).await?,
            Ordering::Greater => insert_at(tree, Slot::Right(node), value, new, emitter).await?,
            Ordering::Equal => false,
        };
        if !inserted {
            return Ok(false);
        }

        tree.update_height(node);
        let balance = tree.balance(node);
        if balance > 1 {
            // Left-Right: the new value went into the left child's right subtree.
            if let Some(left) = tree.node(node).left {
                if value > tree.node(left).value {
                    rotate_left(tree, Slot::Left(node), emitter).await?;
                }
            }
            rotate_right(tree, slot, emitter).await?;
        } else if balance < -1 {
            if let Some(right) = tree.node(node).right {
                if value < tree.node(right).value {
                    rotate_right(tree, Slot::Right(node), emitter).await?;
                }
            }
            rotate_left(tree, slot, emitter).await?;
        }
        Ok(true)
    }
    .boxed()
}

async fn rotate_right(
    tree: &mut BinaryTree,
    slot: Slot,
    emitter: &StepEmitter,
) -> Result<(), Cancelled> {
    let Some(y) = tree.child(slot) else {
        return Ok(());
    };
    let Some(x) = tree.node(y).left else {
        return Ok(());
    };
    let pivot = tree.node(y).value;
    let inner = tree.node(x).right;
    tree.node_mut(x).right = Some(y);
    tree.node_mut(y).left = inner;
    tree.set_child(slot, Some(x));
    tree.update_height(y);
    tree.update_height(x);
    publish(
        tree,
        emitter,
        Step::new()
            .log(format!("Performing Right Rotation on {pivot}"))
            .stat(StatKind::Operation),
    )
    .await
}

async fn rotate_left(
    tree: &mut BinaryTree,
    slot: Slot,
    emitter: &StepEmitter,
) -> Result<(), Cancelled> {
    let Some(x) = tree.child(slot) else {
        return Ok(());
    };
    let Some(y) = tree.node(x).right else {
        return Ok(());
    };
    let pivot = tree.node(x).value;
    let inner = tree.node(y).left;
    tree.node_mut(y).left = Some(x);
    tree.node_mut(x).right = inner;
    tree.set_child(slot, Some(y));
    tree.update_height(x);
    tree.update_height(y);
    publish(
        tree,
        emitter,
        Step::new()
            .log(format!("Performing Left Rotation on {pivot}"))
            .stat(StatKind::Operation),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Controls, TreeAction};
    use crate::testing::{log_lines, run};
    use crate::tree::{build, Balancing, TreeDriver};
    use algoviz_engine::{Outcome, ProblemInstance, Scenario};

    fn tree(values: &[i64]) -> BinaryTree {
        BinaryTree::from_graph(&build(Balancing::Avl, values), true)
    }

    #[test]
    fn all_four_cases_rebalance() {
        for values in [[30, 20, 10], [10, 20, 30], [30, 10, 20], [10, 30, 20]] {
            let tree = tree(&values);
            let root = tree.root().unwrap();
            assert_eq!(tree.node(root).value, 20, "{values:?}");
            assert_eq!(tree.node(root).height, 2);
            assert!(tree.is_balanced());
        }
    }

    #[test]
    fn ascending_run_stays_balanced() {
        let values: Vec<i64> = (1..=31).collect();
        let tree = tree(&values);
        assert!(tree.is_balanced());
        assert_eq!(tree.node(tree.root().unwrap()).height, 5);
        assert_eq!(tree.in_order(), values);
    }

    #[test]
    fn duplicate_is_rejected() {
        let tree = tree(&[10, 20, 10]);
        assert_eq!(tree.len(), 2);
    }

    #[tokio::test]
    async fn rotation_is_logged_and_projected() {
        let controls = Controls::new();
        controls.queue_tree_action(TreeAction::Insert(30));
        let mut driver = TreeDriver::new(Balancing::Avl, controls, 1);
        let graph = build(Balancing::Avl, &[10, 20]);
        let (outcome, state) =
            run(&mut driver, Scenario::new(ProblemInstance::Graph(graph))).await;
        assert!(matches!(outcome, Outcome::Inserted { .. }));
        assert!(log_lines(&state).contains(&"Performing Left Rotation on 10".to_string()));

        let graph = state.instance.as_graph().unwrap();
        let root = graph.node(graph.root.unwrap()).unwrap();
        assert_eq!(root.value, 20);
        assert_eq!(root.height, Some(2));
        assert_eq!(root.position, algoviz_engine::Position::ORIGIN);
    }

    #[tokio::test]
    async fn duplicate_insert_is_skipped() {
        let controls = Controls::new();
        controls.queue_tree_action(TreeAction::Insert(20));
        let mut driver = TreeDriver::new(Balancing::Avl, controls, 1);
        let graph = build(Balancing::Avl, &[10, 20]);
        let (outcome, state) =
            run(&mut driver, Scenario::new(ProblemInstance::Graph(graph))).await;
        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(state.instance.as_graph().unwrap().nodes.len(), 2);
    }
}
