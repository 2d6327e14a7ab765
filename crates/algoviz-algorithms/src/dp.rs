//! Tabulated dynamic programming: Fibonacci and 0/1 knapsack.

use algoviz_engine::{
    Algorithm, Cancelled, DpProblem, DpTable, Driver, Outcome, Pace, Patch, RunInput, StatKind,
    Step, StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

fn focus(active: (usize, usize), dependencies: Vec<(usize, usize)>) -> Patch {
    Patch::FocusCells {
        active: Some(active),
        dependencies,
    }
}

fn clear_focus() -> Patch {
    Patch::FocusCells {
        active: None,
        dependencies: Vec::new(),
    }
}

async fn skip(emitter: &StepEmitter, log: &str) -> Result<Outcome, Cancelled> {
    emitter.emit(Step::new().log(log).pace(Pace::Instant)).await?;
    Ok(Outcome::Skipped)
}

/// Fills F(0)..F(n-1) left to right.
#[derive(Debug, Default)]
pub struct Fibonacci;

impl Driver for Fibonacci {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fibonacci
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let Some(DpProblem::Fibonacci { n }) = input.instance.as_table().map(|t| t.problem.clone())
            else {
                return skip(&emitter, "No Fibonacci table loaded.").await;
            };
            let mut values: Vec<i64> = Vec::with_capacity(n);

            emitter
                .emit(
                    Step::new()
                        .patch(Patch::describe(format!("Compute Fibonacci({n})")))
                        .log(format!("Starting Fibonacci Tabulation for N={n}"))
                        .pace(Pace::Half),
                )
                .await?;

            for (col, value) in [(0, 0), (1, 1)] {
                if col >= n {
                    break;
                }
                values.push(value);
                emitter
                    .emit(
                        Step::new()
                            .patch(focus((0, col), Vec::new()))
                            .patch(Patch::Cell { row: 0, col, value })
                            .log(format!("Base Case: F({col}) = {value}"))
                            .stat(StatKind::Operation)
                            .pace(Pace::Scaled(1.5)),
                    )
                    .await?;
            }

            for col in 2..n {
                emitter
                    .emit(
                        Step::new()
                            .patch(focus((0, col), vec![(0, col - 1), (0, col - 2)]))
                            .log(format!(
                                "Computing F({col}) = F({}) + F({}) ...",
                                col - 1,
                                col - 2
                            )),
                    )
                    .await?;

                let (a, b) = (values[col - 1], values[col - 2]);
                let value = a.saturating_add(b);
                values.push(value);
                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::Cell { row: 0, col, value })
                            .log(format!("F({col}) = {a} + {b} = {value}"))
                            .stat(StatKind::Operation),
                    )
                    .await?;
            }

            emitter
                .emit(
                    Step::new()
                        .patch(clear_focus())
                        .log("Fibonacci Sequence Complete.")
                        .pace(Pace::Instant),
                )
                .await?;
            Ok(Outcome::Table {
                value: values.last().copied(),
            })
        }
        .boxed()
    }
}

/// Row-by-row 0/1 knapsack over `(items + 1) x (capacity + 1)` cells.
#[derive(Debug, Default)]
pub struct Knapsack;

impl Driver for Knapsack {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Knapsack
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let Some(DpProblem::Knapsack { capacity, items }) =
                input.instance.as_table().map(|t| t.problem.clone())
            else {
                return skip(&emitter, "No knapsack table loaded.").await;
            };
            let mut grid = DpTable::knapsack(capacity, items.clone());

            emitter
                .emit(
                    Step::new()
                        .patch(Patch::describe(format!("0/1 Knapsack, capacity {capacity}")))
                        .log(format!("Starting 0/1 Knapsack for Capacity W={capacity}"))
                        .pace(Pace::Half),
                )
                .await?;

            for (i, item) in items.iter().enumerate().map(|(i, item)| (i + 1, item)) {
                emitter
                    .emit(
                        Step::new()
                            .log(format!(
                                "Item {i}: Weight={}, Value={}",
                                item.weight, item.value
                            ))
                            .pace(Pace::Half),
                    )
                    .await?;

                for w in 1..=capacity {
                    let exclude = grid.get(i - 1, w).unwrap_or(0);
                    let fits = item.weight <= w;
                    let mut dependencies = vec![(i - 1, w)];
                    if fits {
                        dependencies.push((i - 1, w - item.weight));
                    }
                    emitter
                        .emit(Step::new().patch(focus((i, w), dependencies)).pace(Pace::Half))
                        .await?;

                    let (value, log) = if fits {
                        let base = grid.get(i - 1, w - item.weight).unwrap_or(0);
                        let include = item.value + base;
                        (
                            exclude.max(include),
                            format!(
                                "  Cap {w}: Excl({exclude}) vs Incl({} + {base} = {include})",
                                item.value
                            ),
                        )
                    } else {
                        (
                            exclude,
                            format!("  Cap {w}: Item too heavy ({} > {w}). Skipping.", item.weight),
                        )
                    };
                    grid.cells[i][w] = Some(value);
                    emitter
                        .emit(
                            Step::new()
                                .patch(Patch::Cell { row: i, col: w, value })
                                .log(log)
                                .stat(if fits {
                                    StatKind::Comparison
                                } else {
                                    StatKind::Operation
                                }),
                        )
                        .await?;
                }
            }

            let best = grid.get(items.len(), capacity);
            emitter
                .emit(
                    Step::new()
                        .patch(clear_focus())
                        .log(format!("Knapsack Complete. Max Value: {}", best.unwrap_or(0)))
                        .pace(Pace::Instant),
                )
                .await?;
            Ok(Outcome::Table { value: best })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{log_lines, run};
    use algoviz_engine::{Item, ProblemInstance, Scenario};

    fn row(state: &algoviz_engine::VisualState, r: usize) -> Vec<Option<i64>> {
        state.instance.as_table().unwrap().cells[r].clone()
    }

    #[tokio::test]
    async fn fibonacci_eight() {
        let scenario = Scenario::new(ProblemInstance::Table(DpTable::fibonacci(8)));
        let (outcome, state) = run(&mut Fibonacci, scenario).await;
        assert_eq!(outcome, Outcome::Table { value: Some(13) });
        let expected: Vec<Option<i64>> = [0, 1, 1, 2, 3, 5, 8, 13].into_iter().map(Some).collect();
        assert_eq!(row(&state, 0), expected);
        assert_eq!(state.markers.active_cell, None);
        assert!(log_lines(&state).contains(&"F(7) = 8 + 5 = 13".to_string()));
    }

    #[tokio::test]
    async fn fibonacci_single_cell() {
        let scenario = Scenario::new(ProblemInstance::Table(DpTable::fibonacci(1)));
        let (outcome, state) = run(&mut Fibonacci, scenario).await;
        assert_eq!(outcome, Outcome::Table { value: Some(0) });
        assert_eq!(row(&state, 0), vec![Some(0)]);
    }

    #[tokio::test]
    async fn knapsack_follows_the_recurrence() {
        let items = vec![
            Item { weight: 2, value: 3 },
            Item { weight: 3, value: 4 },
            Item { weight: 4, value: 5 },
        ];
        let scenario = Scenario::new(ProblemInstance::Table(DpTable::knapsack(6, items)));
        let (outcome, state) = run(&mut Knapsack, scenario).await;
        let table = state.instance.as_table().unwrap();
        assert_eq!(table.get(1, 6), Some(3));
        assert_eq!(table.get(2, 6), Some(7));
        assert_eq!(table.get(3, 6), Some(8));
        assert_eq!(outcome, Outcome::Table { value: Some(8) });
        assert!(table.cells.iter().flatten().all(Option::is_some));
    }

    #[tokio::test]
    async fn wrong_instance_is_skipped() {
        let (outcome, _) = run(&mut Knapsack, Scenario::new(ProblemInstance::Empty)).await;
        assert_eq!(outcome, Outcome::Skipped);
    }
}
