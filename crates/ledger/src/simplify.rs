//! Debt simplification.
//!
//! Two passes, both pure: they read a graph and return a new one, leaving the
//! canonical ledger untouched.
//!
//! 1. [`net_pairs`] folds opposite debts between the same pair into one net
//!    debt. Graphs built through [`DebtGraph::add_debt`] are already netted,
//!    so for them this pass is a plain copy; it only changes graphs whose
//!    rows were written directly.
//! 2. [`collapse_chains`] rewrites chains `A owes B, B owes C` into a direct
//!    `A owes C` until no chain is left (or the pass ceiling is hit).
//!
//! Chain collapse is a greedy heuristic. It never changes any participant's
//! net position and usually reduces the number of settlements, but it does not
//! search for the minimum number of transactions.

use serde::{Deserialize, Serialize};

use tally_core::Money;

use crate::graph::{DebtGraph, ParticipantIndex};

/// Default ceiling on full scans of the graph.
pub const DEFAULT_MAX_PASSES: usize = 1_000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifyOptions {
    /// Maximum number of full scans before giving up on reaching a fixpoint.
    pub max_passes: usize,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Outcome of a simplification run.
#[derive(Debug, Clone)]
pub struct Simplification {
    pub graph: DebtGraph,
    /// Full scans performed, including the final scan that found nothing.
    pub passes: usize,
    /// Number of individual chain rewrites.
    pub collapses: usize,
    /// `false` when the pass ceiling stopped the run before a fixpoint.
    pub converged: bool,
}

/// Net opposite debts pairwise, keeping one direction per pair.
pub fn net_pairs(graph: &DebtGraph) -> DebtGraph {
    let mut netted = graph.with_same_participants();
    for (from, to, amount) in graph.edges() {
        netted.add_debt(from, to, amount);
    }
    netted
}

/// Collapse transitive debt chains until a fixpoint (or `options.max_passes`).
///
/// Each rewrite moves `m = min(A→B, B→C)` onto `A→C`, which lowers the total
/// outstanding amount by at least one minor unit, so the loop terminates.
pub fn collapse_chains(graph: &DebtGraph, options: SimplifyOptions) -> Simplification {
    let mut simplified = net_pairs(graph);
    let mut passes = 0;
    let mut collapses = 0;
    let mut converged = false;

    while passes < options.max_passes {
        passes += 1;
        let rewritten = collapse_pass(&mut simplified);
        if rewritten == 0 {
            converged = true;
            break;
        }
        collapses += rewritten;
    }

    Simplification {
        graph: simplified,
        passes,
        collapses,
        converged,
    }
}

/// One scan over every `(A, B, C)` chain. Returns the number of rewrites.
fn collapse_pass(graph: &mut DebtGraph) -> usize {
    let mut rewritten = 0;
    let debtors: Vec<ParticipantIndex> = graph.indices().collect();

    for a in debtors {
        let middles: Vec<ParticipantIndex> = graph.row(a).map(|(b, _)| b).collect();
        for b in middles {
            let targets: Vec<ParticipantIndex> = graph.row(b).map(|(c, _)| c).collect();
            for c in targets {
                if c == a {
                    continue;
                }
                let ab = graph.amount(a, b);
                if !ab.is_positive() {
                    break;
                }
                let bc = graph.amount(b, c);
                if !bc.is_positive() {
                    continue;
                }

                let moved: Money = ab.min(bc);
                graph.reduce(a, b, moved);
                graph.reduce(b, c, moved);
                graph.add_debt(a, c, moved);
                rewritten += 1;
            }
        }
    }

    rewritten
}
