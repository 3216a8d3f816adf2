//! AST optimization pipeline (spec.md §4.5): a fixed-point pass manager
//! over a level-gated set of rewrite passes.
//!
//! Grounded in the grounding repo's `OptimizerPass` trait and its
//! sequential `optimize()` runner (`vec![Box::new(&ConstantInlining),
//! Box::new(&ConstantFolding)]`, both stubs there today), generalized into
//! a real fixed-point loop with a convergence cap, per-pass metrics, and
//! three levels of passes instead of two no-ops.

pub mod constant_folding;
pub mod dead_code;
pub mod desugar;
pub mod validator;

use crate::ast::Module;

/// Maximum number of whole-pipeline iterations before giving up on
/// reaching a fixed point (spec.md §4.5).
pub const MAX_ITERATIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Level {
    /// Debug mode: the optimizer is a no-op, used to inspect the parser's
    /// raw output.
    None = 0,
    Basic = 1,
    Default = 2,
    Aggressive = 3,
}

impl Level {
    pub fn from_name(name: &str) -> Option<Level> {
        Some(match name {
            "none" => Level::None,
            "basic" => Level::Basic,
            "default" => Level::Default,
            "aggressive" => Level::Aggressive,
            _ => return None,
        })
    }
}

/// Per-pass statistics collected across every iteration it ran in.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PassMetrics {
    pub nodes_processed: usize,
    pub nodes_optimized: usize,
    pub constants_folded: usize,
    pub dead_code_removed: usize,
    pub estimated_speedup: f64,
}

impl PassMetrics {
    fn merge(&mut self, other: PassMetrics) {
        self.nodes_processed += other.nodes_processed;
        self.nodes_optimized += other.nodes_optimized;
        self.constants_folded += other.constants_folded;
        self.dead_code_removed += other.dead_code_removed;
        self.recompute_speedup();
    }

    /// A rough speedup estimate: one optimized node is treated as a unit
    /// of avoided work relative to the total nodes the pass walked.
    fn recompute_speedup(&mut self) {
        self.estimated_speedup = if self.nodes_processed == 0 {
            1.0
        } else {
            1.0 + (self.nodes_optimized as f64 / self.nodes_processed as f64)
        };
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PassReport {
    pub pass_name: &'static str,
    pub iterations_run: usize,
    pub metrics: PassMetrics,
}

/// A single rewrite pass. `run` returns the rewritten module alongside
/// whether it changed anything, so the pass manager knows whether another
/// iteration is warranted.
pub trait OptimizerPass {
    fn name(&self) -> &'static str;
    fn level(&self) -> Level;
    fn run(&self, module: Module) -> (Module, PassMetrics);
}

fn all_passes() -> Vec<Box<dyn OptimizerPass>> {
    vec![
        Box::new(constant_folding::ConstantFolding),
        Box::new(dead_code::DeadCodeElimination),
        Box::new(desugar::Desugar),
    ]
}

/// Runs every pass gated at or below `level` repeatedly until none of
/// them change the module or [`MAX_ITERATIONS`] is reached, whichever
/// comes first.
pub fn optimize(mut module: Module, level: Level) -> (Module, Vec<PassReport>) {
    if level == Level::None {
        return (module, vec![]);
    }
    let passes = all_passes();
    let gated: Vec<&Box<dyn OptimizerPass>> = passes.iter().filter(|p| p.level() <= level).collect();
    let mut reports: Vec<PassReport> = gated
        .iter()
        .map(|p| PassReport { pass_name: p.name(), iterations_run: 0, metrics: PassMetrics::default() })
        .collect();

    for _ in 0..MAX_ITERATIONS {
        let mut any_changed = false;
        for (pass, report) in gated.iter().zip(reports.iter_mut()) {
            let (next_module, metrics) = pass.run(module);
            module = next_module;
            if metrics.nodes_optimized > 0 {
                any_changed = true;
            }
            report.iterations_run += 1;
            report.metrics.merge(metrics);
        }
        if !any_changed {
            break;
        }
    }

    (module, reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn none_level_is_a_no_op() {
        let outcome = parse("const x = 1 + 2;", "<t>");
        let (module, reports) = optimize(outcome.module.clone(), Level::None);
        assert_eq!(module, outcome.module);
        assert!(reports.is_empty());
    }

    #[test]
    fn optimizer_terminates_within_iteration_cap() {
        let outcome = parse("fn f() {\nlet x = 1 + 2 * 3;\nif true {\nreturn x;\n}\nreturn 0;\n}", "<t>");
        let (_module, reports) = optimize(outcome.module, Level::Aggressive);
        for report in reports {
            assert!(report.iterations_run <= MAX_ITERATIONS);
        }
    }
}
