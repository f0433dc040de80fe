//! Iteration Driver: re-runs discovery across iterations, compressing the
//! positive (and negative) graph by the winning pattern between rounds, or
//! shrinking the example set in set-cover mode.

use tracing::info;

use crate::beam;
use crate::compress;
use crate::eval::EvalMethod;
use crate::graph::{ExampleKind, GraphStore};
use crate::instance::InstanceArena;
use crate::label::LabelRegistry;
use crate::params::DiscoveryParams;
use crate::pattern::Substructure;

/// One winning pattern per completed iteration, together with the pattern
/// rank it held within that iteration's best-N list.
pub struct IterationResult {
    pub iteration: usize,
    pub best: Vec<Substructure>,
}

/// Runs discovery for up to `params.iterations` rounds (0 means run until a
/// stop condition other than the iteration count fires), compressing after
/// each round.
pub fn run(
    mut pos_graph: GraphStore,
    mut neg_graph: Option<GraphStore>,
    registry: &mut LabelRegistry,
    params: &DiscoveryParams,
) -> Vec<IterationResult> {
    let mut results = Vec::new();
    let mut arena = InstanceArena::new();
    let mut iteration = 1usize;

    loop {
        if params.iterations != 0 && iteration > params.iterations {
            break;
        }
        if pos_graph.edge_count() == 0 && matches!(params.eval_method, EvalMethod::Mdl | EvalMethod::Size) {
            info!(iteration, "stopping: positive graph has no edges left");
            break;
        }
        if matches!(params.eval_method, EvalMethod::SetCover)
            && pos_graph.examples.iter().all(|b| b.kind != ExampleKind::Positive)
        {
            info!(iteration, "stopping: no positive examples remain");
            break;
        }

        let best = beam::discover(&pos_graph, neg_graph.as_ref(), registry, params, &mut arena);
        if best.is_empty() {
            info!(iteration, "stopping: no patterns found this iteration");
            break;
        }

        info!(iteration, n_found = best.len(), top_score = best[0].score, "iteration complete");

        match params.eval_method {
            EvalMethod::SetCover => {
                pos_graph = remove_covered_examples(&pos_graph, &best[0], &arena, ExampleKind::Positive);
                if let Some(neg) = &neg_graph {
                    neg_graph = Some(remove_covered_examples(neg, &best[0], &arena, ExampleKind::Negative));
                }
            }
            EvalMethod::Mdl | EvalMethod::Size => {
                pos_graph = compress::compress(
                    &pos_graph,
                    &best[0].positive_instances,
                    &arena,
                    registry,
                    iteration,
                    params.allow_overlap,
                );
                if let Some(neg) = &neg_graph {
                    neg_graph = Some(compress::compress(
                        neg,
                        &best[0].negative_instances,
                        &arena,
                        registry,
                        iteration,
                        params.allow_overlap,
                    ));
                }
            }
        }

        results.push(IterationResult { iteration, best });
        iteration += 1;
    }

    results
}

/// Removes every example whose vertex range is covered by one of `pattern`'s
/// instances (set-cover mode's between-iteration step), leaving the
/// remaining examples' vertices and incident edges untouched in the output
/// graph but no longer enumerated in `examples`.
fn remove_covered_examples(
    host: &GraphStore,
    pattern: &Substructure,
    arena: &InstanceArena,
    kind: ExampleKind,
) -> GraphStore {
    let instances = match kind {
        ExampleKind::Positive => &pattern.positive_instances,
        ExampleKind::Negative => &pattern.negative_instances,
    };
    let mut out = host.deep_copy();
    out.examples.retain(|b| {
        if b.kind != kind {
            return true;
        }
        !instances.iter().any(|&h| {
            let first = arena.get(h).vertices[0];
            first.0 >= b.start.0 && first.0 < b.end.0
        })
    });
    out
}
