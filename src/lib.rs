//! A structural pattern-discovery engine: finds repeating, compressible
//! subgraph patterns ("substructures") in labeled, possibly-directed
//! multigraphs.
//!
//! The library exposes two pure entry points: [`discover`] runs the full
//! iterated beam search, and [`score_on`] evaluates one pattern against a
//! host graph without searching for it.

pub mod beam;
pub mod compress;
pub mod error;
pub mod eval;
pub mod format;
pub mod graph;
pub mod inexact;
pub mod instance;
pub mod iteration;
pub mod label;
pub mod matcher;
pub mod params;
pub mod pattern;

#[cfg(feature = "dot")]
pub mod dot;

pub use error::{Result, SubdueError};
pub use graph::GraphStore;
pub use iteration::IterationResult;
pub use label::LabelRegistry;
pub use params::DiscoveryParams;
pub use pattern::Substructure;

/// Runs iterated discovery on `pos_graph` (and, for set-cover, `neg_graph`),
/// returning one [`IterationResult`] per completed round.
pub fn discover(
    pos_graph: GraphStore,
    neg_graph: Option<GraphStore>,
    registry: &mut LabelRegistry,
    params: &DiscoveryParams,
) -> Vec<IterationResult> {
    iteration::run(pos_graph, neg_graph, registry, params)
}

/// Scores one pattern against a host graph pair without performing any
/// search: runs the Subgraph Matcher to populate instance lists, then the
/// Evaluator.
pub fn score_on(
    pattern_definition: &GraphStore,
    pos_graph: &GraphStore,
    neg_graph: Option<&GraphStore>,
    registry: &LabelRegistry,
    params: &DiscoveryParams,
) -> (f64, usize, usize) {
    let mut arena = instance::InstanceArena::new();
    let match_options = matcher::MatchOptions {
        allow_overlap: params.allow_overlap,
        threshold: params.threshold,
    };
    let mut pattern = Substructure::new(pattern_definition.clone());
    pattern.positive_instances =
        matcher::find_instances(pattern_definition, pos_graph, registry, match_options, &mut arena);
    if let Some(neg) = neg_graph {
        pattern.negative_instances =
            matcher::find_instances(pattern_definition, neg, registry, match_options, &mut arena);
    }

    let dl_cache = eval::DlCache::new();
    let ctx = eval::EvalContext {
        registry,
        arena: &arena,
        dl_cache: &dl_cache,
        pos_graph,
        neg_graph,
        allow_overlap: params.allow_overlap,
        iteration: 1,
    };
    let score = eval::score(&mut pattern, params.eval_method, &ctx);
    (score, pattern.positive_instances.len(), pattern.negative_instances.len())
}
