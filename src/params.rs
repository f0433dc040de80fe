//! Discovery parameters, carried as an immutable configuration record.

use crate::eval::EvalMethod;

#[derive(Debug, Clone)]
pub struct DiscoveryParams {
    /// `-beam`: beam width, must be > 0.
    pub beam_width: usize,
    /// `-nsubs`: size of the best-N list, must be > 0.
    pub num_best_subs: usize,
    /// `-limit`: max candidate expansions per iteration. `None` means the
    /// default of `|E_pos| / 2`, resolved once the positive graph is known.
    pub limit: Option<usize>,
    /// `-iterations`: 0 means run until another stop condition fires.
    pub iterations: usize,
    /// `-eval`.
    pub eval_method: EvalMethod,
    /// `-threshold`: inexact tolerance in `[0, 1]`.
    pub threshold: f64,
    pub min_vertices: usize,
    pub max_vertices: usize,
    /// `-overlap`.
    pub allow_overlap: bool,
    /// `-prune`: drop extensions that score strictly below their parent.
    pub prune: bool,
    /// `-valuebased`: keep all candidates scoring >= the W-th best, instead
    /// of a strict top-W cut.
    pub value_based: bool,
    /// `-undirected`: treat every input edge as undirected regardless of
    /// the file's `e`/`d` token.
    pub undirected: bool,
    /// `-recursion`: allow the engine to flag extensions as recursive
    /// substructures.
    pub recursion: bool,
}

impl Default for DiscoveryParams {
    fn default() -> Self {
        DiscoveryParams {
            beam_width: 4,
            num_best_subs: 3,
            limit: None,
            iterations: 1,
            eval_method: EvalMethod::Mdl,
            threshold: 0.0,
            min_vertices: 1,
            max_vertices: usize::MAX,
            allow_overlap: false,
            prune: false,
            value_based: false,
            undirected: false,
            recursion: false,
        }
    }
}

impl DiscoveryParams {
    /// Resolves `-limit`'s default of `|E_pos| / 2` against an actual graph.
    pub fn resolved_limit(&self, pos_edge_count: usize) -> usize {
        self.limit.unwrap_or_else(|| (pos_edge_count / 2).max(1))
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.beam_width == 0 {
            return Err(crate::error::SubdueError::Parameter {
                message: "-beam must be > 0".into(),
            });
        }
        if self.num_best_subs == 0 {
            return Err(crate::error::SubdueError::Parameter {
                message: "-nsubs must be > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(crate::error::SubdueError::Parameter {
                message: "-threshold must be in [0, 1]".into(),
            });
        }
        if self.min_vertices > self.max_vertices {
            return Err(crate::error::SubdueError::Parameter {
                message: "-minsize must be <= -maxsize".into(),
            });
        }
        Ok(())
    }
}
