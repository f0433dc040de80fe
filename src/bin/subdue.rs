//! Discovery driver CLI: parses a graph file, runs iterated discovery, and
//! prints (or writes) the resulting substructures.

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use subdue::{format, params::DiscoveryParams, eval::EvalMethod, label::LabelRegistry};
use tracing_subscriber::EnvFilter;

/// Discovers repeating, compressible subgraph patterns in a labeled graph.
#[derive(Parser, Debug)]
#[command(name = "subdue")]
struct Cli {
    /// Positive (or only) input graph file.
    graph: String,

    /// Negative example graph file, for supervised set-cover discovery.
    #[arg(long = "negative")]
    negative: Option<String>,

    #[arg(long = "beam", default_value_t = 4)]
    beam: usize,

    #[arg(long = "nsubs", default_value_t = 3)]
    nsubs: usize,

    #[arg(long = "limit")]
    limit: Option<usize>,

    #[arg(long = "iterations", default_value_t = 1)]
    iterations: usize,

    #[arg(long = "eval", default_value_t = 1)]
    eval: u8,

    #[arg(long = "threshold", default_value_t = 0.0)]
    threshold: f64,

    #[arg(long = "minsize", default_value_t = 1)]
    minsize: usize,

    #[arg(long = "maxsize")]
    maxsize: Option<usize>,

    #[arg(long = "overlap", default_value_t = false)]
    overlap: bool,

    #[arg(long = "prune", default_value_t = false)]
    prune: bool,

    #[arg(long = "valuebased", default_value_t = false)]
    valuebased: bool,

    #[arg(long = "undirected", default_value_t = false)]
    undirected: bool,

    #[arg(long = "recursion", default_value_t = false)]
    recursion: bool,

    /// Predefined-patterns file, compressed out before discovery begins.
    #[arg(long = "ps")]
    ps: Option<String>,

    /// Machine-readable substructure output file.
    #[arg(long = "out")]
    out: Option<String>,

    /// Verbosity level 1-5; forwarded to the tracing filter.
    #[arg(long = "output", default_value_t = 1)]
    output: u8,

    /// Also write the final iteration's compressed graph to this path.
    #[arg(long = "write-compressed")]
    write_compressed: Option<String>,
}

fn eval_method_from_flag(n: u8) -> Result<EvalMethod, String> {
    match n {
        1 => Ok(EvalMethod::Mdl),
        2 => Ok(EvalMethod::Size),
        3 => Ok(EvalMethod::SetCover),
        other => Err(format!("-eval must be 1, 2, or 3 (got {other})")),
    }
}

fn run(cli: Cli) -> subdue::Result<()> {
    let mut registry = LabelRegistry::new();

    let graph_text = fs::read_to_string(&cli.graph).map_err(|e| subdue::SubdueError::Parameter {
        message: format!("cannot read {}: {e}", cli.graph),
    })?;
    let mut pos_graph = format::parse_graph(&graph_text, &cli.graph, !cli.undirected, &mut registry)?;

    let neg_graph = match &cli.negative {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| subdue::SubdueError::Parameter {
                message: format!("cannot read {path}: {e}"),
            })?;
            Some(format::parse_graph(&text, path, !cli.undirected, &mut registry)?)
        }
        None => None,
    };

    if let Some(ps_path) = &cli.ps {
        let text = fs::read_to_string(ps_path).map_err(|e| subdue::SubdueError::Parameter {
            message: format!("cannot read {ps_path}: {e}"),
        })?;
        let predefined = format::parse_predefined_patterns(&text, ps_path, &mut registry)?;
        let mut arena = subdue::instance::InstanceArena::new();
        for (i, pattern) in predefined.iter().enumerate() {
            let options = subdue::matcher::MatchOptions {
                allow_overlap: cli.overlap,
                threshold: cli.threshold,
            };
            let instances = subdue::matcher::find_instances(pattern, &pos_graph, &registry, options, &mut arena);
            pos_graph = subdue::compress::compress(&pos_graph, &instances, &arena, &mut registry, 1000 + i, cli.overlap);
        }
    }

    let eval_method = eval_method_from_flag(cli.eval).map_err(|message| subdue::SubdueError::Parameter { message })?;

    let params = DiscoveryParams {
        beam_width: cli.beam,
        num_best_subs: cli.nsubs,
        limit: cli.limit,
        iterations: cli.iterations,
        eval_method,
        threshold: cli.threshold,
        min_vertices: cli.minsize,
        max_vertices: cli.maxsize.unwrap_or(usize::MAX),
        allow_overlap: cli.overlap,
        prune: cli.prune,
        value_based: cli.valuebased,
        undirected: cli.undirected,
        recursion: cli.recursion,
    };
    params.validate()?;

    let pos_graph_for_write = cli.write_compressed.as_ref().map(|_| pos_graph.clone());

    let results = subdue::discover(pos_graph, neg_graph, &mut registry, &params);

    if let (Some(path), Some(host)) = (&cli.write_compressed, &pos_graph_for_write) {
        if let Some(last) = results.last() {
            if let Some(top) = last.best.first() {
                let options = subdue::matcher::MatchOptions {
                    allow_overlap: cli.overlap,
                    threshold: cli.threshold,
                };
                let mut arena = subdue::instance::InstanceArena::new();
                let instances =
                    subdue::matcher::find_instances(&top.definition, host, &registry, options, &mut arena);
                subdue::compress::write_compressed_graph_to_file(
                    host,
                    &instances,
                    &arena,
                    &mut registry,
                    last.iteration,
                    cli.overlap,
                    path,
                )
                .map_err(|e| subdue::SubdueError::Parameter {
                    message: format!("cannot write {path}: {e}"),
                })?;
            }
        }
    }

    let all_best: Vec<_> = results.into_iter().flat_map(|r| r.best).collect();

    let rendered = format::write_substructures(&all_best, &registry);
    if cli.output >= 1 {
        print!("{rendered}");
    }
    if let Some(out_path) = &cli.out {
        fs::write(out_path, &rendered).map_err(|e| subdue::SubdueError::Parameter {
            message: format!("cannot write {out_path}: {e}"),
        })?;
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("subdue: {e}");
            ExitCode::FAILURE
        }
    }
}
