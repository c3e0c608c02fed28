use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::eyre;

use domset_rs::registry::{
    ComponentSettings, Registry, DEFAULT_INPUT_SOURCE, DEFAULT_OUTPUT_PROXY, DEFAULT_SOLVER,
};

/// Exact minimum dominating set solver.
///
/// Components are selected by name (`--list` shows them all); the
/// remaining flags parameterize whichever components are in play.
#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Input source component.
    #[arg(short = 'I', long = "input", default_value = DEFAULT_INPUT_SOURCE)]
    input: String,

    /// Solver component.
    #[arg(short = 'S', long = "solver", default_value = DEFAULT_SOLVER)]
    solver: String,

    /// Output proxy component.
    #[arg(short = 'O', long = "output", default_value = DEFAULT_OUTPUT_PROXY)]
    output: String,

    /// Preprocess filter components, applied in order (repeatable).
    #[arg(short = 'F', long = "filter")]
    filters: Vec<String>,

    /// Generator size; board generators accept --start/--end ranges too.
    #[arg(short = 'n', value_name = "INT")]
    n: Option<usize>,

    /// First board size of a generator range.
    #[arg(long, value_name = "INT")]
    start: Option<usize>,

    /// Last board size of a generator range.
    #[arg(long, value_name = "INT")]
    end: Option<usize>,

    /// Subset size for the Kneser generator.
    #[arg(short = 'k', value_name = "INT")]
    k: Option<usize>,

    /// Upper bound: no larger certificate is emitted.
    #[arg(short = 'u', long = "upper", value_name = "INT")]
    upper: Option<usize>,

    /// Lower bound: no smaller certificate is emitted.
    #[arg(short = 'l', long = "lower", value_name = "INT")]
    lower: Option<usize>,

    /// Residue class to search (with --mod and --resmod-depth).
    #[arg(long, value_name = "INT")]
    res: Option<u64>,

    /// Number of residue classes the search tree is split into.
    #[arg(long = "mod", value_name = "INT")]
    modulus: Option<u64>,

    /// Depth at which the residue split is applied.
    #[arg(long = "resmod-depth", value_name = "INT")]
    resmod_depth: Option<usize>,

    /// Vertices for the force_in filter.
    #[arg(long = "force-in", value_name = "VERTEX")]
    force_in: Vec<usize>,

    /// Vertices for the force_out filter.
    #[arg(long = "force-out", value_name = "VERTEX")]
    force_out: Vec<usize>,

    /// Root vertex for the renumber_bfs filter.
    #[arg(long = "bfs-root", value_name = "VERTEX")]
    bfs_root: Option<usize>,

    /// Seed for the renumber_random filter.
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,

    /// output_best: print only the certificate size.
    #[arg(long = "size-only")]
    size_only: bool,

    /// output_first: stop the search after this many certificates.
    #[arg(long, value_name = "INT")]
    limit: Option<u64>,

    /// Print the component listing and exit.
    #[arg(long)]
    list: bool,

    /// Chattier logging (includes the per-depth node histogram).
    #[arg(long)]
    verbose: bool,

    /// Warnings and errors only.
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn settings(&self) -> ComponentSettings {
        ComponentSettings {
            n: self.n,
            start: self.start,
            end: self.end,
            k: self.k,
            upper: self.upper,
            lower: self.lower,
            res: self.res,
            modulus: self.modulus,
            resmod_depth: self.resmod_depth,
            force_in: self.force_in.clone(),
            force_out: self.force_out.clone(),
            bfs_root: self.bfs_root,
            seed: self.seed,
            size_only: self.size_only,
            limit: self.limit,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let level = if args.verbose {
        simplelog::LevelFilter::Debug
    } else if args.quiet {
        simplelog::LevelFilter::Warn
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let registry = Registry::with_builtin_components();
    if args.list {
        eprint!("{}", registry.describe());
        return Ok(());
    }

    let settings = args.settings();
    let mut input = registry
        .spawn_input_source(&args.input, &settings)
        .map_err(|e| eyre!(e))?;
    let mut solver = registry
        .spawn_solver(&args.solver, &settings)
        .map_err(|e| eyre!(e))?;
    let mut output = registry
        .spawn_output_proxy(&args.output, &settings)
        .map_err(|e| eyre!(e))?;
    let mut filters = Vec::new();
    for name in &args.filters {
        filters.push(
            registry
                .spawn_preprocess_filter(name, &settings)
                .map_err(|e| eyre!(e))?,
        );
    }

    log::info!(
        "input: {} filters: [{}] solver: {} output: {}",
        args.input,
        args.filters.join(", "),
        args.solver,
        args.output
    );

    while let Some(mut inst) = input.read_next().map_err(|e| eyre!(e))? {
        for filter in &mut filters {
            filter.process(&mut inst).map_err(|e| eyre!(e))?;
        }
        let timer = Instant::now();
        solver.solve(&mut inst, output.as_mut()).map_err(|e| eyre!(e))?;
        log::info!("total solver time: {:.3} s", timer.elapsed().as_secs_f64());
    }

    Ok(())
}
