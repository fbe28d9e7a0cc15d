use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ml2c")]
#[command(about = "ml2c - Transpile trained models to standalone C")]
#[command(version)]
struct Cli {
    /// Log pipeline steps to stderr (overridden by ML2C_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate C source for a model, then compile it
    Transpile {
        model: PathBuf,

        /// Source file to write (default: <model stem>_inference.c)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file with test vectors: [[...], ...] or a single [...]
        #[arg(long, conflicts_with = "vector")]
        test_data: Option<PathBuf>,

        /// Comma-separated test vector; repeat for several
        #[arg(long)]
        vector: Vec<String>,

        /// Only write the source file
        #[arg(long)]
        no_compile: bool,

        /// Binary to produce (default: source path without extension)
        #[arg(long, conflicts_with = "no_compile")]
        binary: Option<PathBuf>,

        /// Execute the compiled harness and print its predictions
        #[arg(long, conflicts_with = "no_compile")]
        run: bool,

        /// Emit `prediction` without a `main`; the result cannot be linked on its own
        #[arg(long, requires = "no_compile")]
        no_harness: bool,

        /// C compiler to invoke
        #[arg(long)]
        compiler: Option<String>,

        /// Compiler timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// JSON config file with `emitter` and `toolchain` sections
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Describe the parameters extracted from a model
    Inspect {
        model: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Check generated C files against the ml2c grammar
    Validate { input: PathBuf },

    /// Execute a compiled harness and print its predictions
    Run {
        binary: PathBuf,

        /// Harness timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Transpile {
            model,
            output,
            test_data,
            vector,
            no_compile,
            binary,
            run,
            no_harness,
            compiler,
            timeout,
            config,
        } => cmd_transpile(TranspileArgs {
            model,
            output,
            test_data,
            vector,
            no_compile,
            binary,
            run,
            no_harness,
            compiler,
            timeout,
            config,
        }),
        Commands::Inspect { model, json } => cmd_inspect(model, json),
        Commands::Validate { input } => cmd_validate(input, cli.verbose),
        Commands::Run { binary, timeout } => cmd_run(binary, timeout),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ML2C_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct TranspileArgs {
    model: PathBuf,
    output: Option<PathBuf>,
    test_data: Option<PathBuf>,
    vector: Vec<String>,
    no_compile: bool,
    binary: Option<PathBuf>,
    run: bool,
    no_harness: bool,
    compiler: Option<String>,
    timeout: Option<u64>,
    config: Option<PathBuf>,
}

fn cmd_transpile(args: TranspileArgs) -> Result<()> {
    use colored::*;
    use ml2c::{default_output_file, Ml2cConfig, Transpiler};
    use std::time::Instant;

    let start = Instant::now();

    let mut config = match &args.config {
        Some(path) => Ml2cConfig::load(path)?,
        None => Ml2cConfig::from_env(),
    };
    if let Some(compiler) = args.compiler {
        config.toolchain.compiler = compiler;
    }
    if let Some(timeout) = checked_timeout(args.timeout)? {
        config.toolchain.timeout_secs = timeout;
    }
    if args.no_harness {
        config.emitter.emit_harness = false;
    }
    if !config.emitter.emit_harness && !args.no_compile {
        bail!("harness generation is disabled; pass --no-compile to write library-only source");
    }

    let model = ml2c::core::persist::load_model(&args.model)
        .with_context(|| format!("failed to load {}", args.model.display()))?;
    let transpiler = Transpiler::with_config(ml2c::extract(&model)?, &config);
    let test_data = load_test_vectors(args.test_data.as_deref(), &args.vector)?;

    let output = args
        .output
        .unwrap_or_else(|| default_output_file(&args.model));
    let c_file = transpiler.save(&output, test_data.as_ref())?;
    println!(
        "{} {} ({})",
        "Generated".bright_green().bold(),
        c_file.display(),
        transpiler.spec().kind()
    );

    if args.no_compile {
        return Ok(());
    }

    let binary = transpiler.compile(&c_file, args.binary.as_deref())?;
    println!(
        "{} {} in {:.3}s",
        "Compiled".bright_green().bold(),
        binary.display(),
        start.elapsed().as_secs_f64()
    );

    if args.run {
        print_predictions(&transpiler.run(&binary)?);
    }

    Ok(())
}

fn cmd_run(binary: PathBuf, timeout: Option<u64>) -> Result<()> {
    let mut config = ml2c::ToolchainConfig::from_env();
    if let Some(timeout) = checked_timeout(timeout)? {
        config.timeout_secs = timeout;
    }
    let predictions = ml2c::Toolchain::new(config)
        .run_harness(&binary)
        .with_context(|| format!("failed to run {}", binary.display()))?;
    print_predictions(&predictions);
    Ok(())
}

fn checked_timeout(timeout: Option<u64>) -> Result<Option<u64>> {
    match timeout {
        Some(0) => bail!("--timeout must be at least 1 second"),
        other => Ok(other),
    }
}

fn print_predictions(predictions: &[f64]) {
    use colored::*;

    println!("{}", "C Predictions:".bright_blue().bold());
    for (index, value) in predictions.iter().enumerate() {
        println!("  Test {}: {:.6}", index, value);
    }
}

fn load_test_vectors(path: Option<&Path>, vectors: &[String]) -> Result<Option<ml2c::TestVectors>> {
    if let Some(path) = path {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read test data {}", path.display()))?;
        let data = serde_json::from_str(&json)
            .with_context(|| format!("invalid test data in {}", path.display()))?;
        return Ok(Some(data));
    }
    if vectors.is_empty() {
        return Ok(None);
    }

    let rows = vectors
        .iter()
        .map(|raw| {
            raw.split(',')
                .map(|v| {
                    v.trim()
                        .parse::<f64>()
                        .map_err(|_| anyhow!("invalid number '{}' in --vector {}", v.trim(), raw))
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(ml2c::TestVectors::new(rows)))
}

fn cmd_inspect(model: PathBuf, json: bool) -> Result<()> {
    use colored::*;
    use ml2c::ModelSpec;

    let transpiler = ml2c::Transpiler::load(&model)
        .with_context(|| format!("failed to load {}", model.display()))?;
    let spec = transpiler.spec();

    if json {
        println!("{}", serde_json::to_string_pretty(spec)?);
        return Ok(());
    }

    println!("{}", format!(" Model: {}", model.display()).bright_cyan().bold());
    println!("{}", "=".repeat(50).bright_cyan());
    println!("Kind: {}", spec.kind());
    println!("Features: {}", spec.n_features());
    match spec {
        ModelSpec::Linear(linear) | ModelSpec::Logistic(linear) => {
            println!("Intercept: {}", linear.intercept());
            println!("Coefficients: {:?}", linear.coefficients());
        }
        ModelSpec::Tree(tree) => {
            println!("Nodes: {}", tree.nodes().len());
            println!("Depth: {}", tree.depth());
            println!("Leaves: {}", tree.n_leaves());
        }
    }

    Ok(())
}

fn cmd_validate(input: PathBuf, verbose: bool) -> Result<()> {
    use colored::*;
    use walkdir::WalkDir;

    let files: Vec<PathBuf> = if input.is_dir() {
        WalkDir::new(&input)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "c"))
            .collect()
    } else {
        vec![input.clone()]
    };

    if files.is_empty() {
        println!("{}", "  No .c files found".yellow());
        return Ok(());
    }

    let mut failures = 0;
    for file in &files {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;

        match ml2c::parser::summarize(&content) {
            Ok(summary) => {
                let predictions = summary.count_named("prediction");
                if predictions != 1 {
                    failures += 1;
                    println!(
                        "{} {}: expected one prediction function, found {}",
                        " INVALID".bright_red().bold(),
                        file.display(),
                        predictions
                    );
                    continue;
                }
                println!("{} {}", " VALID".bright_green().bold(), file.display());
                if verbose {
                    for function in &summary.functions {
                        println!(
                            "   {} ({} returns, deepest at column {})",
                            function.signature,
                            function.returns,
                            function.max_return_indent
                        );
                    }
                }
            }
            Err(e) => {
                failures += 1;
                println!("{} {}", " INVALID".bright_red().bold(), file.display());
                println!("{}", e);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} of {} file(s) failed validation", failures, files.len()));
    }
    Ok(())
}
