use clap::{Parser, Subcommand};
use conclave_core::model::{EvaluationStatus, ImportBatch};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "conclave",
    version,
    about = "Multi-model evaluation management for human review panels"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    Questions(QuestionsArgs),
    Config(ConfigArgs),
    Import(ImportArgs),
    Report(ReportArgs),
    Version,
}

#[derive(Parser, Clone)]
struct QuestionsArgs {
    #[arg(long, default_value = "questions")]
    questions_dir: PathBuf,
}

#[derive(Parser, Clone)]
struct ConfigArgs {
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,
}

#[derive(Parser, Clone)]
struct ImportArgs {
    #[arg(long, default_value = ".conclave/conclave.db")]
    db: PathBuf,

    #[arg(long, default_value = "questions")]
    questions_dir: PathBuf,

    /// evaluation id to attach the imported responses to
    #[arg(long)]
    evaluation: Uuid,

    /// JSON file with a {"responses": [...]} batch
    #[arg(long)]
    file: PathBuf,
}

#[derive(Parser, Clone)]
struct ReportArgs {
    #[arg(long, default_value = ".conclave/conclave.db")]
    db: PathBuf,

    #[arg(long)]
    evaluation: Uuid,

    /// output format: json|markdown|html
    #[arg(long, default_value = "markdown")]
    format: String,

    /// write to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

mod exit_codes {
    pub const OK: i32 = 0;
    pub const CONFIG_ERROR: i32 = 2;
}

fn main() {
    let cli = Cli::parse();
    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}

fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Questions(args) => cmd_questions(args),
        Command::Config(args) => cmd_config(args),
        Command::Import(args) => cmd_import(args),
        Command::Report(args) => cmd_report(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_questions(args: QuestionsArgs) -> anyhow::Result<i32> {
    let questions = conclave_core::questions::load_all_questions(&args.questions_dir);
    println!("Loaded {} questions:\n", questions.len());
    for q in &questions {
        let text: String = q.text.chars().take(80).collect();
        println!(
            "  [{}] ({}/{}) {}",
            q.id,
            q.question_type.as_str(),
            q.difficulty,
            text
        );
    }
    Ok(exit_codes::OK)
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<i32> {
    let cfg = conclave_core::config::load_app_config(&args.config_dir)?;

    println!("Models ({}):", cfg.models.len());
    for m in &cfg.models {
        println!("  - {} ({})", m.name, m.provider);
    }
    println!("\nPerspectives ({}):", cfg.perspectives.len());
    for p in &cfg.perspectives {
        println!("  - {}: {}", p.id, p.name);
    }
    println!("\nScoring Dimensions ({}):", cfg.dimensions.len());
    for d in &cfg.dimensions {
        println!("  - {}: {}", d.name, d.label);
    }
    println!("\nPrompt Templates ({}):", cfg.templates.len());
    for t in &cfg.templates {
        println!("  - {}: {} (v{})", t.id, t.name, t.version);
    }
    Ok(exit_codes::OK)
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<i32> {
    let raw = std::fs::read_to_string(&args.file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", args.file.display(), e))?;
    let batch: ImportBatch = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", args.file.display(), e))?;

    let bank = conclave_core::questions::load_all_questions(&args.questions_dir);

    ensure_parent_dir(&args.db)?;
    let store = conclave_core::storage::Store::open(&args.db)?;
    store.init_schema()?;

    let evaluation = store
        .get_evaluation(args.evaluation)?
        .ok_or_else(|| anyhow::anyhow!("evaluation {} not found", args.evaluation))?;

    let created =
        conclave_core::engine::import::import_responses(&store, evaluation.id, &batch, &bank)?;

    if evaluation.status == EvaluationStatus::Created {
        store.set_evaluation_status(evaluation.id, EvaluationStatus::Reviewing)?;
    }

    eprintln!(
        "imported {} responses into evaluation {}",
        created.len(),
        evaluation.id
    );
    Ok(exit_codes::OK)
}

fn cmd_report(args: ReportArgs) -> anyhow::Result<i32> {
    let store = conclave_core::storage::Store::open(&args.db)?;
    store.init_schema()?;

    let evaluation = store
        .get_evaluation(args.evaluation)?
        .ok_or_else(|| anyhow::anyhow!("evaluation {} not found", args.evaluation))?;

    let responses = store.responses_for_evaluation(evaluation.id)?;
    let scores = store.scores_for_evaluation(evaluation.id)?;
    let report = conclave_report::aggregate::aggregate_scores(&responses, &scores);
    let rankings = conclave_report::insights::rank_models(&report);
    let strengths = conclave_report::insights::identify_strengths_weaknesses(&report);

    let rendered = match args.format.as_str() {
        "json" => {
            let data = conclave_report::render::build_report_data(
                &evaluation,
                &report,
                &rankings,
                &strengths,
            )?;
            serde_json::to_string_pretty(&data)?
        }
        "markdown" | "md" => {
            conclave_report::render::render_markdown(&evaluation, &report, &rankings, &strengths)
        }
        "html" => {
            conclave_report::render::render_html(&evaluation, &report, &rankings, &strengths)
        }
        other => anyhow::bail!("unsupported format '{}' (expected json|markdown|html)", other),
    };

    match &args.out {
        Some(path) => {
            ensure_parent_dir(path)?;
            std::fs::write(path, rendered)?;
            eprintln!("wrote report to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(exit_codes::OK)
}

fn ensure_parent_dir(path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
