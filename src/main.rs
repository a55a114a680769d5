//! Ideaflow - resumable idea-refinement wizard for your terminal.
//!
//! Drives a five-step refinement workflow over a durable local session, so
//! every invocation picks up exactly where the last one left off.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use parking_lot::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ideaflow::{
    merge_variations, spawn_autosave, Config, FileBackend, FileStore, GeneratorManager, IdeaStore,
    RefinementStep, SessionContext, StaticFlags, Variation, VariationDraft, WorkflowSession,
    TOTAL_STEPS,
};

/// Resumable idea-refinement wizard
#[derive(Parser)]
#[command(name = "ideaflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session state directory (defaults to ~/.ideaflow)
    #[arg(long, global = true, env = "IDEAFLOW_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    /// Deep-link to a step (0-4), overriding the stored cursor
    #[arg(long, global = true)]
    step: Option<usize>,

    /// User identity forwarded to generation and flag lookups
    #[arg(long, global = true, env = "IDEAFLOW_USER")]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current session state (default)
    Status,

    /// Set a text field on the idea document
    Set {
        /// Field name (title, description, problem_statement, ...)
        field: String,

        /// New value
        value: String,
    },

    /// Advance to the next step, if the current step's precondition passes
    Advance,

    /// Go back one step
    Back,

    /// Jump to a specific step (0-4)
    Goto {
        /// Step index
        step: usize,
    },

    /// Continue past the current step with permissive reconciliation
    Continue,

    /// Work with concept variations
    Variations {
        /// Variation operation
        #[command(subcommand)]
        operation: VariationOperation,
    },

    /// Generate AI feedback for the idea
    Feedback,

    /// Generate business-model suggestions
    Suggest,

    /// Free-text refinement prompt against the idea
    Refine {
        /// The prompt
        prompt: String,
    },

    /// Persist the idea to the record backend
    Save,

    /// Wipe the local session state
    Clear,

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum VariationOperation {
    /// List current concept variations
    List,

    /// Generate a fresh set of variations
    Generate,

    /// Select one variation as the chosen concept
    Select {
        /// Variation id (or unambiguous id prefix)
        id: String,
    },

    /// Edit a variation's fields
    Edit {
        /// Variation id (or unambiguous id prefix)
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        differentiator: Option<String>,

        #[arg(long)]
        target_market: Option<String>,

        #[arg(long)]
        revenue_model: Option<String>,
    },

    /// Merge 2-5 variations into a synthesized concept
    Merge {
        /// Variation ids, in merge order
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };
    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    let config = Config::load()?;
    let session_dir = match &cli.session_dir {
        Some(dir) => dir.clone(),
        None => config.session_dir()?,
    };

    match cli.command {
        None | Some(Commands::Status) => {
            let session = open_session(&cli, &config, &session_dir)?;
            print_status(&session);
        }
        Some(Commands::Set { ref field, ref value }) => {
            let mut session = open_session(&cli, &config, &session_dir)?;
            cmd_set(&mut session, field, value)?;
        }
        Some(Commands::Advance) => {
            let mut session = open_session(&cli, &config, &session_dir)?;
            if session.advance() {
                println!("Moved to step {}: {}", session.cursor_index(), session.cursor());
            } else if let Some(error) = session.error() {
                println!("Blocked: {error}");
            } else {
                println!("Already at the last step");
            }
        }
        Some(Commands::Back) => {
            let mut session = open_session(&cli, &config, &session_dir)?;
            if session.retreat() {
                println!("Moved to step {}: {}", session.cursor_index(), session.cursor());
            } else {
                println!("Already at the first step");
            }
        }
        Some(Commands::Goto { step }) => {
            let mut session = open_session(&cli, &config, &session_dir)?;
            if session.set_cursor(step) {
                println!("Moved to step {}: {}", session.cursor_index(), session.cursor());
            } else {
                anyhow::bail!("step must be between 0 and {}", TOTAL_STEPS - 1);
            }
        }
        Some(Commands::Continue) => {
            let mut session = open_session(&cli, &config, &session_dir)?;
            let before = session.cursor_index();
            match session.try_continue() {
                Ok(()) if session.cursor_index() == before => {
                    println!("Already at the last step");
                }
                Ok(()) => {
                    println!("Moved to step {}: {}", session.cursor_index(), session.cursor());
                }
                Err(message) => println!("Blocked: {message}"),
            }
        }
        Some(Commands::Variations { ref operation }) => {
            let session = Arc::new(Mutex::new(open_session(&cli, &config, &session_dir)?));
            let autosave = start_autosave(&config, &session);
            let result = cmd_variations(&mut session.lock(), &config, operation).await;
            stop_autosave(autosave);
            result?;
        }
        Some(Commands::Feedback) => {
            let session = Arc::new(Mutex::new(open_session(&cli, &config, &session_dir)?));
            let autosave = start_autosave(&config, &session);
            session.lock().generate_feedback(&generator(&config)).await;
            stop_autosave(autosave);

            let session = session.lock();
            if let Some(feedback) = &session.document().ai_feedback {
                println!("Strengths:");
                for s in &feedback.strengths {
                    println!("  - {s}");
                }
                println!("Suggestions:");
                for s in &feedback.suggestions {
                    println!("  - {s}");
                }
            }
            print_banners(&session);
        }
        Some(Commands::Suggest) => {
            let session = Arc::new(Mutex::new(open_session(&cli, &config, &session_dir)?));
            let autosave = start_autosave(&config, &session);
            session.lock().generate_suggestions(&generator(&config)).await;
            stop_autosave(autosave);

            let session = session.lock();
            if let Some(suggestions) = &session.document().business_suggestions {
                println!("Target audience: {}", suggestions.target_audience.join(", "));
                println!("Sales channels:  {}", suggestions.sales_channels.join(", "));
                println!("Pricing models:  {}", suggestions.pricing_model.join(", "));
            }
            print_banners(&session);
        }
        Some(Commands::Refine { ref prompt }) => {
            let session = open_session(&cli, &config, &session_dir)?;
            let generated =
                generator(&config).refine(session.context(), session.document(), prompt).await;
            println!("{}", generated.value);
        }
        Some(Commands::Save) => {
            let session = Arc::new(Mutex::new(open_session(&cli, &config, &session_dir)?));
            let backend = FileBackend::new(session_dir.join("records.json"));
            let autosave = start_autosave(&config, &session);
            let saved = session.lock().save_remote(&backend).await;
            stop_autosave(autosave);

            let session = session.lock();
            if saved {
                let doc = session.document();
                println!(
                    "Saved idea {} (version {})",
                    doc.id.as_deref().unwrap_or("?"),
                    doc.version.unwrap_or(0)
                );
            }
            print_banners(&session);
        }
        Some(Commands::Clear) => {
            let session = open_session(&cli, &config, &session_dir)?;
            if session.clear_local_storage() {
                println!("Local session state cleared");
            } else {
                println!("Could not fully clear local session state");
            }
        }
        Some(Commands::Config { path }) => {
            if path {
                println!("{}", Config::default_path()?.display());
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Open the workflow session from the durable store, honoring a `--step`
/// deep link the same way a shared URL would be.
fn open_session(cli: &Cli, config: &Config, session_dir: &Path) -> Result<WorkflowSession> {
    let store =
        IdeaStore::new(Arc::new(FileStore::new(session_dir.to_path_buf())?), TOTAL_STEPS);
    let query = cli.step.map(|s| format!("step={s}"));
    let ctx = SessionContext { user_id: cli.user.clone(), context: None };
    Ok(WorkflowSession::new(ctx, store, query.as_deref(), config.general.default_step))
}

fn generator(config: &Config) -> GeneratorManager {
    let flags = Arc::new(StaticFlags::new());
    #[cfg(feature = "ai")]
    if let Some(endpoint) = &config.ai.endpoint {
        match ideaflow::HttpGenerator::with_timeout(
            endpoint.clone(),
            Duration::from_secs(config.ai.timeout_secs),
        ) {
            Ok(client) => return GeneratorManager::new(Some(Box::new(client)), flags),
            Err(e) => {
                tracing::warn!(error = %e, "could not build the HTTP generator, using local generation");
            }
        }
    }
    GeneratorManager::mock_only(flags)
}

/// Start the background autosave ticker for the duration of a long-running
/// command, per the autosave configuration.
fn start_autosave(
    config: &Config,
    session: &Arc<Mutex<WorkflowSession>>,
) -> Option<tokio::task::JoinHandle<()>> {
    if !config.autosave.enabled || config.autosave.interval_secs == 0 {
        return None;
    }
    Some(spawn_autosave(Arc::clone(session), Duration::from_secs(config.autosave.interval_secs)))
}

fn stop_autosave(handle: Option<tokio::task::JoinHandle<()>>) {
    if let Some(handle) = handle {
        handle.abort();
    }
}

fn cmd_set(session: &mut WorkflowSession, field: &str, value: &str) -> Result<()> {
    let field = field.to_lowercase();
    if !is_known_field(&field) {
        anyhow::bail!(
            "unknown field '{field}' (expected title, description, problem_statement, \
             solution_concept, target_audience, unique_value, business_model, \
             marketing_strategy, revenue_model, or go_to_market)"
        );
    }
    session.mutate_document(|doc| {
        let target = match field.as_str() {
            "title" => &mut doc.title,
            "description" => &mut doc.description,
            "problem_statement" => &mut doc.problem_statement,
            "solution_concept" => &mut doc.solution_concept,
            "target_audience" => &mut doc.target_audience,
            "unique_value" => &mut doc.unique_value,
            "business_model" => &mut doc.business_model,
            "marketing_strategy" => &mut doc.marketing_strategy,
            "revenue_model" => &mut doc.revenue_model,
            "go_to_market" => &mut doc.go_to_market,
            _ => return,
        };
        *target = value.to_string();
    });
    // Editing a field dismisses any stale validation error
    session.clear_error();
    println!("Set {field}");
    Ok(())
}

fn is_known_field(field: &str) -> bool {
    matches!(
        field,
        "title"
            | "description"
            | "problem_statement"
            | "solution_concept"
            | "target_audience"
            | "unique_value"
            | "business_model"
            | "marketing_strategy"
            | "revenue_model"
            | "go_to_market"
    )
}

async fn cmd_variations(
    session: &mut WorkflowSession,
    config: &Config,
    operation: &VariationOperation,
) -> Result<()> {
    match operation {
        VariationOperation::List => {
            let doc = session.document();
            if doc.concept_variations.is_empty() {
                println!("No variations yet - run 'ideaflow variations generate'");
            }
            for v in &doc.concept_variations {
                let marker = if v.is_selected { "*" } else { " " };
                println!("{marker} [{}] {}", &v.id[..8.min(v.id.len())], v.title);
                println!("      {}", v.description);
            }
            if let Some(merged) = &doc.merged_variation {
                println!("Merged concept: {}", merged.title);
            }
        }
        VariationOperation::Generate => {
            session.generate_variations(&generator(config)).await;
            println!("{} variations generated", session.document().concept_variations.len());
            print_banners(session);
        }
        VariationOperation::Select { id } => {
            let full_id = resolve_variation_id(session, id)?;
            session.mutate_document(|doc| {
                doc.select_variation(&full_id);
            });
            println!("Selected variation {id}");
        }
        VariationOperation::Edit {
            id,
            title,
            description,
            differentiator,
            target_market,
            revenue_model,
        } => {
            let full_id = resolve_variation_id(session, id)?;
            let source = session
                .document()
                .concept_variations
                .iter()
                .find(|v| v.id == full_id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no variation with id {id}"))?;

            let mut draft = VariationDraft::begin(&source);
            if let Some(title) = title {
                draft.title = title.clone();
            }
            if let Some(description) = description {
                draft.description = description.clone();
            }
            if let Some(differentiator) = differentiator {
                draft.differentiator = differentiator.clone();
            }
            if let Some(target_market) = target_market {
                draft.target_market = target_market.clone();
            }
            if let Some(revenue_model) = revenue_model {
                draft.revenue_model = revenue_model.clone();
            }

            let mut committed = false;
            session.mutate_document(|doc| committed = draft.commit(doc));
            if committed {
                println!("Updated variation {id}");
            } else {
                anyhow::bail!("variation {id} no longer exists");
            }
        }
        VariationOperation::Merge { ids } => {
            if ids.len() > ideaflow::core::MAX_VARIATIONS {
                anyhow::bail!("You can select a maximum of 5 variations to merge");
            }
            let mut inputs: Vec<Variation> = Vec::new();
            for id in ids {
                let full_id = resolve_variation_id(session, id)?;
                let variation = session
                    .document()
                    .concept_variations
                    .iter()
                    .find(|v| v.id == full_id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("no variation with id {id}"))?;
                inputs.push(variation);
            }
            match merge_variations(&inputs) {
                Ok(merged) => {
                    println!("Merged concept: {}", merged.title);
                    println!("  {}", merged.description);
                    session.mutate_document(|doc| doc.set_merged_variation(merged));
                }
                Err(e) => {
                    session.set_error(e.to_string());
                    println!("Blocked: {e}");
                }
            }
        }
    }
    Ok(())
}

/// Resolve a possibly-abbreviated variation id against the current list.
fn resolve_variation_id(session: &WorkflowSession, prefix: &str) -> Result<String> {
    let matches: Vec<&str> = session
        .document()
        .concept_variations
        .iter()
        .filter(|v| v.id.starts_with(prefix))
        .map(|v| v.id.as_str())
        .collect();
    match matches.as_slice() {
        [only] => Ok((*only).to_string()),
        [] => anyhow::bail!("no variation with id {prefix}"),
        _ => anyhow::bail!("variation id {prefix} is ambiguous"),
    }
}

fn print_status(session: &WorkflowSession) {
    let doc = session.document();
    println!(
        "Step {}/{}: {}",
        session.cursor_index() + 1,
        TOTAL_STEPS,
        session.cursor()
    );
    println!("Title:       {}", display_or_dash(&doc.title));
    println!("Description: {}", display_or_dash(&doc.description));
    println!("Status:      {}", doc.status);
    if let Some(id) = &doc.id {
        println!("Remote id:   {id} (version {})", doc.version.unwrap_or(0));
    }
    if !doc.concept_variations.is_empty() {
        println!("Variations:  {}", doc.concept_variations.len());
    }
    if let Some(selected) = &doc.selected_variation {
        println!("Selected:    {}", selected.title);
    }
    if let Some(merged) = &doc.merged_variation {
        println!("Merged:      {}", merged.title);
    }
    let can_advance = session.cursor().can_advance(doc);
    println!(
        "Next:        {}",
        if session.cursor() == RefinementStep::ComponentVariations {
            "final step".to_string()
        } else if can_advance {
            "ready to advance".to_string()
        } else {
            session.cursor().blocked_message().to_string()
        }
    );
    print_banners(session);
}

fn print_banners(session: &WorkflowSession) {
    if let Some(error) = session.error() {
        println!("Error:   {error}");
    }
    if let Some(success) = session.success() {
        println!("Success: {success}");
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
