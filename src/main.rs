use anyhow::{Context, Result};
use deep_research::cli::output::Output;
use deep_research::cli::{Cli, Commands};
use deep_research::summarize::LlmCondenser;
use deep_research::utils::toml_config::{LogFormat, ProviderConfig, RuntimeConfig};
use deep_research::{
    AgentRegistry, ArtifactStore, BoundedSummarizer, FsArtifactStore, JsonlMemoryStore,
    ProviderRegistry, ResearchConfig, RunContext, SummaryMode, ToolRegistry,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shared memory file, relative to the artifacts root
const MEMORY_FILE: &str = "memory.jsonl";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Commands::Run {
            task,
            artifacts,
            max_rounds,
            json,
        } => {
            let config = ResearchConfig::load(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            init_tracing(&config.runtime, cli.verbose);

            let succeeded = run(config, &output, task, artifacts, max_rounds, json).await?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Config { validate } => {
            show_config(&output, &cli.config, validate)?;
        }
        Commands::Agents => {
            let config = ResearchConfig::read(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            list_agents(&output, &config);
        }
    }

    Ok(())
}

fn init_tracing(runtime: &RuntimeConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        runtime.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match runtime.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run(
    mut config: ResearchConfig,
    output: &Output,
    task: String,
    artifacts: Option<PathBuf>,
    max_rounds: Option<u32>,
    json: bool,
) -> Result<bool> {
    if let Some(root) = artifacts {
        config.artifacts.root = root;
    }
    if let Some(max_rounds) = max_rounds {
        config.swarm.max_rounds = max_rounds;
    }

    let store: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(&config.artifacts.root));
    let providers = Arc::new(ProviderRegistry::from_config(&config));

    let summarizer = match config.summarizer.mode {
        SummaryMode::Abstractive => {
            let llm = providers
                .create_client_for_model(&config.summarizer.model)
                .await?;
            BoundedSummarizer::with_condenser(store.clone(), Arc::new(LlmCondenser::new(llm)))
        }
        SummaryMode::Truncate => BoundedSummarizer::new(store.clone()),
    };

    let tools = Arc::new(ToolRegistry::with_config(&config)?);
    let swarm = AgentRegistry::from_config(&config, providers, tools)
        .build_swarm()
        .await?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling run");
                cancel.cancel();
            }
        });
    }

    let mut ctx = RunContext::new(store)
        .with_summarizer(Arc::new(summarizer))
        .with_cancellation(cancel);
    if config.uses_memory() {
        let memory_path = config.artifacts.root.join(MEMORY_FILE);
        let memory = JsonlMemoryStore::open(&memory_path)
            .await
            .with_context(|| format!("Failed to load memory from {}", memory_path.display()))?;
        ctx = ctx.with_memory(Arc::new(memory));
    }

    if !json {
        output.banner();
        output.kv("task", &task);
        output.kv("artifacts", &config.artifacts.root.display().to_string());
        output.newline();
    }

    let outcome = swarm.run(task, &ctx).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for message in outcome.transcript.iter() {
            output.message(message);
        }
        output.newline();
        output.kv("rounds", &outcome.state.round_count.to_string());
        output.kv("handoffs", &outcome.state.handoff_count.to_string());
        output.kv("elapsed", &format!("{:.1}s", outcome.elapsed.as_secs_f64()));
        output.status(&outcome);
    }

    Ok(outcome.is_done())
}

fn show_config(output: &Output, path: &Path, validate: bool) -> Result<()> {
    let config = ResearchConfig::read(path)
        .with_context(|| format!("loading {}", path.display()))?;

    output.header("Configuration");
    output.kv("file", &path.display().to_string());
    output.kv("artifacts", &config.artifacts.root.display().to_string());
    output.kv("entry agent", &config.swarm.entry_agent);
    output.kv("finalizer", config.finalizer());
    output.kv("max rounds", &config.swarm.max_rounds.to_string());
    output.kv("max revisions", &config.swarm.max_revisions.to_string());
    output.kv("summarizer", &format!("{:?}", config.summarizer.mode).to_lowercase());

    output.header("Providers");
    let mut providers: Vec<_> = config.providers.iter().collect();
    providers.sort_by(|a, b| a.0.cmp(b.0));
    for (name, provider) in providers {
        let detail = match provider {
            ProviderConfig::Ollama { base_url, .. } => format!("ollama @ {}", base_url),
            ProviderConfig::OpenAI { api_base, .. } => format!("openai @ {}", api_base),
        };
        output.kv(name, &detail);
    }

    output.header("Tools");
    for tool in config.enabled_tools() {
        output.list_item(&format!("{} ({}s)", tool, config.tool_timeout(tool).as_secs()));
    }

    if validate {
        output.newline();
        match config.validate() {
            Ok(()) => output.success("Configuration is valid"),
            Err(e) => {
                output.error(&e.to_string());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn list_agents(output: &Output, config: &ResearchConfig) {
    output.header("Agents");
    output.table_header(&["Name", "Role", "Model"]);

    let descriptors = config.agent_descriptors();
    for descriptor in &descriptors {
        output.table_row(&[
            descriptor.name.as_str(),
            descriptor.role.as_str(),
            config.agent_model(descriptor.name.as_str()),
        ]);
    }

    for descriptor in &descriptors {
        output.header(descriptor.name.as_str());
        output.kv("description", &descriptor.description);
        let tools: Vec<&str> = descriptor.tool_names.iter().map(String::as_str).collect();
        output.kv("tools", &tools.join(", "));
        let targets: Vec<&str> = descriptor
            .handoff_targets
            .iter()
            .map(|t| t.as_str())
            .collect();
        output.kv("hands off to", &targets.join(", "));
    }

    if config.agents.is_empty() {
        output.hint("No [agents] configured; showing the built-in research team.");
    }
}
