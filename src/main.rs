use clap::{Parser, Subcommand};
use ralph_settings_lib::api::{Backend, InvokeClient, LocalBackend};
use ralph_settings_lib::models::{ChatCommandScope, TemplateScope};
use ralph_settings_lib::settings::{
    AgentStatusStore, ChatCommandDraft, ChatCommandStore, ConfigStore, ErrorStrategyKind,
    GestureStore, KeyBarStore, ModelListLoader, PartialGestureSettings, PartialLocalPreferences,
    PreferenceStore, PreviewOutcome, TemplateEditor,
};
use ralph_settings_lib::storage::LocalStorage;
use ralph_settings_lib::utils::default_storage_dir;
use ralph_settings_lib::AgentType;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Ralph UI settings - inspect and edit configuration, preferences, templates and chat commands
#[derive(Parser, Debug)]
#[command(name = "ralph-settings")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ralph server URL; without it settings are read from local files
    #[arg(long, env = "RALPH_SERVER_URL")]
    server: Option<String>,

    /// Auth token for the Ralph server
    #[arg(long, env = "RALPH_SERVER_TOKEN")]
    token: Option<String>,

    /// Project directory for project-scoped templates, commands and config
    #[arg(long)]
    project: Option<String>,

    /// Directory for UI-only preferences
    #[arg(long, env = "RALPH_SETTINGS_DIR")]
    storage_dir: Option<PathBuf>,

    /// Root of the local backend (defaults to ~/.ralph-ui)
    #[arg(long)]
    global_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the configuration record
    Show,
    /// Set one field, e.g. `execution.maxParallel 4` or `fallback.errorStrategy skip`
    Set { key: String, value: String },
    /// Discard unsaved backend state and print the durable record
    Reload,
    /// Restore default local preferences
    Reset,
    /// Edit the fallback agent chain
    Fallback {
        #[command(subcommand)]
        action: FallbackAction,
    },
    /// Local-only preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Touch gesture thresholds
    Gestures {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Prompt templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// PRD chat slash commands
    Commands {
        #[command(subcommand)]
        action: CommandAction,
    },
    /// Show which agent CLIs are installed
    Agents,
    /// List models for an agent
    Models {
        agent: AgentType,
        #[arg(long)]
        provider: Option<String>,
        /// Invalidate the model cache first
        #[arg(long)]
        refresh: bool,
    },
    /// Terminal key bar layout and presets
    KeyBar {
        #[command(subcommand)]
        action: KeyBarAction,
    },
}

#[derive(Subcommand, Debug)]
enum FallbackAction {
    List,
    Add { agent: String },
    Remove { index: usize },
    Up { index: usize },
    Down { index: usize },
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    Show,
    /// Set a field, e.g. `theme dark` or `notifications.agentError false`
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug)]
enum TemplateAction {
    List,
    Show { name: String },
    /// Render a template file (`-` for stdin) against sample data
    Preview { file: String },
    Save {
        name: String,
        file: String,
        #[arg(long, default_value = "global")]
        scope: TemplateScope,
    },
    Delete {
        name: String,
        #[arg(long, default_value = "global")]
        scope: TemplateScope,
    },
}

#[derive(Subcommand, Debug)]
enum CommandAction {
    List,
    Create {
        /// Command id; normalized to lowercase with hyphens
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        template: String,
        #[arg(long, default_value = "global")]
        scope: ChatCommandScope,
    },
    Delete { id: String },
    Reset { id: String },
}

#[derive(Subcommand, Debug)]
enum KeyBarAction {
    Show,
    Add { label: String },
    Remove { index: usize },
    Up { index: usize },
    Down { index: usize },
    /// Back to the default keys; presets are kept
    Reset,
    SavePreset { name: String },
    ApplyPreset { name: String },
    DeletePreset { name: String },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(cli)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn backend(cli: &Cli) -> Backend {
    let backend = match &cli.server {
        Some(url) => Backend::Remote(
            InvokeClient::new(url, cli.token.clone()).with_project_path(cli.project.clone()),
        ),
        None => {
            let project = cli.project.as_deref().map(Path::new);
            Backend::Local(match &cli.global_dir {
                Some(dir) => LocalBackend::new(dir, project),
                None => LocalBackend::with_default_dirs(project),
            })
        }
    };
    log::debug!("Using {}", backend.describe());
    backend
}

fn storage(cli: &Cli) -> LocalStorage {
    LocalStorage::new(cli.storage_dir.clone().unwrap_or_else(default_storage_dir))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

/// Build a partial update from a dotted camelCase path and a raw value.
/// Values that are not JSON are taken as strings.
fn partial_from_path<T>(path: &str, raw: &str) -> Result<T, String>
where
    T: DeserializeOwned + Default + PartialEq,
{
    let mut value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    for segment in path.rsplit('.') {
        let mut object = Map::new();
        object.insert(segment.to_string(), value);
        value = Value::Object(object);
    }

    let partial: T = serde_json::from_value(value)
        .map_err(|e| format!("Invalid value '{}' for {}: {}", raw, path, e))?;
    if partial == T::default() {
        return Err(format!("Unknown setting '{}'", path));
    }
    Ok(partial)
}

fn read_input(file: &str) -> Result<String, String> {
    if file == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        return Ok(content);
    }
    std::fs::read_to_string(file).map_err(|e| format!("Failed to read {}: {}", file, e))
}

async fn loaded_config_store(cli: &Cli) -> Result<ConfigStore<Backend>, String> {
    let prefs = PreferenceStore::load(storage(cli));
    let mut store = ConfigStore::new(backend(cli), prefs);
    store.load().await;
    match store.error() {
        Some(e) => Err(e.to_string()),
        None => Ok(store),
    }
}

async fn save_config_store(store: &mut ConfigStore<Backend>) -> Result<(), String> {
    store.save().await;
    match store.error() {
        Some(e) => Err(e.to_string()),
        None => Ok(()),
    }
}

fn apply_setting(store: &mut ConfigStore<Backend>, key: &str, value: &str) -> Result<(), String> {
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| format!("Expected <section>.<field>, got '{}'", key))?;

    match (section, field) {
        ("fallback", "errorStrategy") => {
            store.select_error_strategy(value.parse::<ErrorStrategyKind>()?);
        }
        ("fallback", "retryAttempts") => {
            let attempts = value.parse().map_err(|_| format!("Invalid number '{}'", value))?;
            store.set_retry_attempts(attempts);
        }
        ("fallback", "retryBackoffMs") => {
            let backoff = value.parse().map_err(|_| format!("Invalid number '{}'", value))?;
            store.set_retry_backoff_ms(backoff);
        }
        ("execution", _) => store.update_execution(&partial_from_path(field, value)?),
        ("git", _) => store.update_git(&partial_from_path(field, value)?),
        ("validation", _) => store.update_validation(&partial_from_path(field, value)?),
        ("fallback", _) => store.update_fallback(&partial_from_path(field, value)?),
        ("templates", _) => store.update_templates(&partial_from_path(field, value)?),
        _ => return Err(format!("Unknown section '{}'", section)),
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), String> {
    match &cli.command {
        Command::Show => {
            let store = loaded_config_store(&cli).await?;
            print_json(&store.config())?;
            if let Some(control) = store.max_parallel_control() {
                if control.disabled {
                    println!("(maxParallel pinned to {} by sequential strategy)", control.value);
                }
            }
        }
        Command::Set { key, value } => {
            let mut store = loaded_config_store(&cli).await?;
            apply_setting(&mut store, key, value)?;
            save_config_store(&mut store).await?;
            println!("Saved {} = {}", key, value);
        }
        Command::Reload => {
            let mut store = loaded_config_store(&cli).await?;
            store.reload().await;
            if let Some(e) = store.error() {
                return Err(e.to_string());
            }
            print_json(&store.config())?;
        }
        Command::Reset => {
            let mut store = loaded_config_store(&cli).await?;
            store.reset().await;
            save_config_store(&mut store).await?;
            println!("Local preferences restored to defaults");
        }
        Command::Fallback { action } => run_fallback(&cli, action).await?,
        Command::Prefs { action } => {
            let mut prefs = PreferenceStore::load(storage(&cli));
            if let Some(e) = prefs.recovered_from() {
                eprintln!("Stored preferences were unreadable and were reset: {}", e);
            }
            if let PrefsAction::Set { key, value } = action {
                prefs.update_local(&partial_from_path::<PartialLocalPreferences>(key, value)?);
                prefs.persist()?;
            }
            print_json(prefs.preferences())?;
        }
        Command::Gestures { action } => {
            let mut gestures = GestureStore::load(storage(&cli));
            if let PrefsAction::Set { key, value } = action {
                gestures.update(&partial_from_path::<PartialGestureSettings>(key, value)?)?;
            }
            print_json(gestures.settings())?;
        }
        Command::Templates { action } => run_templates(&cli, action).await?,
        Command::Commands { action } => run_commands(&cli, action).await?,
        Command::Agents => {
            let mut store = AgentStatusStore::new(backend(&cli));
            store.load().await;
            if let Some(e) = store.error() {
                return Err(e.to_string());
            }
            for status in store.statuses() {
                if status.available {
                    println!("{:<14} {:<14} installed", status.display_name, status.cli_command);
                } else {
                    println!(
                        "{:<14} {:<14} missing  ({})",
                        status.display_name, status.cli_command, status.install_hint
                    );
                }
            }
        }
        Command::Models {
            agent,
            provider,
            refresh,
        } => {
            let backend = backend(&cli);
            let mut loader = ModelListLoader::new();
            if *refresh {
                loader.refresh(&backend, *agent, provider.as_deref()).await;
            } else {
                loader.load(&backend, *agent, provider.as_deref()).await;
            }
            if let Some(e) = loader.error() {
                return Err(e.to_string());
            }
            let selected = loader.resolve_selection(None);
            for model in loader.models() {
                let marker = if selected.as_deref() == Some(model.id.as_str()) { "*" } else { " " };
                println!("{} {:<28} {}", marker, model.id, model.provider);
            }
        }
        Command::KeyBar { action } => run_key_bar(&cli, action)?,
    }
    Ok(())
}

async fn run_fallback(cli: &Cli, action: &FallbackAction) -> Result<(), String> {
    let mut store = loaded_config_store(cli).await?;
    let chain = store
        .fallback_chain()
        .ok_or_else(|| "No configuration loaded".to_string())?;

    let edited = match action {
        FallbackAction::List => {
            for (i, agent) in chain.agents().iter().enumerate() {
                let role = if i == 0 { " (primary)" } else { "" };
                println!("{}. {}{}", i, agent, role);
            }
            let addable = chain.addable();
            if !addable.is_empty() {
                println!("addable: {}", addable.join(", "));
            }
            return Ok(());
        }
        FallbackAction::Add { agent } => {
            agent.parse::<AgentType>()?;
            chain.append(agent)
        }
        FallbackAction::Remove { index } if !chain.can_remove(*index) => {
            return Err("The chain must keep at least one agent".to_string());
        }
        FallbackAction::Remove { index } => chain.remove(*index),
        FallbackAction::Up { index } => chain.move_up(*index),
        FallbackAction::Down { index } => chain.move_down(*index),
    };

    if edited == chain {
        println!("Chain unchanged");
        return Ok(());
    }
    store.update_fallback(&edited.to_partial());
    save_config_store(&mut store).await?;
    println!("{}", edited.agents().join(" -> "));
    Ok(())
}

async fn run_templates(cli: &Cli, action: &TemplateAction) -> Result<(), String> {
    let mut editor = TemplateEditor::new(backend(cli), cli.project.clone());
    let check = |editor: &TemplateEditor<Backend>| match editor.error() {
        Some(e) => Err(e.to_string()),
        None => Ok(()),
    };

    match action {
        TemplateAction::List => {
            editor.load_templates().await;
            check(&editor)?;
            for template in editor.templates() {
                println!("{:<24} {}", template.name, template.source);
            }
        }
        TemplateAction::Show { name } => {
            editor.select(name).await;
            check(&editor)?;
            println!("{}", editor.content());
        }
        TemplateAction::Preview { file } => {
            editor.set_content(read_input(file)?);
            match editor.run_preview().await {
                Some(PreviewOutcome::Rendered {
                    output,
                    variables_used,
                    variables_unused,
                }) => {
                    println!("{}", output);
                    eprintln!("used: {}", variables_used.join(", "));
                    eprintln!("unused: {}", variables_unused.join(", "));
                }
                Some(PreviewOutcome::Failed { message, line }) => {
                    return Err(match line {
                        Some(line) => format!("line {}: {}", line, message),
                        None => message.clone(),
                    });
                }
                None => {}
            }
        }
        TemplateAction::Save { name, file, scope } => {
            editor.set_content(read_input(file)?);
            editor.save_as(name, *scope).await;
            check(&editor)?;
            println!("Saved '{}' to {} scope", name, scope);
        }
        TemplateAction::Delete { name, scope } => {
            editor.delete(name, *scope).await;
            check(&editor)?;
            println!("Deleted '{}' from {} scope", name, scope);
        }
    }
    Ok(())
}

async fn run_commands(cli: &Cli, action: &CommandAction) -> Result<(), String> {
    let mut store = ChatCommandStore::new(backend(cli), cli.project.clone());
    store.load().await;
    if let Some(e) = store.error() {
        return Err(e.to_string());
    }

    match action {
        CommandAction::List => {
            for cmd in store.commands() {
                let flags = format!(
                    "{}{}",
                    if cmd.enabled { "" } else { " disabled" },
                    if cmd.favorite { " *" } else { "" }
                );
                println!("/{:<20} {:<8} {}{}", cmd.id, cmd.scope, cmd.label, flags);
            }
        }
        CommandAction::Create {
            id,
            label,
            description,
            template,
            scope,
        } => {
            let created = store
                .create(ChatCommandDraft {
                    id: id.clone(),
                    label: label.clone().unwrap_or_else(|| id.clone()),
                    description: description.clone(),
                    template: template.clone(),
                    scope: Some(*scope),
                })
                .await?;
            println!("Created /{}", created.id);
        }
        CommandAction::Delete { id } => {
            store.delete(id).await?;
            println!("Deleted /{}", id);
        }
        CommandAction::Reset { id } => {
            store.reset(id).await?;
            println!("Reset /{}", id);
        }
    }
    Ok(())
}

fn run_key_bar(cli: &Cli, action: &KeyBarAction) -> Result<(), String> {
    let mut store = KeyBarStore::load(storage(cli));
    match action {
        KeyBarAction::Show => {}
        KeyBarAction::Add { label } => store.append(label)?,
        KeyBarAction::Remove { index } => store.remove(*index)?,
        KeyBarAction::Up { index } => store.move_up(*index)?,
        KeyBarAction::Down { index } => store.move_down(*index)?,
        KeyBarAction::Reset => store.reset_layout()?,
        KeyBarAction::SavePreset { name } => {
            store.save_preset(name)?;
        }
        KeyBarAction::ApplyPreset { name } => {
            let id = store
                .find_preset(name)
                .map(|p| p.id)
                .ok_or_else(|| format!("No preset named '{}'", name))?;
            store.apply_preset(id)?;
        }
        KeyBarAction::DeletePreset { name } => {
            let id = store
                .find_preset(name)
                .map(|p| p.id)
                .ok_or_else(|| format!("No preset named '{}'", name))?;
            store.delete_preset(id)?;
        }
    }

    let labels: Vec<&str> = store.layout().iter().map(|k| k.label.as_str()).collect();
    println!("{}", labels.join("  "));
    if let Some(preset) = store.active_preset() {
        println!("preset: {}", preset.name);
    }
    let addable: Vec<String> = store.addable().into_iter().map(|k| k.label).collect();
    if !addable.is_empty() {
        println!("addable: {}", addable.join("  "));
    }
    Ok(())
}
