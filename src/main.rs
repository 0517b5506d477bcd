//! cpp-hub's main application entry point and orchestration logic.
//! Handles command-line argument parsing and dispatches to the command handlers.

use std::env;
use std::path::{Path, PathBuf};

use cpp_hub::{
    cli::{get_args, Args, Command, NewArgs},
    collector::collect_values,
    config::{version, HubConfig},
    error::{default_error_handler, Error, Result},
    generator::{default_target_dir, generate_project, lint_template},
    hooks::run_post_gen_hooks,
    loader::load_template,
    logger::init_logger,
    manifest::{load_manifest, manifest_path},
    overlay::OverlayOutcome,
    prompt::{DialoguerPrompter, Prompter},
    registry::{table_header, Registry, TemplateInfo},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let config = HubConfig::from_env()?;
    match args.command {
        Command::New(new_args) => handle_new(&config, &new_args),
        Command::Validate { path } => handle_validate(&path),
        Command::Search { query } => handle_search(&config, &query.join(" ")),
        Command::List { tag } => handle_list(&config, tag.as_deref().unwrap_or_default()),
        Command::Update => handle_update(&config),
        Command::Version => handle_version(&config),
    }
}

/// Asks for the project directory, offering `default_target`.
fn prompt_target_dir(prompter: &dyn Prompter, cwd: &Path, default_target: PathBuf) -> Result<PathBuf> {
    let answer = prompter
        .read_line(&format!("Target directory [{}]:", default_target.display()))
        .map_err(|e| Error::PromptError(format!("aborted: {e}")))?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default_target);
    }
    Ok(cwd.join(answer))
}

/// Generation flow:
/// 1. Resolves the template root from the registry, a git URL or a local path
/// 2. Loads the manifest
/// 3. Collects variable values
/// 4. Renders the base tree and the matching overlays
/// 5. Offers the post-generation hooks
fn handle_new(config: &HubConfig, args: &NewArgs) -> Result<()> {
    let prompter = DialoguerPrompter::new();
    let source = args
        .source()
        .ok_or_else(|| Error::PromptError("missing <template-id>, --git or --path".to_string()))?;

    let cwd = env::current_dir()?;
    let output = args.output.as_ref().map(|output| cwd.join(output));
    if let Some(output) = output.as_ref().filter(|output| output.exists()) {
        return Err(Error::DestinationExistsError { path: output.display().to_string() });
    }

    let template_root = load_template(&source, config)?;
    let manifest = load_manifest(manifest_path(&template_root))?;
    let values = collect_values(&manifest, &prompter, args.defaults)?;

    let project_root = match output {
        Some(output) => output,
        None => {
            let default_target = default_target_dir(&cwd, &manifest, &values);
            if args.defaults {
                default_target
            } else {
                prompt_target_dir(&prompter, &cwd, default_target)?
            }
        }
    };

    let report = generate_project(&template_root, &manifest, &values, &project_root)?;
    for overlay in &report.overlays {
        match overlay {
            OverlayOutcome::Applied { source, files } => {
                println!("Applied overlay from {} ({} files)", source.display(), files.len())
            }
            OverlayOutcome::Missing { source } => {
                eprintln!("Warning: overlay path does not exist: {}", source.display())
            }
        }
    }
    println!("Project generated at: {}", report.project_root.display());

    run_post_gen_hooks(
        &prompter,
        &manifest.post_gen_hooks,
        &report.project_root,
        args.skip_hooks_check,
    )?;
    Ok(())
}

fn handle_validate(path: &Path) -> Result<()> {
    match load_manifest(manifest_path(path)) {
        Ok(manifest) => {
            println!("Template manifest is valid.");
            for warning in lint_template(path, &manifest) {
                println!("Warning: {warning}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Template manifest is invalid: {e}");
            std::process::exit(1);
        }
    }
}

fn print_templates(templates: &[&TemplateInfo]) {
    println!("{}", table_header());
    for info in templates {
        println!("{}", info.table_row());
    }
}

fn handle_search(config: &HubConfig, query: &str) -> Result<()> {
    let mut registry = Registry::new(config);
    registry.ensure_initialized()?;

    let matches = registry.search(query);
    if matches.is_empty() {
        println!("No templates matched query: {query}");
        return Ok(());
    }
    print_templates(&matches);
    Ok(())
}

fn handle_list(config: &HubConfig, tag: &str) -> Result<()> {
    let mut registry = Registry::new(config);
    registry.ensure_initialized()?;

    let matches = registry.with_tag(tag);
    if matches.is_empty() {
        if tag.is_empty() {
            println!("No templates in registry.");
        } else {
            println!("No templates with tag '{tag}'.");
        }
        return Ok(());
    }
    print_templates(&matches);
    Ok(())
}

fn handle_update(config: &HubConfig) -> Result<()> {
    let mut registry = Registry::new(config);
    registry.update()?;
    println!("Registry updated. Templates: {}", registry.templates().len());
    Ok(())
}

fn handle_version(config: &HubConfig) -> Result<()> {
    println!("cpp-hub version {}", version());

    let mut registry = Registry::new(config);
    let exists = registry.path().exists();
    println!(
        "Registry path: {} ({})",
        registry.path().display(),
        if exists { "exists" } else { "not initialized" }
    );

    // Best effort: a broken index does not make `version` fail.
    if exists && registry.reload().is_ok() && !registry.name().is_empty() {
        println!("Registry name: {}", registry.name());
    }
    Ok(())
}
