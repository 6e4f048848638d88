//! Command dispatch: one function per subcommand

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::MenuService;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{locate_or_err, LinkTarget, NodePatch};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Run the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = load_settings(cli)?;
    if let Commands::Config { command } = command {
        return run_config(command, &settings);
    }

    let container = ServiceContainer::new(settings);
    let mut service = container.menu_service()?;
    report_diagnostics(&service);

    match command {
        Commands::Tree => run_tree(&service, &container),
        Commands::Flatten { write } => run_flatten(&mut service, *write),
        Commands::Locate { id } => run_locate(&service, id),
        Commands::Add {
            label,
            link,
            parent,
        } => {
            let link = link
                .to_link()
                .ok_or_else(|| CliError::InvalidArgs("--content or --url required".into()))?;
            run_add(&mut service, label, link, parent.as_deref())
        }
        Commands::Edit { id, label, link } => {
            let patch = NodePatch {
                label: label.clone(),
                link: link.to_link(),
            };
            run_edit(&mut service, id, patch)
        }
        Commands::Remove { id } => run_remove(&mut service, id),
        Commands::Move {
            id,
            parent,
            position,
        } => run_move(&mut service, id, parent.as_deref(), *position),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?;
    let mut settings = Settings::load(Some(cwd.as_path()))?;
    if let Some(file) = &cli.file {
        settings.menu_file = file.clone();
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn report_diagnostics(service: &MenuService) {
    for diagnostic in service.diagnostics() {
        output::warning(diagnostic);
    }
}

#[instrument(level = "debug", skip_all)]
fn run_tree(service: &MenuService, container: &ServiceContainer) -> CliResult<()> {
    let title = container.settings.menu_file.display().to_string();
    output::info(&service.forest().to_tree_string(&title));
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn run_flatten(service: &mut MenuService, write: bool) -> CliResult<()> {
    if write {
        let forest = service.forest().clone();
        service.rearrange(forest)?;
        output::success(&format!("normalized {} entries", service.flat().len()));
        return Ok(());
    }
    let json = serde_json::to_string_pretty(service.flat())
        .map_err(|e| InfraError::format("menu records", e))?;
    output::info(&json);
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn run_locate(service: &MenuService, id: &str) -> CliResult<()> {
    let path = locate_or_err(service.forest(), id)?;
    output::info(&path);
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn run_add(
    service: &mut MenuService,
    label: &str,
    link: LinkTarget,
    parent: Option<&str>,
) -> CliResult<()> {
    let id = service.add_node(label, link, parent)?;
    output::success(&format!("added {}", id));
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn run_edit(service: &mut MenuService, id: &str, patch: NodePatch) -> CliResult<()> {
    if patch.is_empty() {
        return Err(CliError::Usage(
            "nothing to change: pass --label, --content or --url".to_string(),
        ));
    }
    service.edit_node(id, patch)?;
    output::success(&format!("updated {}", id));
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn run_remove(service: &mut MenuService, id: &str) -> CliResult<()> {
    let removed = locate_or_err(service.forest(), id)
        .ok()
        .and_then(|path| service.forest().resolve(&path).map(|n| n.subtree_size()))
        .unwrap_or(0);
    service.remove_node(id)?;
    output::success(&format!("removed {} ({} entries)", id, removed));
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn run_move(
    service: &mut MenuService,
    id: &str,
    parent: Option<&str>,
    position: Option<usize>,
) -> CliResult<()> {
    service.move_node(id, parent, position)?;
    let path = locate_or_err(service.forest(), id)?;
    output::success(&format!("moved {} to {}", id, path));
    Ok(())
}

fn run_config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::detail("global: (no config directory)"),
            }
            let cwd =
                std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?;
            output::detail(&format!("local:  {}", local_config_path(&cwd).display()));
        }
    }
    Ok(())
}
