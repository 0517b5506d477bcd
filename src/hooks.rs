use std::path::Path;
use std::process::{Command, Stdio};

use log::warn;

use crate::error::{Error, Result};
use crate::prompt::Prompter;

/// What happened to one post-generation hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Succeeded(String),
    Failed(String),
    Skipped(String),
}

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut shell = Command::new("cmd");
        shell.args(["/C", command]);
        shell
    } else {
        let mut shell = Command::new("sh");
        shell.args(["-c", command]);
        shell
    }
}

/// Runs `command` through the platform shell, optionally inside `working_dir`.
///
/// Returns whether the command exited successfully.
pub fn run_command(command: &str, working_dir: Option<&Path>) -> Result<bool> {
    let mut child = shell_command(command);
    child.stdin(Stdio::inherit()).stdout(Stdio::inherit()).stderr(Stdio::inherit());

    if let Some(dir) = working_dir {
        if !dir.is_dir() {
            return Err(Error::HookError(format!(
                "directory does not exist: {}",
                dir.display()
            )));
        }
        println!("(in {})", dir.display());
        child.current_dir(dir);
    }

    println!("$ {command}");
    let status = child
        .status()
        .map_err(|e| Error::HookError(format!("failed to start '{command}': {e}")))?;

    if !status.success() {
        warn!("Command failed with status {status}: {command}");
    }
    Ok(status.success())
}

/// Offers each post-generation hook in order and runs the accepted ones in `project_dir`.
///
/// A failing hook is reported and the next one is still offered.
///
/// # Errors
/// Only a failure to ask for confirmation aborts; it usually means the input
/// stream is gone.
pub fn run_post_gen_hooks(
    prompter: &dyn Prompter,
    hooks: &[String],
    project_dir: &Path,
    skip_hooks_check: bool,
) -> Result<Vec<HookOutcome>> {
    let mut outcomes = Vec::with_capacity(hooks.len());

    for command in hooks {
        let accepted = skip_hooks_check || {
            println!("This template wants to run: \"{command}\"");
            prompter.confirm("Run it?", true)?
        };

        if !accepted {
            println!("Skipped: {command}");
            outcomes.push(HookOutcome::Skipped(command.clone()));
            continue;
        }

        match run_command(command, Some(project_dir)) {
            Ok(true) => outcomes.push(HookOutcome::Succeeded(command.clone())),
            Ok(false) => {
                prompter.notify(&format!("Hook command failed (continuing): {command}"));
                outcomes.push(HookOutcome::Failed(command.clone()));
            }
            Err(e) => {
                warn!("{e}");
                prompter.notify(&format!("Hook command failed (continuing): {command}: {e}"));
                outcomes.push(HookOutcome::Failed(command.clone()));
            }
        }
    }

    Ok(outcomes)
}
