use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Run a command and capture stdout, whatever the exit status
pub fn run_output(cmd: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    if !output.status.success() {
        log::debug!("{} {} exited with {}", cmd, args.join(" "), output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Check if a command exists
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Installed knife sub-commands, as listed by `knife -h`
pub fn knife_plugins() -> Result<Vec<String>> {
    if !command_exists("knife") {
        log::warn!("knife not found in PATH, no provider plugins are installed");
        return Ok(Vec::new());
    }
    let help = run_output("knife", &["-h"])?;
    let plugins = parse_plugins(&help);
    log::debug!("Found {} knife sub-commands", plugins.len());
    Ok(plugins)
}

fn parse_plugins(help: &str) -> Vec<String> {
    help.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("knife "))
        .map(String::from)
        .collect()
}
