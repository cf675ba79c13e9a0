use crate::services::utils::normalize_project_name;
use anyhow::{Context, bail};
use std::process::Command;

const NEXTEST_FLAGS: [&str; 6] =
    ["--failure-output", "immediate-final", "--success-output", "never", "--status-level", "skip"];

/// `--workspace` for `None` or `all`, otherwise `-p ocrhub-<project>`.
fn target_args(project: Option<&str>) -> Vec<String> {
    match project {
        None | Some("all") => vec!["--workspace".into()],
        Some(project) => vec!["-p".into(), normalize_project_name(project)],
    }
}

fn has_nextest() -> bool {
    Command::new("cargo-nextest").arg("--version").output().is_ok()
}

/// Runs tests in the workspace or a specific crate, through `cargo nextest` when installed.
///
/// # Errors
/// Returns an error if cargo cannot be spawned or a test fails.
pub fn run_tests(project: Option<&str>) -> anyhow::Result<()> {
    let nextest = has_nextest();
    let mut args: Vec<String> =
        if nextest { vec!["nextest".into(), "run".into()] } else { vec!["test".into()] };

    args.extend(target_args(project));
    args.push("--all-features".into());

    if nextest {
        args.extend(NEXTEST_FLAGS.into_iter().map(String::from));
    } else {
        args.extend(["--tests", "--lib", "--bins", "--", "-q"].into_iter().map(String::from));
    }

    println!("🧪 Running tests via '{}'...", if nextest { "nextest" } else { "cargo test" });
    let status = Command::new("cargo").args(&args).status().context("Failed to execute cargo")?;

    if !status.success() {
        bail!("Tests failed!");
    }
    Ok(())
}

/// Runs doc tests in the workspace or a specific crate.
///
/// # Errors
/// Returns an error if cargo cannot be spawned or a doc test fails.
pub fn run_doctests(project: Option<&str>) -> anyhow::Result<()> {
    let mut args: Vec<String> = vec!["test".into(), "--doc".into()];
    args.extend(target_args(project));

    println!("📚 Running doctests via 'cargo test --doc'...");
    let status = Command::new("cargo").args(&args).status().context("Failed to execute cargo")?;

    if !status.success() {
        bail!("Doc tests failed!");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_workspace_or_a_single_crate() {
        assert_eq!(target_args(None), ["--workspace"]);
        assert_eq!(target_args(Some("all")), ["--workspace"]);
        assert_eq!(target_args(Some("kernel")), ["-p", "ocrhub-kernel"]);
    }
}
