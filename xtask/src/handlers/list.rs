use crate::services::utils::{get_workspace_crates, render_crate_table};
use anyhow::Result;

const GROUPS: [(&str, &str); 4] = [
    ("Applications", "apps"),
    ("Features", "crates/features"),
    ("Shared", "crates/shared"),
    ("Infrastructure", "infra"),
];

/// Prints every workspace crate grouped by its top-level directory.
///
/// # Errors
/// Returns an error if a crate manifest cannot be read or parsed.
pub fn list_workspace() -> Result<()> {
    for (title, dir) in GROUPS {
        let crates = get_workspace_crates(dir)?;
        if !crates.is_empty() {
            render_crate_table(title, &crates);
        }
    }
    Ok(())
}
