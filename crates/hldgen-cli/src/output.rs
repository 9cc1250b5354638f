use hldgen_core::Outcome;
use serde::Serialize;
use std::path::Path;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// One line per generated artifact, paths shown relative to `root` when
/// they live under it.
pub fn print_outcomes(root: &Path, outcomes: &[Outcome], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&outcomes);
    }
    for outcome in outcomes {
        let path = outcome.path();
        let shown = path.strip_prefix(root).unwrap_or(path);
        match outcome {
            Outcome::Written { .. } => println!("  created: {}", shown.display()),
            Outcome::Skipped { .. } => println!("  exists:  {}", shown.display()),
        }
    }
    Ok(())
}
