use anyhow::Context;
use serde::Deserialize;

/// Crates the domain crate must never depend on. It stays a pure
/// vocabulary crate with no runtime, randomness or async machinery.
const DOMAIN_FORBIDDEN: &[&str] = &["tokio", "tokio-util", "async-trait", "rand", "tracing"];

const DOMAIN_CRATE: &str = "truthdare-domain";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check"),
    }
}

#[derive(Debug, Deserialize)]
struct Metadata {
    packages: Vec<Package>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Deserialize)]
struct Dependency {
    name: String,
    /// `null` for normal dependencies, `"dev"` or `"build"` otherwise
    kind: Option<String>,
}

fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed")
    }

    let metadata: Metadata =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata")?;
    let violations = domain_violations(&metadata)?;
    if !violations.is_empty() {
        anyhow::bail!(
            "{DOMAIN_CRATE} must not depend on: {}",
            violations.join(", ")
        );
    }

    println!("arch-check: ok");
    Ok(())
}

fn domain_violations(metadata: &Metadata) -> anyhow::Result<Vec<String>> {
    let domain = metadata
        .packages
        .iter()
        .find(|package| package.name == DOMAIN_CRATE)
        .with_context(|| format!("{DOMAIN_CRATE} not found in workspace"))?;

    Ok(domain
        .dependencies
        .iter()
        .filter(|dep| dep.kind.as_deref() != Some("dev"))
        .filter(|dep| DOMAIN_FORBIDDEN.contains(&dep.name.as_str()))
        .map(|dep| dep.name.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(deps: &str) -> Metadata {
        let raw = format!(
            r#"{{ "packages": [
                {{ "name": "truthdare-domain", "dependencies": {deps} }},
                {{ "name": "truthdare-engine", "dependencies": [ {{ "name": "tokio", "kind": null }} ] }}
            ] }}"#
        );
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn pure_domain_passes() {
        let metadata = metadata(
            r#"[ { "name": "serde", "kind": null }, { "name": "tokio", "kind": "dev" } ]"#,
        );
        assert!(domain_violations(&metadata).unwrap().is_empty());
    }

    #[test]
    fn runtime_dependency_is_reported() {
        let metadata = metadata(r#"[ { "name": "rand", "kind": null } ]"#);
        assert_eq!(domain_violations(&metadata).unwrap(), vec!["rand"]);
    }
}
