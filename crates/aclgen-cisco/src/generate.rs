//! Policy-file level entry points used by the command line.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use aclgen_policy::{load_policy, Policy, PolicyServices, StandardServices};

use crate::compiler::FilterCompiler;
use crate::config::GeneratorConfig;
use crate::error::{AclGenError, Result};
use crate::output::assemble;

/// File extension of generated configuration.
pub const OUTPUT_SUFFIX: &str = "acl";

/// Compiles and assembles a policy into configuration text.
pub fn render_policy(
    policy: &Policy,
    config: &GeneratorConfig,
    services: &dyn PolicyServices,
) -> Result<String> {
    let filters = FilterCompiler::new(config, services).compile(policy)?;
    Ok(assemble(&filters, services))
}

/// Renders the policy at `path` and returns the text, or `None` when no
/// filter in it targets the platform.
pub fn render_file(path: &Path, config: &GeneratorConfig) -> Result<Option<String>> {
    let policy = load_policy(path)?;
    if policy.filters_for(&config.platform).next().is_none() {
        info!(
            policy = %path.display(),
            platform = %config.platform,
            "no filters for platform, skipping"
        );
        return Ok(None);
    }

    let services = StandardServices::new(config.term_name_max_length);
    render_policy(&policy, config, &services).map(Some)
}

/// Output path for a policy file: `<output_dir>/<stem>.acl`.
pub fn output_path(policy_path: &Path, output_dir: &Path) -> PathBuf {
    let mut name = policy_path
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| policy_path.as_os_str().to_os_string());
    name.push(".");
    name.push(OUTPUT_SUFFIX);
    output_dir.join(name)
}

/// Renders the policy at `path` into `output_dir`.
///
/// Returns the written file, or `None` when the policy has nothing for the
/// platform.
pub fn generate_file(
    path: &Path,
    output_dir: &Path,
    config: &GeneratorConfig,
) -> Result<Option<PathBuf>> {
    let Some(text) = render_file(path, config)? else {
        return Ok(None);
    };

    let target = output_path(path, output_dir);
    fs::write(&target, text).map_err(|source| AclGenError::Io {
        path: target.clone(),
        source,
    })?;
    info!(policy = %path.display(), output = %target.display(), "wrote filter configuration");
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("policies/pol/edge.yaml"), Path::new("out")),
            PathBuf::from("out/edge.acl")
        );
        assert_eq!(
            output_path(Path::new("edge.v2.json"), Path::new(".")),
            PathBuf::from("./edge.v2.acl")
        );
    }
}
