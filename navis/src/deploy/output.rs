//! Environment URL resolution from deployment output

use tracing::{debug, error, warn};

use crate::deploy::artifacts::Artifacts;
use crate::deploy::context::OutputMode;
use crate::deploy::ident::InternalDeploymentId;

/// Resolve the environment URL a finished deployment script published.
///
/// Every failure here degrades to "no environment URL".
pub async fn resolve_environment_url(
    mode: OutputMode,
    id: &InternalDeploymentId,
    artifacts: &Artifacts,
) -> Option<String> {
    match mode {
        OutputMode::None => None,
        OutputMode::File => resolve_file(id, artifacts).await,
        OutputMode::Url => resolve_url(id, artifacts).await,
    }
}

async fn resolve_file(id: &InternalDeploymentId, artifacts: &Artifacts) -> Option<String> {
    match artifacts.output_dir().find_by_stem(id.as_str()).await {
        Ok(Some(file)) => {
            let name = file.name()?;
            debug!("Found deployment output {}", name);
            Some(artifacts.download_url(name))
        }
        Ok(None) => {
            debug!("No deployment output file for {}", id);
            None
        }
        Err(e) => {
            warn!("Cannot scan output directory: {}", e);
            None
        }
    }
}

async fn resolve_url(id: &InternalDeploymentId, artifacts: &Artifacts) -> Option<String> {
    let file = artifacts.output_file(id);
    if !file.exists().await {
        debug!("No deployment output file for {}", id);
        return None;
    }

    let url = match file.read_first_line().await {
        Ok(Some(line)) if !line.trim().is_empty() => Some(line.trim().to_string()),
        Ok(_) => {
            error!("No url, output file empty");
            None
        }
        Err(e) => {
            error!("Cannot open deployment output file: {}", e);
            None
        }
    };

    if let Err(e) = file.delete().await {
        warn!("Cannot remove deployment output file: {}", e);
    }

    url
}
