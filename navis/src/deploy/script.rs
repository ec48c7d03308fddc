//! Deployment command execution

use std::path::PathBuf;
use std::process::ExitStatus;

use tokio::process::Command;
use tracing::info;

use crate::errors::NavisError;

pub const ENV_LOGFILE: &str = "NAVIS_LOGFILE";
pub const ENV_REF: &str = "NAVIS_REF";
pub const ENV_REPONAME: &str = "NAVIS_REPONAME";
pub const ENV_OUTPUTFILE: &str = "NAVIS_OUTPUTFILE";

/// Variables exported to a deployment command
#[derive(Debug, Clone)]
pub struct ScriptEnv {
    /// Absolute path of the deployment log
    pub log_file: PathBuf,

    pub git_ref: String,

    pub repository: String,

    /// Absolute path where the command may leave its output
    pub output_file: PathBuf,
}

impl ScriptEnv {
    fn vars(&self) -> [(&'static str, std::ffi::OsString); 4] {
        [
            (ENV_LOGFILE, self.log_file.clone().into_os_string()),
            (ENV_REF, self.git_ref.clone().into()),
            (ENV_REPONAME, self.repository.clone().into()),
            (ENV_OUTPUTFILE, self.output_file.clone().into_os_string()),
        ]
    }
}

/// Run `command` through `sh -c` and wait for it to exit. No timeout.
///
/// The variables are set on the child only; stdout and stderr are inherited.
pub async fn run_script(command: &str, env: &ScriptEnv) -> Result<ExitStatus, NavisError> {
    info!("Executing script...");

    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .envs(env.vars())
        .status()
        .await?;

    info!("Script exited with {}", status);
    Ok(status)
}
