//! `systemctl`-backed [`ServiceManager`].

use std::ffi::OsString;
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use unitsync_core::UnitName;

use crate::{ControlError, ServiceManager};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which systemd instance to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SystemctlScope {
    #[default]
    System,
    /// The calling user's manager (`systemctl --user`).
    User,
}

#[derive(Debug, Clone)]
pub struct Systemctl {
    program: OsString,
    scope: SystemctlScope,
    timeout: Duration,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Systemctl {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: OsString::from("systemctl"),
            scope: SystemctlScope::System,
            timeout,
        }
    }

    pub fn with_scope(mut self, scope: SystemctlScope) -> Self {
        self.scope = scope;
        self
    }

    /// Run a different executable in place of `systemctl` (same argv shape).
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        if self.scope == SystemctlScope::User {
            cmd.arg("--user");
        }
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut rendered = self.program.to_string_lossy().into_owned();
        if self.scope == SystemctlScope::User {
            rendered.push_str(" --user");
        }
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    async fn exec(&self, args: &[&str]) -> Result<(), ControlError> {
        let command = self.describe(args);
        let output = self
            .command(args)
            .output()
            .await
            .map_err(|source| ControlError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{} {}", stdout.trim(), stderr.trim());
        let status = output.status.to_string();
        let message = match combined.trim() {
            "" => status.clone(),
            text => text.to_string(),
        };
        Err(ControlError::Failed {
            command,
            status,
            message,
        })
    }

    /// `is-active --quiet`: exit status zero means active.
    async fn is_active(&self, unit: &UnitName) -> Result<bool, ControlError> {
        let args = ["is-active", "--quiet", unit.as_str()];
        let status = self
            .command(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| ControlError::Spawn {
                command: self.describe(&args),
                source,
            })?;
        Ok(status.success())
    }

    async fn bounded<T, F>(&self, label: String, call: F) -> Result<T, ControlError>
    where
        F: Future<Output = Result<T, ControlError>>,
    {
        bounded(self.timeout, label, call).await
    }
}

/// Abandon `call` once `timeout` elapses. Dropping the future kills any
/// child process it spawned.
pub(crate) async fn bounded<T, F>(
    timeout: Duration,
    label: String,
    call: F,
) -> Result<T, ControlError>
where
    F: Future<Output = Result<T, ControlError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ControlError::Timeout {
            command: label,
            after: timeout,
        }),
    }
}

#[async_trait]
impl ServiceManager for Systemctl {
    async fn ensure_running(&self, unit: &UnitName) -> Result<bool, ControlError> {
        let label = self.describe(&["start", unit.as_str()]);
        self.bounded(label, self.start_if_inactive(unit)).await
    }

    async fn ensure_stopped(&self, unit: &UnitName) -> Result<bool, ControlError> {
        let label = self.describe(&["stop", unit.as_str()]);
        self.bounded(label, self.stop_if_active(unit)).await
    }

    async fn restart(&self, unit: &UnitName) -> Result<(), ControlError> {
        let label = self.describe(&["restart", unit.as_str()]);
        self.bounded(label, self.reload_and_restart(unit)).await
    }
}

impl Systemctl {
    async fn start_if_inactive(&self, unit: &UnitName) -> Result<bool, ControlError> {
        if self.is_active(unit).await? {
            tracing::debug!(unit = %unit, "already active");
            return Ok(false);
        }
        self.exec(&["start", unit.as_str()]).await?;
        Ok(true)
    }

    async fn stop_if_active(&self, unit: &UnitName) -> Result<bool, ControlError> {
        if !self.is_active(unit).await? {
            tracing::debug!(unit = %unit, "already inactive");
            return Ok(false);
        }
        self.exec(&["stop", unit.as_str()]).await?;
        Ok(true)
    }

    async fn reload_and_restart(&self, unit: &UnitName) -> Result<(), ControlError> {
        self.exec(&["daemon-reload"]).await?;
        self.exec(&["restart", unit.as_str()]).await
    }
}
