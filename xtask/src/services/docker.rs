use crate::services::utils::get_project_root;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug)]
pub struct DockerCompose {
    file_path: String,
}

const COMPOSE_FILE: &str = "ops/docker/ocrhub/docker-compose.yml";

impl Default for DockerCompose {
    /// Resolves the compose file against the workspace root, so any working directory works.
    fn default() -> Self {
        let file_path = get_project_root().map_or_else(
            |_| COMPOSE_FILE.to_owned(),
            |root| root.join(COMPOSE_FILE).display().to_string(),
        );
        Self { file_path }
    }
}

impl DockerCompose {
    /// Compose helper for the service stack in `ops/docker/ocrhub`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the compose file path.
    pub fn with_file_path(path: impl Into<String>) -> Self {
        Self { file_path: path.into() }
    }

    /// Run a docker-compose command
    ///
    /// # Errors
    /// Returns an error if the compose file is missing or the command fails.
    pub fn run(&self, args: &[&str]) -> Result<()> {
        if !Path::new(&self.file_path).exists() {
            anyhow::bail!("Docker compose file not found at: {}", self.file_path);
        }

        let status = Command::new("docker")
            .arg("compose")
            .arg("-f")
            .arg(&self.file_path)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(
                || "Failed to execute docker command. Is Docker installed and in your PATH?",
            )?;

        if !status.success() {
            anyhow::bail!("Docker command failed with status: {status}");
        }

        Ok(())
    }

    /// Builds the image and starts the service in the background.
    ///
    /// # Errors
    /// Returns an error if the Docker Compose command fails.
    pub fn up(&self) -> Result<()> {
        println!("🚀 Building and starting the OCR service...");
        self.run(&["up", "-d", "--build", "--remove-orphans"])
    }

    /// Stops the service, optionally dropping its volumes.
    ///
    /// # Errors
    /// Returns an error if the Docker Compose command fails.
    pub fn down(&self, volumes: bool) -> Result<()> {
        println!("🛑 Stopping the OCR service...");
        let mut args = vec!["down"];
        if volumes {
            args.push("-v");
        }
        self.run(&args)
    }

    /// Shows container state, including the health check result.
    ///
    /// # Errors
    /// Returns an error if the Docker Compose command fails.
    pub fn status(&self) -> Result<()> {
        self.run(&["ps", "--format", "table {{.Service}}\t{{.Status}}\t{{.Ports}}"])
    }

    /// Streams logs for a specific service or all services.
    ///
    /// # Errors
    /// Returns an error if the Docker Compose command fails.
    pub fn logs(&self, service: Option<&str>) -> Result<()> {
        let mut args = vec!["logs", "-f"];
        if let Some(s) = service {
            args.push(s);
        }
        self.run(&args)
    }
}

#[test]
fn default_compose_file_is_in_the_workspace() {
    let docker = DockerCompose::new();
    assert!(docker.file_path.ends_with(COMPOSE_FILE));
    assert!(Path::new(&docker.file_path).exists());
}

#[test]
fn docker_compose_file_missing_is_reported() {
    let docker = DockerCompose::with_file_path("non-existent.yml");
    let err = docker.run(&["config"]).unwrap_err();
    assert!(err.to_string().contains("not found"), "expected missing file error, got: {err}");
}
