use crate::models::args::DevAction;
use crate::services::docker::DockerCompose;
use anyhow::Result;

/// Starts, stops or tails the containerized OCR service.
///
/// # Errors
/// Returns an error if the Docker Compose command fails.
pub fn handle_dev_command(action: DevAction) -> Result<()> {
    let docker = DockerCompose::new();

    match action {
        DevAction::Up {} => {
            docker.up()?;
            println!("\n✨ OCR service is starting.");
            println!("🔗 API:    http://localhost:8501");
            println!("📖 Docs:   http://localhost:8501/api");
            println!("🩺 Health: http://localhost:8501/health");
        },
        DevAction::Down { volumes } => {
            docker.down(volumes)?;
        },
        DevAction::Status {} => {
            docker.status()?;
        },
        DevAction::Logs { service } => {
            docker.logs(service.as_deref())?;
        },
    }

    Ok(())
}
