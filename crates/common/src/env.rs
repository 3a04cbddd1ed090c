use tracing::info;

/// Ensure runtime directories exist before the server starts accepting
/// uploads; creating them lazily per-request races under load.
pub async fn ensure_dirs(dirs: &[&str]) -> anyhow::Result<()> {
    for dir in dirs {
        if tokio::fs::metadata(dir).await.is_err() {
            tokio::fs::create_dir_all(dir).await?;
            info!(dir, "created runtime directory");
        }
    }
    Ok(())
}
