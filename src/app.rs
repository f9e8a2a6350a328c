/// Start the extractor service with settings from `snextract.toml` and the environment
pub async fn run() -> std::io::Result<()> {
    crate::infrastructure::bootstrap::setup().await
}
