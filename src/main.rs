use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    alpha_insights::cli::run_cli().await
}
