use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    chirp::logging::init();
    chirp::run().await
}
