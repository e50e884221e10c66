#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = studyhall::run().await {
        eprintln!("studyhall fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
