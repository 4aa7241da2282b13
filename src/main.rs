use lambda_pack::cli::CliHandler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = CliHandler::new().run().await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
