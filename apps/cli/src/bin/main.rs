use clap::Parser;
use delegate_cli::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::parse();
    app.init_tracing();
    app.run().await
}
