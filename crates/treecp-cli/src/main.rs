//! treecp - concurrent recursive tree copy

#[tokio::main]
async fn main() {
    std::process::exit(treecp_cli::run(std::env::args_os()).await);
}
