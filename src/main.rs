mod analytics;
mod catalog;
mod cli;
mod config;
mod error;
mod events;
mod model;
mod mood;
mod report;
mod storage;
mod store;

use clap::Parser;

use cli::Args;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = cli::run(args) {
        eprintln!("❌ Erro: {}", e);
        std::process::exit(1);
    }
}
