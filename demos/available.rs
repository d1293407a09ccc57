use clap::Parser;
use sprintkit::{client::SandboxClient, config::Config};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Check whether devices are reachable", long_about = None)]
struct Args {
    #[arg(long, env = "SPRINTKEY")]
    key: String,
    #[arg(long, env = "SPRINTSECRET", hide_env_values = true)]
    secret: String,
    #[arg(required = true)]
    mdns: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let client = SandboxClient::connect(Config::new(args.key, args.secret)).unwrap();

    for mdn in &args.mdns {
        match client.reachable(mdn).await {
            Ok(true) => println!("{mdn}: reachable"),
            Ok(false) => println!("{mdn}: unreachable"),
            Err(e) => eprintln!("{mdn}: {e}"),
        }
    }
}
