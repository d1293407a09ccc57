use clap::Parser;
use sprintkit::{client::SandboxClient, config::Config};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Locate devices through the Sandbox", long_about = None)]
struct Args {
    #[arg(long, env = "SPRINTKEY")]
    key: String,
    #[arg(long, env = "SPRINTSECRET", hide_env_values = true)]
    secret: String,
    #[arg(long)]
    host: Option<String>,
    /// MDNs of the devices to locate
    #[arg(required = true)]
    mdns: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = Config::new(args.key, args.secret);
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    let client = SandboxClient::connect(config).unwrap();

    for mdn in &args.mdns {
        match client.locate(mdn).await {
            Ok(fix) => println!("{mdn}\n{fix}"),
            Err(e) => eprintln!("{mdn}: {e}"),
        }
    }
}
