use clap::Parser;
use sprintkit::{client::SandboxClient, config::Config};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Send a text message to one or more devices", long_about = None)]
struct Args {
    #[arg(long, env = "SPRINTKEY")]
    key: String,
    #[arg(long, env = "SPRINTSECRET", hide_env_values = true)]
    secret: String,
    #[arg(short, long)]
    message: String,
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

    match client.send_sms(&args.mdns, &args.message).await {
        Ok(sms) => {
            for result in sms.into_results() {
                println!(
                    "{}: {} (transaction {}, code {})",
                    result.mdn, result.status, result.tranno, result.gcode
                );
            }
        }
        Err(e) => {
            eprintln!("Error sending message: {e}");
            std::process::exit(1);
        }
    }
}
