use clap::Parser;
use sprintkit::{client::SandboxClient, config::Config, geo::Coordinates};
use sprintkit::protocol::v1::types::Perimeter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Check devices against a circular perimeter", long_about = None)]
struct Args {
    #[arg(long, env = "SPRINTKEY")]
    key: String,
    #[arg(long, env = "SPRINTSECRET", hide_env_values = true)]
    secret: String,
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    /// Radius in meters
    #[arg(short, long, default_value = "2000")]
    radius: u32,
    #[arg(required = true)]
    mdns: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let center = match Coordinates::new(args.lat, args.lon) {
        Ok(center) => center,
        Err(e) => {
            eprintln!("Invalid perimeter center: {e}");
            std::process::exit(2);
        }
    };
    let perimeter = Perimeter::new(center, args.radius);
    let client = SandboxClient::connect(Config::new(args.key, args.secret)).unwrap();

    for mdn in &args.mdns {
        match client.check_perimeter(mdn, &perimeter).await {
            Ok((inside, fix)) => {
                let distance = perimeter.distance_to(fix.coordinates());
                let place = if inside { "inside" } else { "outside" };
                println!("{mdn}: {place}, {distance} m from center\n{fix}");
            }
            Err(e) => eprintln!("{mdn}: {e}"),
        }
    }
}
