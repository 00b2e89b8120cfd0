use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use routeguide::client::demo;
use routeguide::client::{CliArgs, CliCommand, ConnectOptions, GuideClient, OutputFormatter};
use routeguide::pb::Point;
use routeguide::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse_args();

    // 验证参数
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let options = ConnectOptions {
        server_addr: args.server_addr.clone(),
        tls: args.tls,
        ca_file: args.ca_file.clone(),
        server_host_override: args.server_host_override.clone(),
        timeout: Duration::from_secs(args.timeout),
    };

    println!("{}", OutputFormatter::format_connecting_message(&options.server_addr));
    let mut client = match GuideClient::connect(&options).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", OutputFormatter::format_error(&e));
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(&mut client, &args.command).await {
        eprintln!("{}", OutputFormatter::format_error(&e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run_command(client: &mut GuideClient, command: &CliCommand) -> Result<()> {
    match command {
        CliCommand::Feature {
            latitude,
            longitude,
        } => {
            let point = Point::new(*latitude, *longitude);
            println!("Getting feature for point{}", OutputFormatter::format_point(&point));

            let feature = client.get_feature(point).await?;
            println!("{}", OutputFormatter::format_feature(&feature));
        }
        CliCommand::List { .. } => {
            let rect = command
                .rectangle()
                .ok_or("list command without a rectangle")?;
            println!(
                "Looking for features within {}",
                OutputFormatter::format_rectangle(&rect)
            );

            let mut features = client.list_features(rect).await?;
            let mut count = 0;
            while let Some(feature) = features.message().await? {
                println!("{}", OutputFormatter::format_feature(&feature));
                count += 1;
            }
            println!("{} features", count);
        }
        CliCommand::Record { points, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            let route = demo::random_route(&mut rng, *points);
            println!("Traversing {} points", route.len());

            let summary = client.record_route(route).await?;
            println!("{}", OutputFormatter::format_summary(&summary));
        }
        CliCommand::Chat => {
            let mut replies = client.route_chat(demo::chat_script()).await?;
            while let Some(note) = replies.message().await? {
                println!("{}", OutputFormatter::format_note(&note));
            }
        }
        CliCommand::Echo { count } => {
            let answers = client.conversations(demo::questions(*count)).await?;
            for answer in answers {
                println!("{}", OutputFormatter::format_answer(&answer));
            }
        }
    }

    Ok(())
}
