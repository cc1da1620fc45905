use std::error::Error;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use hyperion_remote::common::error::{ErrorCode, RemoteError};
use hyperion_remote::common::logger::init_logger;
use hyperion_remote::common::setting::AppConfig;
use hyperion_remote::controller::{build_controller, RemoteController};
use hyperion_remote::entity::bo::color_bo::ColorBo;
use hyperion_remote::entity::bo::transform_bo::TransformAdjustmentBo;
use hyperion_remote::entity::dto::server_descriptor_dto::ServerDescriptorDto;
use hyperion_remote::network::{default_discovery, InterfaceDiscovery};
use hyperion_remote::server_control::ServerControlEvent;
use hyperion_remote::settings::SettingsEvent;
use hyperion_remote::{debug, info};

const LOG_TAG: &str = "main";

/// Remote control for hyperion servers
#[derive(Parser, Debug)]
#[command(name = "hyperion-remote")]
#[command(about = "Control hyperion servers over the json protocol")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the known servers
    Servers {
        #[command(subcommand)]
        action: ServersAction,
    },
    /// Set a static color on the selected server
    Color {
        r: f64,
        g: f64,
        b: f64,
        /// Seconds, defaults to the duration stored with the server
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Clear the priority of this remote
    Clear,
    /// Clear every priority
    Clearall,
    /// List the effects of the selected server
    Effects,
    /// Run an effect by name
    Effect { name: String },
    /// Adjust the color transform, e.g. `transform gamma r 2.2` or `transform valueGain 1.1`
    Transform {
        kind: String,
        /// `[channel] <value>`
        #[arg(num_args = 1..=2, required = true, allow_negative_numbers = true)]
        values: Vec<String>,
    },
    /// Print the server info of the selected server
    Info,
    /// Print the local ipv4 interfaces
    Interfaces,
    /// Scan the local subnets for servers and add them
    Scan,
}

#[derive(Subcommand, Debug)]
enum ServersAction {
    List,
    Add {
        address: String,
        port: Option<u16>,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        priority: Option<i32>,
        /// Color duration in seconds
        #[arg(long)]
        duration: Option<u64>,
    },
    Select { index: usize },
    Remove { index: usize },
}

fn print_settings_events(mut rx: UnboundedReceiver<SettingsEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                SettingsEvent::Error(e) => eprintln!("settings error: {}", e.msg),
                SettingsEvent::ServerAdded(s) => println!("server added: {}:{}", s.address, s.port),
                other => debug!(LOG_TAG, "settings event: {:?}", other),
            }
        }
    })
}

fn print_control_events(
    mut rx: UnboundedReceiver<ServerControlEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ServerControlEvent::Connected => println!("connected"),
                ServerControlEvent::Error(e) => eprintln!("error: {}", e.msg),
                ServerControlEvent::MalformedResponse(msg) => eprintln!("malformed response: {msg}"),
                other => debug!(LOG_TAG, "session event: {:?}", other),
            }
        }
    })
}

fn print_servers(controller: &RemoteController) {
    for (index, server) in controller.settings().servers().iter().enumerate() {
        let mark = if server.is_selected() { "*" } else { " " };
        println!(
            "{} {} {}:{} priority={} name={}",
            mark, index, server.address, server.port, server.priority, server.name
        );
    }
}

fn transform_adjustment(kind: &str, values: &[String]) -> Result<TransformAdjustmentBo, RemoteError> {
    let invalid = || RemoteError::new(ErrorCode::UnknownError, "Invalid transform arguments");
    let (channel, value) = match values {
        [value] => (None, value),
        [channel, value] => (Some(channel.as_str()), value),
        _ => return Err(invalid()),
    };
    let value: f64 = value.parse().map_err(|_| invalid())?;
    TransformAdjustmentBo::parse(kind, channel, value).ok_or_else(invalid)
}

async fn run(
    command: Command,
    controller: &mut RemoteController,
    config: &AppConfig,
) -> Result<(), RemoteError> {
    match command {
        Command::Servers { action } => {
            controller.load().await?;
            match action {
                ServersAction::List => {}
                ServersAction::Add {
                    address,
                    port,
                    name,
                    priority,
                    duration,
                } => {
                    let mut server = ServerDescriptorDto::new(
                        &name,
                        &address,
                        port.unwrap_or(config.server.default_port),
                        priority.unwrap_or(config.server.default_priority),
                    );
                    server.duration = duration;
                    controller.add_server(server).await?;
                }
                ServersAction::Select { index } => controller.select_server(index).await?,
                ServersAction::Remove { index } => controller.remove_server(index).await?,
            }
            print_servers(controller);
        }
        Command::Color { r, g, b, duration } => {
            controller.load().await?;
            controller.set_color(&ColorBo::new(r, g, b), duration).await?;
        }
        Command::Clear => {
            controller.load().await?;
            controller.clear().await?;
        }
        Command::Clearall => {
            controller.load().await?;
            controller.clearall().await?;
        }
        Command::Effects => {
            controller.init().await?;
            for effect in controller.effects() {
                println!("{}", effect.name);
            }
        }
        Command::Effect { name } => {
            controller.load().await?;
            controller.run_effect(&name).await?;
        }
        Command::Transform { kind, values } => {
            let adjustment = transform_adjustment(&kind, &values)?;
            controller.load().await?;
            controller.adjust_transform(&adjustment).await?;
        }
        Command::Info => {
            controller.init().await?;
            if let Some(server) = controller.settings().selected_server() {
                println!("server: {} {}:{}", server.name, server.address, server.port);
            }
            let effects: Vec<&str> = controller.effects().iter().map(|e| e.name.as_str()).collect();
            println!("effects: {}", effects.join(", "));
            if let Some(transform) = controller.transform() {
                println!("transform: {}", transform);
            }
        }
        Command::Interfaces => {
            for ip in default_discovery().get_local_interfaces().await? {
                println!("{ip}");
            }
        }
        Command::Scan => {
            controller.load().await?;
            let found = controller.detect_servers().await?;
            info!(LOG_TAG, "{} servers found", found.len());
            print_servers(controller);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env is optional
    dotenv().ok();

    let config = AppConfig::get();
    init_logger()?;
    debug!(LOG_TAG, "config loaded, env: {}", config.env.env);

    let args = Args::parse();

    let (settings_tx, settings_rx) = unbounded_channel();
    let (control_tx, control_rx) = unbounded_channel();
    let settings_printer = print_settings_events(settings_rx);
    let control_printer = print_control_events(control_rx);

    let mut controller = build_controller(config, settings_tx, control_tx);
    let result = run(args.command, &mut controller, config).await;

    // closes the event channels so the printers drain and stop
    drop(controller);
    let _ = settings_printer.await;
    let _ = control_printer.await;

    result?;
    Ok(())
}
