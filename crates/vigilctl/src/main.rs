//! Vigil Control - CLI client for the Vigil zone controller
//!
//! Issues mode-change requests and queries zone status over the control
//! socket.

mod rpc_client;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use vigil_common::ipc::{Method, ResponseData};

use rpc_client::RpcClient;

#[derive(Parser)]
#[command(name = "vigilctl")]
#[command(about = "Vigil - Security zone controller", long_about = None)]
#[command(version)]
struct Cli {
    /// Control socket path (defaults to $VIGILD_SOCKET or /run/vigil/vigil.sock)
    #[arg(long, global = true)]
    socket: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ArmMode {
    /// Full protection (all sensors)
    Full,
    /// Hull protection (perimeter only)
    Hull,
    /// Partial protection
    Partial,
}

impl ArmMode {
    fn code(self) -> u8 {
        match self {
            ArmMode::Full => 1,
            ArmMode::Hull => 2,
            ArmMode::Partial => 3,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Arm the zone in the given protection mode
    Arm {
        mode: ArmMode,

        /// Sender identification recorded in the protocol
        #[arg(long, default_value = "vigilctl")]
        sender: String,
    },

    /// Disarm the zone
    Disarm {
        /// Sender identification recorded in the protocol
        #[arg(long, default_value = "vigilctl")]
        sender: String,
    },

    /// Show the zone status
    Status,

    /// Check daemon availability
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut client = RpcClient::connect(cli.socket.as_deref()).await?;

    match cli.command {
        Commands::Arm { mode, sender } => {
            select_mode(&mut client, mode.code(), sender).await?;
        }
        Commands::Disarm { sender } => {
            select_mode(&mut client, 0, sender).await?;
        }
        Commands::Status => {
            let data = client.call(Method::Status).await?;
            if let ResponseData::Status(status) = data {
                println!("Zone:          {}", status.zone_name);
                println!("Mode:          {:?}", status.mode);
                println!("Arm state:     {:?}", status.arm_state);
                println!("Alarm state:   {:?}", status.alarm_state);
                println!("Door/window:   {}", open_text(status.door_window_open));
                if let Some(secs) = status.pending_activation_secs {
                    println!("Activation in: {}s", secs);
                }
            }
        }
        Commands::Ping => {
            client.call(Method::Ping).await?;
            println!("vigild is running");
        }
    }

    Ok(())
}

async fn select_mode(client: &mut RpcClient, mode: u8, sender: String) -> Result<()> {
    let data = client.call(Method::SelectMode { mode, sender }).await?;
    if let ResponseData::ModeResult { accepted } = data {
        if accepted {
            println!("OK");
        } else {
            println!("Rejected (maintenance, disabled mode or open sensors)");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn open_text(open: bool) -> &'static str {
    if open {
        "open"
    } else {
        "closed"
    }
}
