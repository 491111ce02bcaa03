use anyhow::Context;
use clap::Parser;

use camsync::{DEFAULT_PORT, Instruction, InstructionQueue, MergeableState, SyncClient};

#[derive(Parser)]
#[command(name = "camsync-remote")]
#[command(about = "Send camera instructions to a camsync server")]
struct Args {
    #[arg(
        short,
        long,
        help = "Server address to connect to (e.g., 127.0.0.1:42511)"
    )]
    server: Option<String>,

    #[arg(long, help = "Camera channel id (defaults to the id of the server snapshot)")]
    id: Option<u32>,

    #[arg(long, help = "Send every instruction in its own update")]
    split: bool,

    #[arg(
        value_name = "INSTRUCTION",
        help = "move:x,y,z | turn:angle | pitch:angle (radians)",
        allow_hyphen_values = true
    )]
    instructions: Vec<Instruction>,
}

fn build_updates(id: u32, instructions: &[Instruction], split: bool) -> Vec<InstructionQueue> {
    if instructions.is_empty() {
        return Vec::new();
    }
    if split {
        instructions
            .iter()
            .map(|i| InstructionQueue::with_instructions(id, [*i]))
            .collect()
    } else {
        vec![InstructionQueue::with_instructions(id, instructions.iter().copied())]
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let addr = args
        .server
        .unwrap_or_else(|| format!("127.0.0.1:{}", DEFAULT_PORT));

    let mut client =
        SyncClient::connect(addr.as_str()).with_context(|| format!("connecting to {}", addr))?;
    let snapshot: InstructionQueue = client
        .receive_snapshot()
        .context("reading server snapshot")?;
    log::info!("Connected to {}\n{}", client.server_addr(), snapshot);

    let id = args.id.unwrap_or(snapshot.id());
    for update in build_updates(id, &args.instructions, args.split) {
        client.send(&update).context("sending update")?;
        log::info!("Sent {}", update);
    }

    Ok(())
}
