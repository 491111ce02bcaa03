mod config;
mod runner;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::Result;
use clap::Parser;
use glam::DVec3;

use camsync::{AxisAngle, CameraController, InstructionQueue, MemoryRig, SyncServer, ViewPose};
use config::{ServerConfig, resolve_port};
use runner::CameraLoop;

#[derive(Parser)]
#[command(name = "camsync-server")]
#[command(about = "Remote camera control server")]
struct Args {
    #[arg(help = "Port to listen on (falls back to the default when invalid)")]
    port: Option<String>,

    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = 32, help = "Simulation tick in ms")]
    tick_ms: u64,

    #[arg(long, default_value_t = 0, help = "Id of the camera channel")]
    camera_id: u32,

    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    position: Option<Vec<f64>>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = ServerConfig {
        bind: args.bind,
        port: resolve_port(args.port.as_deref()),
        tick_interval: std::time::Duration::from_millis(args.tick_ms.max(1)),
        camera_id: args.camera_id,
    };

    let position = match args.position.as_deref() {
        Some([x, y, z]) => DVec3::new(*x, *y, *z),
        _ => DVec3::ZERO,
    };
    let rig = MemoryRig::new(ViewPose::new(position, AxisAngle::IDENTITY));

    let server = SyncServer::start(config.bind_addr(), InstructionQueue::new(config.camera_id))?;
    let controller = CameraController::new(rig, server.handle());
    let mut camera_loop = CameraLoop::new(controller, config.tick_interval);

    spawn_interrupt_watcher(camera_loop.running())?;

    log::info!(
        "Camera {} ready, ticking every {:?}",
        config.camera_id,
        config.tick_interval
    );
    camera_loop.run();
    log::info!("Server shutting down");

    Ok(())
}

/// Clears `running` on Ctrl-C so the camera loop returns.
fn spawn_interrupt_watcher(running: Arc<AtomicBool>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("camsync-signal".into())
        .spawn(move || match runtime.block_on(tokio::signal::ctrl_c()) {
            Ok(()) => {
                log::info!("Interrupt received");
                running.store(false, Ordering::SeqCst);
            }
            Err(e) => log::error!("Failed to listen for interrupt: {}", e),
        })?;

    Ok(())
}
