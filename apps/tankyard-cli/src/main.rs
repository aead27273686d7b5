mod script;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use glam::{Quat, Vec3};
use std::path::PathBuf;
use tankyard_common::{GameConfig, Transform};
use tankyard_input::InputSnapshot;
use tankyard_kernel::{FrameLoop, FrameOutcome};
use tankyard_physics::CollisionShape;
use tankyard_protocol::{PACKET_LEN, PositionPacket};
use tankyard_render::DebugTextRenderer;
use tankyard_tools::SessionInspector;
use tracing_subscriber::EnvFilter;

const LOCAL_PLAYER: i32 = 1;
const ECHO_PLAYER: i32 = 2;

#[derive(Parser)]
#[command(name = "tankyard-cli", about = "Headless tankyard sessions and packet tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run a headless session driven by a key script
    Simulate {
        /// YAML game configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Drive script, e.g. `w:120,a:45,drag=-4:20,idle:30`
        #[arg(short, long, default_value = "w:120,a:45,w:60")]
        script: String,
        /// Nominal frame time in seconds
        #[arg(long, default_value_t = 1.0 / 60.0)]
        frame_dt: f64,
        /// Seed for frame-time jitter; 0 disables jitter
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Mirror outgoing packets into a networked echo player
        #[arg(long)]
        echo: bool,
        /// Number of crates dropped into the scene
        #[arg(long, default_value_t = 2)]
        crates: usize,
        /// Print the scene as text at the end
        #[arg(long)]
        render: bool,
        /// Print the final session report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Encode a position packet and print it as hex
    Encode {
        #[arg(long, default_value_t = LOCAL_PLAYER)]
        player: i32,
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        position: Vec<f32>,
        /// Heading around +Y, degrees
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        yaw: f32,
        /// Cannon pitch, degrees
        #[arg(long, default_value_t = 0.0)]
        pitch: f32,
    },
    /// Decode a hex position packet
    Decode {
        /// 56 hex digits
        hex: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("tankyard-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", tankyard_common::crate_info());
            println!("physics: {}", tankyard_physics::crate_info());
            println!("render: {}", tankyard_render::crate_info());
            println!("input: {}", tankyard_input::crate_info());
            println!("protocol: {}", tankyard_protocol::crate_info());
            println!("player: {}", tankyard_player::crate_info());
            println!("kernel: {}", tankyard_kernel::crate_info());
            println!("tools: {}", tankyard_tools::crate_info());
            let defaults = GameConfig::default();
            println!(
                "defaults: fixed_step={:.5}s walk_speed={} rotation_speed={} packet={} bytes",
                defaults.fixed_step, defaults.walk_speed, defaults.rotation_speed, PACKET_LEN
            );
        }
        Commands::Simulate {
            config,
            script,
            frame_dt,
            seed,
            echo,
            crates,
            render,
            json,
        } => {
            let config = match config {
                Some(path) => GameConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => GameConfig::default(),
            };
            let script = script::parse(&script)?;
            let options = SimulateOptions {
                frame_dt,
                seed,
                echo,
                crates,
                render,
                json,
            };
            simulate(config, &script, &options)?;
        }
        Commands::Encode {
            player,
            position,
            yaw,
            pitch,
        } => {
            let position = match position.as_slice() {
                [] => Vec3::ZERO,
                [x, y, z] => Vec3::new(*x, *y, *z),
                _ => bail!("--position takes three numbers"),
            };
            let packet =
                PositionPacket::from_pose(player, position, Quat::from_rotation_y(yaw.to_radians()), pitch);
            println!("{}", to_hex(&packet.encode()));
        }
        Commands::Decode { hex } => {
            let bytes = from_hex(&hex)?;
            let packet = PositionPacket::decode(&bytes)?;
            let (yaw, _, _) = packet.orientation().to_euler(glam::EulerRot::YXZ);
            println!(
                "player={} position=({:.3}, {:.3}, {:.3}) w={:.6} yaw={:.2} pitch={:.2}",
                packet.player,
                packet.position.x,
                packet.position.y,
                packet.position.z,
                packet.orientation_w,
                yaw.to_degrees(),
                packet.pitch
            );
        }
    }

    Ok(())
}

struct SimulateOptions {
    frame_dt: f64,
    seed: u64,
    echo: bool,
    crates: usize,
    render: bool,
    json: bool,
}

fn simulate(
    config: GameConfig,
    script: &[script::Segment],
    options: &SimulateOptions,
) -> anyhow::Result<()> {
    let SimulateOptions {
        frame_dt,
        seed,
        echo,
        crates,
        render,
        json,
    } = *options;
    let mut game = FrameLoop::new(config)?;
    let spawn_y = game.config().capsule_total_half_height() + 0.05;
    game.add_local_player("local", LOCAL_PLAYER, Vec3::new(0.0, spawn_y, 0.0))?;
    if echo {
        game.add_remote_player("echo", ECHO_PLAYER, Vec3::new(3.0, spawn_y, 0.0))?;
    }
    for i in 0..crates {
        let at = Vec3::new(-3.0, 2.0 + 1.5 * i as f32, -4.0);
        game.spawn_prop(
            &format!("crate-{i}"),
            1.0,
            CollisionShape::default(),
            Transform::from_position(at),
        )?;
    }

    let mut input = InputSnapshot::new();
    let mut rng = seed;
    let mut frames = 0u64;
    let mut sent = 0usize;
    'run: for segment in script {
        for _ in 0..segment.frames {
            segment.apply(&mut input);
            let dt = if seed == 0 {
                frame_dt
            } else {
                rng = splitmix64(rng);
                // between half and one and a half nominal frames
                frame_dt * (0.5 + (rng >> 11) as f64 / (1u64 << 53) as f64)
            };
            frames += 1;
            if game.frame(dt, &input) == FrameOutcome::Shutdown {
                break 'run;
            }
            for packet in game.drain_outbox() {
                sent += 1;
                if echo {
                    let mut mirrored = PositionPacket::decode(&packet)?;
                    mirrored.player = ECHO_PLAYER;
                    mirrored.position += Vec3::X * 3.0;
                    game.receive_packet(&mirrored.encode())?;
                }
            }
        }
    }

    tracing::info!(frames, sent, "simulation finished");
    let summary = SessionInspector::summary(&game);
    let players = SessionInspector::list_players(&game);
    if json {
        let report = serde_json::json!({ "session": summary, "players": players });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{summary}");
        for player in &players {
            println!("  {player}");
        }
    }
    if render {
        print!("{}", game.render(&DebugTextRenderer::new()));
    }
    Ok(())
}

/// Splitmix64 step, used for reproducible frame-time jitter.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if !text.is_ascii() {
        bail!("not a hex string");
    }
    if text.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&text[i..i + 2], 16)
                .with_context(|| format!("bad hex at offset {i}"))
        })
        .collect()
}
