use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::games::GameKind;

/// Frame pacing knobs for the main loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_fps: u32,
    pub max_step: Duration,
    pub cap_frame_rate: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_step: Duration::from_millis(16),
            cap_frame_rate: true,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "minicade")]
#[command(about = "Play one of the minicade games in the terminal")]
#[command(version)]
pub struct GameCli {
    /// Game to run
    #[arg(value_enum)]
    pub game: GameKind,

    /// Target frame rate
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Largest simulation step in milliseconds
    #[arg(long, default_value_t = 16)]
    pub max_step_ms: u64,

    /// Render as fast as possible instead of sleeping to the frame rate
    #[arg(long)]
    pub uncapped: bool,

    /// Log file (defaults to minicade.log next to the executable)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl GameCli {
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            target_fps: self.fps,
            max_step: Duration::from_millis(self.max_step_ms),
            cap_frame_rate: !self.uncapped,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub bind: SocketAddr,
    pub game_bin: PathBuf,
    /// Command prefix placed in front of `<game_bin> <key>`, e.g. a terminal emulator.
    pub wrap: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(name = "minicade-launcher")]
#[command(about = "HTTP launcher that starts minicade games as separate processes")]
#[command(version)]
pub struct LauncherCli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Game executable (defaults to `minicade` next to the launcher)
    #[arg(long)]
    pub game_bin: Option<PathBuf>,

    /// Wrapper command for each game, e.g. `--wrap xterm -e`
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    pub wrap: Vec<String>,
}

impl LauncherCli {
    pub fn launcher_config(self) -> LauncherConfig {
        LauncherConfig {
            bind: self.bind,
            game_bin: self.game_bin.unwrap_or_else(default_game_bin),
            wrap: self.wrap,
        }
    }
}

fn default_game_bin() -> PathBuf {
    let name = format!("minicade{}", std::env::consts::EXE_SUFFIX);
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            return dir.join(name);
        }
    }
    PathBuf::from(name)
}
