//! # Elevator CLI
//!
//! Command-line interface for the elevator position controller.
//!
//! ```bash
//! # 在仿真中移动到 L4，按实时节奏运行 3 秒
//! elevator-cli sim goto L4 --seconds 3 --realtime
//!
//! # 手动驾驶：摇杆半推 2 秒后松开
//! elevator-cli sim manual --axis 0.5 --seconds 2
//!
//! # 检查配置文件
//! elevator-cli config check elevator.toml
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ConfigCommand, SimCommand};

/// Elevator CLI - 升降机位置控制命令行工具
#[derive(Parser, Debug)]
#[command(name = "elevator-cli")]
#[command(about = "Command-line interface for the elevator position controller", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 在仿真（或空桩）后端上运行控制循环
    #[command(subcommand)]
    Sim(SimCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    let filter = EnvFilter::from_default_env().add_directive("elevator_cli=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => cmd.execute(),
        Commands::Sim(cmd) => cmd.execute(),
    }
}
