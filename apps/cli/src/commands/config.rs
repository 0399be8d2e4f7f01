//! 配置管理命令
//!
//! 打印、校验、生成升降机 TOML 配置

use super::load_config;
use anyhow::{Context, Result};
use clap::Subcommand;
use elevator_core::{ElevatorConfig, Level};
use std::path::{Path, PathBuf};

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效配置（TOML）
    Show {
        /// 配置文件（缺省为内置默认值）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 校验配置文件
    Check {
        /// 配置文件路径
        file: PathBuf,
    },

    /// 写出默认配置
    Init {
        /// 输出路径
        file: PathBuf,

        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Show { config } => Self::show_(config.as_deref()),

            ConfigCommand::Check { file } => Self::check_(&file),

            ConfigCommand::Init { file, force } => Self::init_(&file, force),
        }
    }

    fn show_(path: Option<&Path>) -> Result<()> {
        let config = load_config(path)?;
        let content = config.to_toml_string()?;

        println!("{}", content);
        println!("# 档位高度");
        for level in Level::ALL {
            println!("#   {:<9} {}", level.name(), level.extension());
        }
        Ok(())
    }

    fn check_(path: &Path) -> Result<()> {
        let config = check_file(path)?;

        println!("✅ 配置有效: {}", path.display());
        println!(
            "  周期 {} ms，最大速度 {}，最大加速度 {}",
            config.control_loop.period_ms, config.limits.max_velocity, config.limits.max_accel
        );
        Ok(())
    }

    fn init_(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }

        ElevatorConfig::default()
            .save_to_file(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        println!("✅ 已写出默认配置: {}", path.display());
        Ok(())
    }
}

/// 解析并校验配置文件
fn check_file(path: &Path) -> Result<ElevatorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    // 先单独做语法检查，给出更精确的 TOML 报错位置
    toml::from_str::<toml::Table>(&content)
        .with_context(|| format!("{} is not valid TOML", path.display()))?;

    ElevatorConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid elevator config in {}", path.display()))
}
