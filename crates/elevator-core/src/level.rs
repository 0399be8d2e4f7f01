//! 得分高度枚举

use crate::units::Meters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 命名得分高度
///
/// 每个档位对应一个固定伸出量，只用于设置目标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    L1,
    L2,
    L3,
    L4,
    L2Algae,
    L3Algae,
}

impl Level {
    /// 全部档位
    pub const ALL: [Level; 6] = [
        Level::L1,
        Level::L2,
        Level::L3,
        Level::L4,
        Level::L2Algae,
        Level::L3Algae,
    ];

    /// 档位对应的伸出量
    pub const fn extension(self) -> Meters {
        match self {
            Level::L1 => Meters(0.3),
            Level::L2 => Meters(0.488),
            Level::L3 => Meters(0.838),
            Level::L4 => Meters(1.408),
            Level::L2Algae => Meters(0.119),
            Level::L3Algae => Meters(0.496),
        }
    }

    /// 档位名称（与 `FromStr` 互逆）
    pub const fn name(self) -> &'static str {
        match self {
            Level::L1 => "L1",
            Level::L2 => "L2",
            Level::L3 => "L3",
            Level::L4 => "L4",
            Level::L2Algae => "L2_ALGAE",
            Level::L3Algae => "L3_ALGAE",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 无法识别的档位名称
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown level '{0}' (expected one of L1, L2, L3, L4, L2_ALGAE, L3_ALGAE)")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Level::ALL
            .into_iter()
            .find(|level| level.name() == normalized)
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}
