//! 强类型单位系统
//!
//! 使用 NewType 模式防止单位混淆，在编译期保证类型安全。
//!
//! # 设计目标
//!
//! - **编译期类型安全**: 防止 `Meters` 与 `MetersPerSecond` 混用
//! - **零开销抽象**: NewType 编译后与原始类型性能相同
//! - **符合人体工程学**: 支持运算符重载和链式调用
//!
//! # 示例
//!
//! ```rust
//! use elevator_core::units::{Meters, MetersPerSecond};
//! use std::time::Duration;
//!
//! let v = MetersPerSecond(2.0);
//! let dx: Meters = v * Duration::from_millis(20);
//! assert!((dx.0 - 0.04).abs() < 1e-12);
//!
//! // 类型安全：以下代码无法编译
//! // let _ = Meters(1.0) + MetersPerSecond(1.0);  // ❌ 类型不匹配
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::time::Duration;

/// 为标量单位生成通用的运算符实现
///
/// 同单位加减、与 `f64` 的乘除、同单位相除得到无量纲比值。
macro_rules! impl_scalar_unit {
    ($unit:ident, $suffix:literal, $precision:literal) => {
        impl $unit {
            /// 零值常量
            pub const ZERO: Self = $unit(0.0);

            /// 取绝对值
            #[inline]
            pub fn abs(self) -> Self {
                $unit(self.0.abs())
            }

            /// 符号（`0.0` 返回 `0.0`，与 `f64::signum` 不同）
            #[inline]
            pub fn signum(self) -> f64 {
                if self.0 > 0.0 {
                    1.0
                } else if self.0 < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }

            /// 是否为有限值（非 NaN、非无穷）
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// 限制范围
            #[inline]
            pub fn clamp(self, min: Self, max: Self) -> Self {
                $unit(self.0.clamp(min.0, max.0))
            }
        }

        impl fmt::Display for $unit {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!("{:.", $precision, "} ", $suffix), self.0)
            }
        }

        impl Add for $unit {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                $unit(self.0 + rhs.0)
            }
        }

        impl Sub for $unit {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                $unit(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $unit {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: f64) -> Self {
                $unit(self.0 * rhs)
            }
        }

        impl Mul<$unit> for f64 {
            type Output = $unit;
            #[inline]
            fn mul(self, rhs: $unit) -> $unit {
                $unit(self * rhs.0)
            }
        }

        impl Div<f64> for $unit {
            type Output = Self;
            #[inline]
            fn div(self, rhs: f64) -> Self {
                $unit(self.0 / rhs)
            }
        }

        impl Div<$unit> for $unit {
            type Output = f64;
            #[inline]
            fn div(self, rhs: $unit) -> f64 {
                self.0 / rhs.0
            }
        }

        impl Neg for $unit {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                $unit(-self.0)
            }
        }

        impl AddAssign for $unit {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $unit {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl MulAssign<f64> for $unit {
            #[inline]
            fn mul_assign(&mut self, rhs: f64) {
                self.0 *= rhs;
            }
        }

        impl DivAssign<f64> for $unit {
            #[inline]
            fn div_assign(&mut self, rhs: f64) {
                self.0 /= rhs;
            }
        }
    };
}

/// 米（NewType）
///
/// 表示升降机的伸出量（extension），从完全收回位置起算。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// 米每秒（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetersPerSecond(pub f64);

/// 米每二次方秒（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetersPerSecondSquared(pub f64);

/// 伏特（NewType）
///
/// 电机驱动指令统一以电压表示。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volts(pub f64);

impl_scalar_unit!(Meters, "m", "4");
impl_scalar_unit!(MetersPerSecond, "m/s", "4");
impl_scalar_unit!(MetersPerSecondSquared, "m/s²", "3");
impl_scalar_unit!(Volts, "V", "3");

impl Meters {
    /// 英寸转米
    #[inline]
    pub const fn from_inches(inches: f64) -> Self {
        Meters(inches * 0.0254)
    }
}

// 跨单位运算：速度 × 时间 = 位移
impl Mul<Duration> for MetersPerSecond {
    type Output = Meters;
    #[inline]
    fn mul(self, rhs: Duration) -> Meters {
        Meters(self.0 * rhs.as_secs_f64())
    }
}

// 加速度 × 时间 = 速度
impl Mul<Duration> for MetersPerSecondSquared {
    type Output = MetersPerSecond;
    #[inline]
    fn mul(self, rhs: Duration) -> MetersPerSecond {
        MetersPerSecond(self.0 * rhs.as_secs_f64())
    }
}

// 位移 / 时间 = 速度
impl Div<Duration> for Meters {
    type Output = MetersPerSecond;
    #[inline]
    fn div(self, rhs: Duration) -> MetersPerSecond {
        MetersPerSecond(self.0 / rhs.as_secs_f64())
    }
}

// 速度 / 时间 = 加速度
impl Div<Duration> for MetersPerSecond {
    type Output = MetersPerSecondSquared;
    #[inline]
    fn div(self, rhs: Duration) -> MetersPerSecondSquared {
        MetersPerSecondSquared(self.0 / rhs.as_secs_f64())
    }
}
