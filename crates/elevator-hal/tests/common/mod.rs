//! 测试公共模块

pub mod mock_motor;
