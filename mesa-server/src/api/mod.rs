//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查接口
//! - [`bookings`] - 预订创建与生命周期接口
//! - [`locations`] - 门店管理与可用性试算接口
//! - [`tables`] - 桌台管理接口
//! - [`shifts`] - 班次管理接口

pub mod health;

pub mod bookings;
pub mod locations;
pub mod shifts;
pub mod tables;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
