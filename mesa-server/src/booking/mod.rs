//! Booking Slot Allocation Engine for Mesa Server
//!
//! 预订引擎的六个协作组件：
//!
//! - **availability**: 规划输入的一致性快照 (桌台 / 班次 / 占座预订)
//! - **conflict**: 半开区间重叠判定 (纯函数)
//! - **planner**: 贪心最小适配的桌台分配 (单桌优先，拼桌兜底)
//! - **policy**: 门店预订策略评估 (提前期 / 人数上限 / 当日单)
//! - **txn**: 事务化占座提交 (冲突复查 + 幂等重放)
//! - **orchestrator**: 对外入口，串联整条创建链路与生命周期操作
//!
//! # Architecture
//!
//! ```text
//! create_booking(input)
//!     ├─ Policy Evaluator ──────── fail fast, 不触库存
//!     ├─ loop (bounded):
//!     │    Availability Index ──── 快照读取
//!     │    Allocation Planner ──── 纯函数规划
//!     │    Reservation Txn ─────── 事务内复查 + 写入
//!     │         └─ SlotTaken → 重跑整轮
//!     └─ Payment Gateway ───────── 提交后押金授权 (失败不回滚)
//! ```
//!
//! 双重预订的防线在存储事务内 (见 txn / repository)，规划器的
//! 快照检查只是优化 — 过期快照最多引发一次重试，绝不产生重叠占座。

pub mod availability;
pub mod conflict;
pub mod deposit;
pub mod error;
pub mod orchestrator;
pub mod payment;
pub mod planner;
pub mod policy;
pub mod txn;

pub use availability::{AvailabilityIndex, AvailabilitySnapshot};
pub use error::{BookingError, BookingResult};
pub use orchestrator::{BookingConfirmation, BookingService, CreateBookingInput};
pub use payment::{DisabledPaymentGateway, HttpPaymentGateway, PaymentGateway};
pub use planner::{PlanOutcome, SeatingUnit, SlotRequest};
pub use txn::{CommitOutcome, ReservationTxn};

#[cfg(test)]
mod tests;
