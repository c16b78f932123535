//! 数据模型
//!
//! 预订域实体定义。所有时间戳统一为 Unix millis (`i64`)，
//! 记录 ID 使用 `RecordId` ("table:id" 字符串互转见 [`serde_helpers`])。

pub mod serde_helpers;

pub mod booking;
pub mod dining_table;
pub mod location;
pub mod shift;

pub use booking::{Booking, BookingDraft, BookingId, BookingStatus, PaymentStatus};
pub use dining_table::{DiningTable, DiningTableCreate, DiningTableId, DiningTableUpdate};
pub use location::{
    BookingPolicy, DepositRule, DepositType, Location, LocationCreate, LocationId, LocationUpdate,
};
pub use shift::{Shift, ShiftCreate, ShiftId, ShiftUpdate};
