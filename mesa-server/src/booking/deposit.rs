//! 押金计算
//!
//! 策略提供的纯函数，模式为明确的枚举 (`FIXED` / `PER_PERSON`)。

use crate::db::models::{BookingPolicy, DepositType};
use rust_decimal::Decimal;

/// 计算应付押金；人数未达阈值或无押金规则时返回 None
pub fn deposit_due(policy: &BookingPolicy, party_size: i32) -> Option<Decimal> {
    let rule = policy.deposit.as_ref()?;
    if party_size < rule.min_party_size {
        return None;
    }
    let amount = match rule.deposit_type {
        DepositType::Fixed => rule.amount,
        DepositType::PerPerson => rule.amount * Decimal::from(party_size),
    };
    Some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::DepositRule;
    use rust_decimal::prelude::FromPrimitive;

    fn policy_with(rule: DepositRule) -> BookingPolicy {
        BookingPolicy {
            deposit: Some(rule),
            ..Default::default()
        }
    }

    #[test]
    fn no_rule_no_deposit() {
        assert_eq!(deposit_due(&BookingPolicy::default(), 10), None);
    }

    #[test]
    fn below_threshold_no_deposit() {
        let policy = policy_with(DepositRule {
            min_party_size: 6,
            deposit_type: DepositType::Fixed,
            amount: Decimal::from(50),
        });
        assert_eq!(deposit_due(&policy, 5), None);
    }

    #[test]
    fn fixed_deposit_is_flat() {
        let policy = policy_with(DepositRule {
            min_party_size: 6,
            deposit_type: DepositType::Fixed,
            amount: Decimal::from(50),
        });
        assert_eq!(deposit_due(&policy, 8), Some(Decimal::from(50)));
    }

    #[test]
    fn per_person_deposit_scales() {
        let policy = policy_with(DepositRule {
            min_party_size: 4,
            deposit_type: DepositType::PerPerson,
            amount: Decimal::from_f64(12.5).unwrap(),
        });
        assert_eq!(deposit_due(&policy, 4), Some(Decimal::from(50)));
    }
}
