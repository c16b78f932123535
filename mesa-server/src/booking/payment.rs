//! Payment Gateway (支付协作方)
//!
//! 押金授权只在占座事务提交之后发起，失败不回滚预订 —
//! 预订保持 PENDING，支付可独立重试 (保座优先于支付原子性
//! 的取舍)。

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment processor rejected the request: {0}")]
    Rejected(String),

    #[error("Payment processor unreachable: {0}")]
    Transport(String),
}

/// 押金授权结果
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentHold {
    /// 处理器侧的授权单号
    pub hold_id: String,
}

/// 支付处理器接口
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// 发起押金授权冻结
    async fn create_deposit_hold(
        &self,
        booking_id: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<PaymentHold, PaymentError>;

    /// 释放押金授权 (退款窗口内取消时)
    async fn release_deposit_hold(&self, hold_id: &str) -> Result<(), PaymentError>;
}

#[derive(Serialize)]
struct HoldRequest<'a> {
    booking_id: &'a str,
    amount: Decimal,
    currency: &'a str,
    capture_method: &'a str,
}

/// HTTP 支付处理器客户端
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_deposit_hold(
        &self,
        booking_id: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<PaymentHold, PaymentError> {
        let url = format!("{}/v1/holds", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&HoldRequest {
                booking_id,
                amount,
                currency,
                capture_method: "manual",
            })
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected(format!("{status}: {body}")));
        }

        response
            .json::<PaymentHold>()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))
    }

    async fn release_deposit_hold(&self, hold_id: &str) -> Result<(), PaymentError> {
        let url = format!("{}/v1/holds/{}/release", self.base_url, hold_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PaymentError::Rejected(response.status().to_string()));
        }
        Ok(())
    }
}

/// 未配置支付处理器时的空实现 — 授权立即成功，单号带 manual 前缀
/// 供人工对账
pub struct DisabledPaymentGateway;

#[async_trait]
impl PaymentGateway for DisabledPaymentGateway {
    async fn create_deposit_hold(
        &self,
        booking_id: &str,
        amount: Decimal,
        _currency: &str,
    ) -> Result<PaymentHold, PaymentError> {
        tracing::info!(
            booking_id = %booking_id,
            amount = %amount,
            "Payment gateway disabled, deposit hold recorded for manual collection"
        );
        Ok(PaymentHold {
            hold_id: format!("manual-{booking_id}"),
        })
    }

    async fn release_deposit_hold(&self, _hold_id: &str) -> Result<(), PaymentError> {
        Ok(())
    }
}
