//! 必填字段完成等待
//!
//! 允许有些字段由外部补填（例如人工操作）。轮询直到所有必填字段都有值，
//! 或者超过最长等待时间。

use crate::error::IncompleteError;
use crate::services::field_classifier::group_elements;
use crate::services::page_port::FormPage;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// 等待当前页面所有必填字段完成
pub async fn await_required<P: FormPage>(
    page: &P,
    poll_interval: Duration,
    max_wait: Duration,
) -> Result<(), IncompleteError> {
    let start = Instant::now();

    loop {
        let unfilled = unfilled_required(page).await;
        if unfilled.is_empty() {
            return Ok(());
        }

        let elapsed = start.elapsed();
        if elapsed >= max_wait {
            return Err(IncompleteError {
                waited: elapsed,
                unfilled,
            });
        }

        for name in &unfilled {
            info!("⏳ 等待必填字段: {}", name);
        }

        let remaining = max_wait - elapsed;
        sleep(poll_interval.min(remaining).max(Duration::from_millis(1))).await;
    }
}

/// 当前未完成的必填字段
///
/// 页面读取失败时返回一个占位项，本轮视为未完成。
async fn unfilled_required<P: FormPage>(page: &P) -> Vec<String> {
    match page.list_interactive_elements().await {
        Ok(snapshots) => group_elements(&snapshots)
            .into_iter()
            .filter(|f| f.required && !f.is_satisfied())
            .map(|f| f.describe())
            .collect(),
        Err(e) => {
            warn!("读取页面字段失败: {}", e);
            vec!["<页面读取失败>".to_string()]
        }
    }
}
