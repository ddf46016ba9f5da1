//! 有界等待：在限定时间内轮询查找元素

use crate::models::{ElementHandle, ElementQuery};
use crate::services::page_port::FormPage;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// 轮询查找元素，直到找到或超时
///
/// 查询出错按"暂未找到"处理。超时返回 `None`，总耗时不超过 `timeout`
/// 加上最后一次查询本身的时间。
pub async fn probe<P: FormPage>(
    page: &P,
    query: &ElementQuery,
    timeout: Duration,
    interval: Duration,
) -> Option<ElementHandle> {
    let start = Instant::now();

    loop {
        match page.find(query).await {
            Ok(Some(handle)) => return Some(handle),
            Ok(None) => {}
            Err(e) => debug!("查找 {} 出错: {}", query, e),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            debug!("等待 {} 超时 ({:?})", query, timeout);
            return None;
        }

        let remaining = timeout - elapsed;
        sleep(interval.min(remaining).max(Duration::from_millis(1))).await;
    }
}
