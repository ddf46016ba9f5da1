use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 连接到已打开的浏览器并获取一个页面
///
/// 优先复用地址为 `start_url` 的已有标签页（通常是已登录的空白页），
/// 找不到时新建标签页。
pub async fn connect_to_browser_and_page(port: u16, start_url: &str) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    for p in pages.iter() {
        if let Ok(Some(url)) = p.url().await {
            debug!("检查页面: {}", url);
            if url == start_url {
                info!("✓ 复用已有页面: {}", url);
                return Ok((browser, p.clone()));
            }
        }
    }

    debug!("创建新页面: {}", start_url);
    let page = browser.new_page(start_url).await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;

    Ok((browser, page))
}
