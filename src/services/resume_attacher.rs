//! 简历上传
//!
//! 两种方式：
//! - 文件：通过文件输入框直接设置文件
//! - 粘贴：打开"粘贴简历"对话框，把文本写进去后保存（`.txt` 简历默认走这条路）

use crate::models::{ElementHandle, ElementQuery, Interaction, ResumeMode, ResumeSettings};
use crate::services::fill_executor::interact_with_fallback;
use crate::services::page_port::FormPage;
use crate::services::probe::probe;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// 简历上传能力
#[allow(async_fn_in_trait)]
pub trait ResumeAttacher {
    async fn attach<P: FormPage>(&self, page: &P) -> Result<()>;
}

/// 基于页面操作的简历上传
#[derive(Debug, Clone)]
pub struct PageResumeAttacher {
    path: PathBuf,
    mode: ResumeMode,
    settings: ResumeSettings,
    probe_timeout: Duration,
    poll_interval: Duration,
}

impl PageResumeAttacher {
    pub fn new(
        path: impl Into<PathBuf>,
        settings: ResumeSettings,
        probe_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        let path = path.into();
        let mode = settings.effective_mode(&path);
        Self {
            path,
            mode,
            settings,
            probe_timeout,
            poll_interval,
        }
    }

    pub fn mode(&self) -> ResumeMode {
        self.mode
    }

    async fn locate<P: FormPage>(&self, page: &P, query: &ElementQuery) -> Result<ElementHandle> {
        match probe(page, query, self.probe_timeout, self.poll_interval).await {
            Some(handle) => Ok(handle),
            None => bail!("未找到元素: {}", query),
        }
    }

    async fn click<P: FormPage>(&self, page: &P, query: &ElementQuery) -> Result<()> {
        let handle = self.locate(page, query).await?;
        interact_with_fallback(page, handle, &Interaction::Click)
            .await
            .with_context(|| format!("点击失败: {}", query))?;
        Ok(())
    }

    async fn attach_file<P: FormPage>(&self, page: &P) -> Result<()> {
        if let Some(option) = &self.settings.file_option {
            self.click(page, option).await?;
        }

        let input = self.locate(page, &self.settings.file_input).await?;
        page.upload_file(input, &self.path)
            .await
            .with_context(|| format!("设置文件失败: {}", self.path.display()))?;
        Ok(())
    }

    async fn attach_paste<P: FormPage>(&self, page: &P) -> Result<()> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("无法读取简历: {}", self.path.display()))?;
        debug!("简历文本 {} 字符", text.chars().count());

        self.click(page, &self.settings.paste_link).await?;

        let textarea = self.locate(page, &self.settings.paste_textarea).await?;
        interact_with_fallback(page, textarea, &Interaction::SetText(text))
            .await
            .context("写入简历文本失败")?;

        self.click(page, &self.settings.paste_save).await
    }
}

impl ResumeAttacher for PageResumeAttacher {
    async fn attach<P: FormPage>(&self, page: &P) -> Result<()> {
        if !self.path.exists() {
            bail!("简历文件不存在: {}", self.path.display());
        }

        match self.mode {
            ResumeMode::File => self.attach_file(page).await?,
            ResumeMode::Paste => self.attach_paste(page).await?,
        }

        info!("📎 简历已上传 ({:?}): {}", self.mode, self.path.display());
        Ok(())
    }
}
