use crate::models::job::JobPosting;
use crate::models::profile::ApplicantProfile;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// 职位列表文件
///
/// ```toml
/// [[jobs]]
/// job_id = "oHZmkfw1"
/// url = "/acme/job/oHZmkfw1"
/// ```
#[derive(Debug, Deserialize)]
struct JobsFile {
    #[serde(default)]
    jobs: Vec<JobPosting>,
}

/// 从 TOML 文件加载申请人配置
pub async fn load_applicant_profile(path: &Path) -> Result<ApplicantProfile> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取配置文件: {}", path.display()))?;

    let profile: ApplicantProfile = toml::from_str(&content)
        .with_context(|| format!("无法解析配置文件: {}", path.display()))?;

    tracing::info!(
        "成功加载配置: {} 项资料, {} 个问题, {} 条选择器规则",
        profile.profile.len(),
        profile.questions.len(),
        profile.locators.len()
    );

    Ok(profile)
}

/// 从 TOML 文件加载职位列表
///
/// 以 `/` 开头的相对链接会拼接 `base_url`；重复链接只保留第一次出现。
pub async fn load_job_postings(path: &Path, base_url: &str) -> Result<Vec<JobPosting>> {
    if !path.exists() {
        anyhow::bail!("职位列表文件不存在: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取职位列表: {}", path.display()))?;

    let file: JobsFile = toml::from_str(&content)
        .with_context(|| format!("无法解析职位列表: {}", path.display()))?;

    Ok(normalize_postings(file.jobs, base_url))
}

fn normalize_postings(jobs: Vec<JobPosting>, base_url: &str) -> Vec<JobPosting> {
    let mut seen = HashSet::new();
    let mut postings = Vec::with_capacity(jobs.len());

    for mut job in jobs {
        let url = job.url.trim();
        if url.is_empty() {
            tracing::warn!("跳过无效的职位记录: {:?}", job);
            continue;
        }

        job.url = if url.starts_with('/') {
            format!("{}{}", base_url.trim_end_matches('/'), url)
        } else {
            url.to_string()
        };

        if !seen.insert(job.url.clone()) {
            tracing::debug!("跳过重复职位: {}", job.url);
            continue;
        }
        postings.push(job);
    }

    postings
}
