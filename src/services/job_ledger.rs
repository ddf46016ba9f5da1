//! 投递台账 - 业务能力层
//!
//! 记录每个职位链接的最终状态，用于中断后续跑：
//! 只有 `SuccessfullyApplied` 会在下次运行时跳过。
//!
//! ```toml
//! [jobs]
//! "https://jobs.jobvite.com/acme/job/oHZmkfw1" = "SuccessfullyApplied"
//! "https://jobs.jobvite.com/acme/job/p9x2" = "Failed"
//! ```

use crate::error::FileError;
use crate::models::{JobRecord, JobStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    jobs: BTreeMap<String, JobStatus>,
}

/// 投递台账
///
/// 每次写入前重新读取文件再合并，写入通过临时文件 + 重命名完成，
/// 进程在任意时刻被杀都不会留下半截文件。
#[derive(Debug)]
pub struct JobLedger {
    path: PathBuf,
    entries: BTreeMap<String, JobStatus>,
}

impl JobLedger {
    /// 加载台账，文件不存在时视为空
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        debug!("台账 {} 已有 {} 条记录", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self, job_link: &str) -> Option<JobStatus> {
        self.entries.get(job_link).copied()
    }

    /// 是否已成功投递过
    pub fn is_done(&self, job_link: &str) -> bool {
        self.status(job_link).is_some_and(JobStatus::is_done)
    }

    /// 写入一条记录，同一链接覆盖旧状态
    pub fn record(&mut self, job_link: &str, status: JobStatus) -> Result<(), FileError> {
        let mut merged = read_entries(&self.path)?;
        merged.insert(job_link.to_string(), status);
        write_entries(&self.path, &merged)?;
        self.entries = merged;
        Ok(())
    }

    pub fn records(&self) -> impl Iterator<Item = JobRecord> + '_ {
        self.entries.iter().map(|(link, status)| JobRecord {
            job_link: link.clone(),
            status: *status,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, JobStatus>, FileError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;

    let file: LedgerFile = toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
        path: path.display().to_string(),
        source,
    })?;

    Ok(file.jobs)
}

fn write_entries(path: &Path, entries: &BTreeMap<String, JobStatus>) -> Result<(), FileError> {
    let file = LedgerFile {
        jobs: entries.clone(),
    };
    let content = toml::to_string(&file).map_err(|source| FileError::TomlWriteFailed {
        path: path.display().to_string(),
        source,
    })?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let write_failed = |source| FileError::WriteFailed {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    fs::write(&tmp_path, content).map_err(write_failed)?;
    fs::rename(&tmp_path, path).map_err(write_failed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let dir = tempdir().unwrap();
        let ledger = JobLedger::load(dir.path().join("applied.toml")).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.is_done("https://example.com/job/1"));
    }

    #[test]
    fn test_record_persists_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("applied.toml");

        let mut ledger = JobLedger::load(&path).unwrap();
        ledger.record("https://example.com/job/1", JobStatus::Failed).unwrap();
        ledger.record("https://example.com/job/2", JobStatus::AlreadyApplied).unwrap();
        ledger
            .record("https://example.com/job/1", JobStatus::SuccessfullyApplied)
            .unwrap();

        let reloaded = JobLedger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.is_done("https://example.com/job/1"));
        assert!(!reloaded.is_done("https://example.com/job/2"));
        assert_eq!(
            reloaded.status("https://example.com/job/2"),
            Some(JobStatus::AlreadyApplied)
        );
        assert!(!dir.path().join("applied.toml.tmp").exists());
    }

    #[test]
    fn test_record_merges_external_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("applied.toml");

        let mut first = JobLedger::load(&path).unwrap();
        let mut second = JobLedger::load(&path).unwrap();
        first.record("https://example.com/a", JobStatus::SuccessfullyApplied).unwrap();
        second.record("https://example.com/b", JobStatus::Failed).unwrap();

        let reloaded = JobLedger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.is_done("https://example.com/a"));
    }

    #[test]
    fn test_legacy_spellings_are_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("applied.toml");
        fs::write(
            &path,
            "[jobs]\n\"https://example.com/a\" = \"Successfully Applied\"\n\"https://example.com/b\" = \"Submission Failed\"\n",
        )
        .unwrap();

        let ledger = JobLedger::load(&path).unwrap();
        assert!(ledger.is_done("https://example.com/a"));
        assert_eq!(
            ledger.status("https://example.com/b"),
            Some(JobStatus::SubmissionAmbiguous)
        );
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("applied.toml");
        fs::write(&path, "[jobs\nbroken").unwrap();
        assert!(matches!(
            JobLedger::load(&path),
            Err(FileError::TomlParseFailed { .. })
        ));
    }
}
