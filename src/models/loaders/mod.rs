pub mod toml_loader;

pub use toml_loader::{load_applicant_profile, load_job_postings};
