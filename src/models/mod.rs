pub mod field;
pub mod job;
pub mod loaders;
pub mod profile;

pub use field::{
    ElementHandle, ElementQuery, ElementSnapshot, FieldKind, FieldOption, FormField, Interaction,
    InteractionPath,
};
pub use job::{JobPosting, JobRecord, JobStatus};
pub use loaders::{load_applicant_profile, load_job_postings};
pub use profile::{ApplicantProfile, LocatorDecl, ResumeMode, ResumeSettings, WizardSelectors};
