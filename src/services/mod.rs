pub mod completion_waiter;
pub mod field_classifier;
pub mod fill_executor;
pub mod fill_state;
pub mod job_ledger;
pub mod label_resolver;
pub mod page_port;
pub mod probe;
pub mod resume_attacher;
pub mod value_provider;

pub use completion_waiter::await_required;
pub use field_classifier::{group_elements, ClassifiedPage, FieldClassifier, FieldPlan, FixedLocator, PlanSource};
pub use fill_executor::{interact_with_fallback, FillExecutor, FillOutcome};
pub use fill_state::{FieldIdentity, FillRecord};
pub use job_ledger::JobLedger;
pub use label_resolver::{normalize, AliasTable, Resolution, SemanticKey};
pub use page_port::FormPage;
pub use probe::probe;
pub use resume_attacher::{PageResumeAttacher, ResumeAttacher};
pub use value_provider::AnswerStore;
