mod error;
pub use error::{ModelError, ModelResult};

mod identity;
pub use identity::{BusinessKey, InstanceId, MAX_INSTANCE_ID_LEN, WorkflowKind, derive};

mod status;
pub use status::RunStatus;

mod outcome;
pub use outcome::{StartDecision, TerminateOutcome};

mod record;
pub use record::InstanceRecord;
