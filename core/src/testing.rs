pub mod cleanup;
pub mod deadline;
pub mod process;
pub mod reporter;
pub mod result;
pub mod suite;
pub mod testcase;

#[cfg(test)]
mod testutil;

pub use cleanup::{Artifact, ArtifactSet, CleanupScope};
pub use deadline::{with_deadline, DeadlineExceeded};
pub use process::{ProcessOutput, Supervisor, Unreclaimed};
pub use reporter::{NullReporter, Reporter};
pub use result::*;
pub use suite::*;
pub use testcase::*;
