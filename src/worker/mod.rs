//! Job execution engine for the worker node.
//!
//! - **Dispatch**: [`JobDispatcher`] validates a request, runs the selected
//!   profile and reports exactly one terminal result
//! - **Profiles**: named workloads behind the [`WorkProfile`] trait
//! - **CPU pool**: [`CpuPool`] keeps CPU-bound work off the async workers
//! - **Reporting**: [`ResultReporter`] pushes results to the shared sink
//! - **Heartbeat**: [`LivenessHeartbeat`] keeps the liveness marker fresh
//!
//! # Execution Flow
//!
//! 1. `/run_job` hands a [`JobRequest`] to the dispatcher
//! 2. Payloads carrying the invalid marker fail without running a profile
//! 3. Otherwise the profile picked by `name` runs and is timed
//! 4. A completed or failed [`JobResult`] is pushed to `job_results`
//! 5. The caller receives a [`JobResponse`] mirroring the result status

pub mod dispatcher;
pub mod heartbeat;
pub mod job;
pub mod pool;
pub mod profiles;
pub mod reporter;

pub use dispatcher::JobDispatcher;
pub use heartbeat::LivenessHeartbeat;
pub use job::{JobRequest, JobResponse, JobResult, JobStatus};
pub use pool::CpuPool;
pub use profiles::{ProfileRegistry, WorkProfile};
pub use reporter::ResultReporter;
