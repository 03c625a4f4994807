//! Alerting core: rule evaluation, per-aircraft latch state and the batch
//! pipeline that ties them to notification.

pub mod engine;
pub mod evaluator;
pub mod model;
pub mod store;

pub use engine::{AlertEngine, CycleSummary};
pub use evaluator::RuleEvaluator;
pub use model::{AlertRecord, AlertState, Decision, Latch, TriggerKind};
pub use store::AlertStateStore;
