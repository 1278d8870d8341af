//! Runtime types.

use seacow_chat::ChatStatus;
use serde::Serialize;

/// Which statistics APIs can be called.
///
/// Census and BLS answer anonymous requests; BEA needs a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatisticsStatus {
    pub census: bool,
    pub bls: bool,
    pub bea: bool,
}

/// Full readiness report for `/api/chat/status`.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStatus {
    #[serde(flatten)]
    pub chat: ChatStatus,
    #[serde(rename = "webSearch")]
    pub web_search: bool,
    pub statistics: StatisticsStatus,
}
