//! Tower layers used by the client middleware stack

mod user_agent;

pub use user_agent::{UserAgentLayer, UserAgentService};
