mod bot_policy;
mod policy_error;

pub use bot_policy::*;
pub use policy_error::*;
