//! 授权用例

pub mod service;

pub use service::{
    AuthorizationCheckRequest, AuthorizationDecision, AuthorizationService, DecisionSource,
};
