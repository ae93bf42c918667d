pub mod alerting;
pub mod auth_gateway;

pub use alerting::AlertingClient;
pub use auth_gateway::AuthGatewayClient;
