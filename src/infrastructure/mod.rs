pub mod portal_session;

pub use portal_session::{HttpPortal, HttpPortalSession, PortalConnector, PortalSession, LOGIN_PATH};
