pub mod error;
pub mod http;
pub mod rescuetime;

pub use error::UploadError;
pub use http::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use rescuetime::{
    ActivationKeys, AuthState, LegacyPayload, RescueTimeClient, RescueTimeCredentials,
    RescueTimeEndpoints, RetryMachine, RetryPolicy, UserClientEvent, UserClientEventPayload,
};
