pub mod vapid;
pub mod worker;

pub use vapid::{
    VapidCredentials, decode_application_server_key, generate_vapid_credentials,
    is_uncompressed_p256_point,
};
pub use worker::{ClickOutcome, NotificationDisplay, handle_click, handle_push};
