//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `credentials`  | CredentialStore    | passwd file / memory        |
//! | `log_sink`     | EventSink          | `log` facade                |
//! | `tcp`          | (driver)           | TCP listener, session threads |

pub mod credentials;
pub mod log_sink;
pub mod tcp;
