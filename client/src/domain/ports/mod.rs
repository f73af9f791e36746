//! Driven ports used by the client domain.

mod macros;
pub(crate) use macros::define_port_error;

mod clipboard;
mod credential_store;
mod http_transport;
mod share_target;

#[cfg(test)]
pub use clipboard::MockClipboard;
pub use clipboard::{Clipboard, ClipboardError};
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError, InMemoryCredentialStore};
#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{HttpTransport, TransportError, TransportRequest, TransportResponse};
#[cfg(test)]
pub use share_target::MockShareTarget;
pub use share_target::{ShareError, SharePayload, ShareTarget, UnsupportedShareTarget};
