//! The command set: immutable descriptions of one desired side effect.

use crate::auth::AuthUser;
use crate::error::StoreError;
use serde_json::Value;
use statewire_model::{JsonObject, Query, Reference};
use std::fmt;
use std::path::PathBuf;

/// One-shot completion for reads; receives the normalized object or `None`.
pub type ObjectCompletion = Box<dyn FnOnce(Option<JsonObject>) + Send>;

/// Persistent observer callback; fires with the normalized object on every
/// value change.
pub type ObserveCallback = Box<dyn FnMut(Option<JsonObject>) + Send>;

/// Completion for binary uploads.
pub type UploadCompletion = Box<dyn FnOnce(Result<UploadInfo, StoreError>) + Send>;

/// Completion for blob deletion.
pub type DeleteCompletion = Box<dyn FnOnce(Result<(), StoreError>) + Send>;

/// Completion for sign-up; receives the new user id.
pub type SignUpCompletion = Box<dyn FnOnce(String) + Send>;

/// Result of a successful binary upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInfo {
    /// Name of the stored blob.
    pub name: String,
    /// Location the blob can be downloaded from.
    pub download_location: String,
}

/// An immutable, typed description of one desired side effect plus its
/// completion contract.
///
/// Commands are dispatched exactly once through
/// [`Dispatcher::fire_command`](crate::Dispatcher::fire_command) and carry
/// no cross-command shared state. Completion, where a variant has one,
/// arrives later through the owned callback; everything else is reported
/// through events.
pub enum Command {
    /// Full overwrite at a reference, optionally under a fresh child id and
    /// with any `"id"` key stripped from the payload (identity is derived
    /// from the path, not the payload).
    CreateObject {
        /// Target reference.
        reference: Reference,
        /// Resolve a fresh unique child reference before writing.
        fresh_child_id: bool,
        /// Strip the `"id"` key from the parameters before writing.
        strip_id: bool,
        /// Object to write.
        parameters: JsonObject,
    },
    /// Recursive partial merge: one shallow partial write per nesting path
    /// that contains at least one scalar leaf.
    UpdateObject {
        /// Root reference of the update.
        reference: Reference,
        /// Possibly nested update payload.
        parameters: JsonObject,
    },
    /// Single shallow partial update, for pre-flattened payloads or
    /// explicit shallow semantics.
    UpdateObjectDirectly {
        /// Target reference.
        reference: Reference,
        /// Shallow update payload; keys may contain path separators.
        parameters: JsonObject,
    },
    /// Deletes the full subtree at a reference.
    RemoveObject {
        /// Target reference.
        reference: Reference,
    },
    /// One-shot read with normalization.
    GetObject {
        /// Target reference.
        reference: Reference,
        /// Receives the normalized object, or `None` for absent/null.
        completion: ObjectCompletion,
    },
    /// Registers a persistent observer at a reference.
    ObserveObject {
        /// Target reference.
        reference: Reference,
        /// Fires with the normalized object on every value change.
        completion: ObserveCallback,
    },
    /// Removes all observers at a reference.
    StopObservingObject {
        /// Target reference.
        reference: Reference,
    },
    /// Derives an ordered/filtered query and reads it once.
    Search {
        /// Base query to derive from.
        query: Query,
        /// Child key to order by.
        key: String,
        /// Scalar the ordered key must equal.
        value: Value,
        /// Receives the normalized result, or `None` when nothing matched.
        completion: ObjectCompletion,
    },
    /// Starts republishing the connectivity signal as events.
    MonitorConnection,
    /// Stops the connectivity listener.
    StopMonitorConnection,
    /// Uploads raw bytes to the blob store.
    UploadData {
        /// Blob content.
        bytes: Vec<u8>,
        /// MIME content type.
        content_type: String,
        /// Destination reference in the blob store.
        destination: Reference,
        /// Receives the upload result.
        completion: UploadCompletion,
    },
    /// Uploads a local file to the blob store.
    UploadFromLocation {
        /// Local file location.
        location: PathBuf,
        /// Destination reference in the blob store.
        destination: Reference,
        /// Receives the upload result.
        completion: UploadCompletion,
    },
    /// Deletes a blob.
    DeleteBlob {
        /// Blob reference.
        reference: Reference,
        /// Receives the deletion result.
        completion: DeleteCompletion,
    },
    /// Sends a verification email to the given user, or to the current
    /// session user when none is given.
    SendEmailVerification {
        /// Explicit target user; takes precedence over the session user.
        user: Option<AuthUser>,
    },
    /// Re-resolves the current user from the identity provider.
    ReloadCurrentUser,
    /// Logs a user in.
    LogIn {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Creates a new account.
    SignUp {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
        /// When supplied, receives the new user id and suppresses the
        /// follow-up logged-in event.
        completion: Option<SignUpCompletion>,
    },
    /// Changes the current user's password.
    ChangePassword {
        /// New password.
        password: String,
    },
    /// Changes the current user's email.
    ChangeEmail {
        /// New email.
        email: String,
    },
    /// Sends a password reset email.
    ResetPassword {
        /// Account email.
        email: String,
    },
    /// Logs the current user out.
    LogOut,
}

impl Command {
    /// Returns the command's variant name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateObject { .. } => "CreateObject",
            Command::UpdateObject { .. } => "UpdateObject",
            Command::UpdateObjectDirectly { .. } => "UpdateObjectDirectly",
            Command::RemoveObject { .. } => "RemoveObject",
            Command::GetObject { .. } => "GetObject",
            Command::ObserveObject { .. } => "ObserveObject",
            Command::StopObservingObject { .. } => "StopObservingObject",
            Command::Search { .. } => "Search",
            Command::MonitorConnection => "MonitorConnection",
            Command::StopMonitorConnection => "StopMonitorConnection",
            Command::UploadData { .. } => "UploadData",
            Command::UploadFromLocation { .. } => "UploadFromLocation",
            Command::DeleteBlob { .. } => "DeleteBlob",
            Command::SendEmailVerification { .. } => "SendEmailVerification",
            Command::ReloadCurrentUser => "ReloadCurrentUser",
            Command::LogIn { .. } => "LogIn",
            Command::SignUp { .. } => "SignUp",
            Command::ChangePassword { .. } => "ChangePassword",
            Command::ChangeEmail { .. } => "ChangeEmail",
            Command::ResetPassword { .. } => "ResetPassword",
            Command::LogOut => "LogOut",
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Callbacks are opaque; print the addressable parts only.
        match self {
            Command::CreateObject {
                reference,
                fresh_child_id,
                strip_id,
                parameters,
            } => f
                .debug_struct("CreateObject")
                .field("reference", reference)
                .field("fresh_child_id", fresh_child_id)
                .field("strip_id", strip_id)
                .field("parameters", parameters)
                .finish(),
            Command::UpdateObject {
                reference,
                parameters,
            } => f
                .debug_struct("UpdateObject")
                .field("reference", reference)
                .field("parameters", parameters)
                .finish(),
            Command::UpdateObjectDirectly {
                reference,
                parameters,
            } => f
                .debug_struct("UpdateObjectDirectly")
                .field("reference", reference)
                .field("parameters", parameters)
                .finish(),
            Command::RemoveObject { reference } => f
                .debug_struct("RemoveObject")
                .field("reference", reference)
                .finish(),
            Command::GetObject { reference, .. } => f
                .debug_struct("GetObject")
                .field("reference", reference)
                .finish_non_exhaustive(),
            Command::ObserveObject { reference, .. } => f
                .debug_struct("ObserveObject")
                .field("reference", reference)
                .finish_non_exhaustive(),
            Command::StopObservingObject { reference } => f
                .debug_struct("StopObservingObject")
                .field("reference", reference)
                .finish(),
            Command::Search {
                query, key, value, ..
            } => f
                .debug_struct("Search")
                .field("query", &query.description())
                .field("key", key)
                .field("value", value)
                .finish_non_exhaustive(),
            Command::MonitorConnection => f.write_str("MonitorConnection"),
            Command::StopMonitorConnection => f.write_str("StopMonitorConnection"),
            Command::UploadData {
                content_type,
                destination,
                bytes,
                ..
            } => f
                .debug_struct("UploadData")
                .field("content_type", content_type)
                .field("destination", destination)
                .field("len", &bytes.len())
                .finish_non_exhaustive(),
            Command::UploadFromLocation {
                location,
                destination,
                ..
            } => f
                .debug_struct("UploadFromLocation")
                .field("location", location)
                .field("destination", destination)
                .finish_non_exhaustive(),
            Command::DeleteBlob { reference, .. } => f
                .debug_struct("DeleteBlob")
                .field("reference", reference)
                .finish_non_exhaustive(),
            Command::SendEmailVerification { user } => f
                .debug_struct("SendEmailVerification")
                .field("user", user)
                .finish(),
            Command::ReloadCurrentUser => f.write_str("ReloadCurrentUser"),
            Command::LogIn { email, .. } => f
                .debug_struct("LogIn")
                .field("email", email)
                .finish_non_exhaustive(),
            Command::SignUp { email, .. } => f
                .debug_struct("SignUp")
                .field("email", email)
                .finish_non_exhaustive(),
            Command::ChangePassword { .. } => f.write_str("ChangePassword"),
            Command::ChangeEmail { email } => f
                .debug_struct("ChangeEmail")
                .field("email", email)
                .finish(),
            Command::ResetPassword { email } => f
                .debug_struct("ResetPassword")
                .field("email", email)
                .finish(),
            Command::LogOut => f.write_str("LogOut"),
        }
    }
}
