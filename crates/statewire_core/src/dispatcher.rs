//! The dispatcher: single entry point for commands and events.

use crate::auth::{AuthSessionManager, IdentityProvider};
use crate::blob::BlobStore;
use crate::command::Command;
use crate::event::{Event, EventBus, EventSink};
use crate::merge::flatten_update;
use crate::monitor::ConnectionMonitor;
use crate::store::{ObserverHandle, RemoteStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes commands against the remote collaborators and publishes events
/// to all interested consumers.
///
/// The dispatcher is the sole seam between the application and the remote
/// service: effects flow in through [`fire_command`](Self::fire_command),
/// notifications flow out through [`fire_event`](Self::fire_event) and the
/// bus. It holds no command queue and imposes no ordering across commands
/// beyond what the remote collaborator guarantees for a single reference.
/// No failure escapes as a panic; everything becomes a callback argument,
/// an event, or a logged write error.
pub struct Dispatcher<T> {
    store: Arc<dyn RemoteStore>,
    blobs: Arc<dyn BlobStore>,
    bus: Arc<EventBus<T>>,
    auth: AuthSessionManager,
    monitor: ConnectionMonitor,
    observers: Mutex<HashMap<String, Vec<ObserverHandle>>>,
}

impl<T> Dispatcher<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a dispatcher over the three remote collaborators.
    pub fn new(
        store: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            store,
            blobs,
            bus: Arc::new(EventBus::new()),
            auth: AuthSessionManager::new(identity),
            monitor: ConnectionMonitor::new(),
            observers: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribes to the event stream.
    pub fn subscribe(&self) -> Receiver<Event<T>> {
        self.bus.subscribe()
    }

    /// Returns the remote store, for subscription records declared by
    /// state slices.
    pub fn store(&self) -> Arc<dyn RemoteStore> {
        Arc::clone(&self.store)
    }

    /// Returns the event sink commands and managers publish through.
    pub fn event_sink(&self) -> Arc<dyn EventSink<T>> {
        Arc::clone(&self.bus) as Arc<dyn EventSink<T>>
    }

    /// Publishes exactly one event to all current subscribers.
    pub fn fire_event(&self, event: Event<T>) {
        self.bus.emit(event);
    }

    /// Executes exactly one command's side effect.
    ///
    /// Returns once the side effect has been handed to the collaborator;
    /// completion, if any, arrives later via the command's own callback or
    /// an emitted event.
    pub fn fire_command(&self, command: Command) {
        debug!(command = command.name(), "dispatching");
        match command {
            Command::CreateObject {
                reference,
                fresh_child_id,
                strip_id,
                mut parameters,
            } => {
                let target = if fresh_child_id {
                    reference.push_child()
                } else {
                    reference
                };
                if strip_id {
                    parameters.remove("id");
                }
                if let Err(error) = self.store.set_value(&target, parameters) {
                    warn!(path = %target, %error, "create failed");
                }
            }
            Command::UpdateObject {
                reference,
                parameters,
            } => {
                for (target, values) in flatten_update(&reference, &parameters) {
                    if let Err(error) = self.store.update_children(&target, values) {
                        warn!(path = %target, %error, "partial update failed");
                    }
                }
            }
            Command::UpdateObjectDirectly {
                reference,
                parameters,
            } => {
                if let Err(error) = self.store.update_children(&reference, parameters) {
                    warn!(path = %reference, %error, "direct update failed");
                }
            }
            Command::RemoveObject { reference } => {
                if let Err(error) = self.store.remove_value(&reference) {
                    warn!(path = %reference, %error, "remove failed");
                }
            }
            Command::GetObject {
                reference,
                completion,
            } => {
                self.store.read_once(
                    &reference,
                    Box::new(move |snapshot| completion(snapshot.normalized())),
                );
            }
            Command::ObserveObject {
                reference,
                mut completion,
            } => {
                let id = self.store.observe_value(
                    &reference,
                    Box::new(move |snapshot| completion(snapshot.normalized())),
                );
                let handle = ObserverHandle::new(Arc::clone(&self.store), id, reference.clone());
                self.observers
                    .lock()
                    .entry(reference.path().to_owned())
                    .or_default()
                    .push(handle);
                self.fire_event(Event::ObjectObserved {
                    path: reference.to_string(),
                    observed: true,
                });
            }
            Command::StopObservingObject { reference } => {
                // Dropping the handles removes the tracked listeners; the
                // store-level sweep covers observers registered outside
                // command dispatch.
                drop(self.observers.lock().remove(reference.path()));
                self.store.remove_observers(&reference);
                self.fire_event(Event::ObjectObserved {
                    path: reference.to_string(),
                    observed: false,
                });
            }
            Command::Search {
                query,
                key,
                value,
                completion,
            } => {
                self.store.search(
                    &query,
                    &key,
                    value,
                    Box::new(move |snapshot| completion(snapshot.normalized())),
                );
            }
            Command::MonitorConnection => {
                self.monitor.start(&self.store, &self.event_sink());
            }
            Command::StopMonitorConnection => {
                self.monitor.stop(self.store.as_ref());
            }
            Command::UploadData {
                bytes,
                content_type,
                destination,
                completion,
            } => {
                self.blobs
                    .put_bytes(bytes, &content_type, &destination, completion);
            }
            Command::UploadFromLocation {
                location,
                destination,
                completion,
            } => {
                self.blobs.put_file(&location, &destination, completion);
            }
            Command::DeleteBlob {
                reference,
                completion,
            } => {
                self.blobs.delete(&reference, completion);
            }
            Command::SendEmailVerification { user } => {
                self.auth.send_email_verification(user, &*self.bus);
            }
            Command::ReloadCurrentUser => {
                self.auth.reload_current_user(&*self.bus);
            }
            Command::LogIn { email, password } => {
                self.auth.log_in(&email, &password, &*self.bus);
            }
            Command::SignUp {
                email,
                password,
                completion,
            } => {
                self.auth.sign_up(&email, &password, completion, &*self.bus);
            }
            Command::ChangePassword { password } => {
                self.auth.change_password(&password, &*self.bus);
            }
            Command::ChangeEmail { email } => {
                self.auth.change_email(&email, &*self.bus);
            }
            Command::ResetPassword { email } => {
                self.auth.reset_password(&email, &*self.bus);
            }
            Command::LogOut => {
                self.auth.log_out(&*self.bus);
            }
        }
    }
}
