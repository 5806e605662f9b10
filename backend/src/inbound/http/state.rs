//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountService, EnrollmentCommand, RosterQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub enrollment: Arc<dyn EnrollmentCommand>,
    pub rosters: Arc<dyn RosterQuery>,
}

impl HttpState {
    /// Construct state from the three driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use eventhub::domain::{
    ///     EnrollmentPolicy, EnrollmentService, PasswordAccountService, RosterService,
    /// };
    /// use eventhub::inbound::http::state::HttpState;
    /// use eventhub::outbound::credentials::BcryptCredentialHasher;
    /// use eventhub::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::default());
    /// let state = HttpState::new(
    ///     Arc::new(PasswordAccountService::new(
    ///         store.clone(),
    ///         Arc::new(BcryptCredentialHasher::default()),
    ///     )),
    ///     Arc::new(EnrollmentService::new(
    ///         store.clone(),
    ///         store.clone(),
    ///         store.clone(),
    ///         EnrollmentPolicy::default(),
    ///     )),
    ///     Arc::new(RosterService::new(store.clone(), store.clone(), store)),
    /// );
    /// # let _ = state;
    /// ```
    pub fn new(
        accounts: Arc<dyn AccountService>,
        enrollment: Arc<dyn EnrollmentCommand>,
        rosters: Arc<dyn RosterQuery>,
    ) -> Self {
        Self {
            accounts,
            enrollment,
            rosters,
        }
    }
}
