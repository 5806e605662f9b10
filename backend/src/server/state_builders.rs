//! Builders wiring storage adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;

use eventhub::domain::ports::{
    CredentialHasher, EventRepository, RegistrationStore, UserRepository,
};
use eventhub::domain::{
    BootstrapError, BootstrapPlan, EnrollmentPolicy, EnrollmentService, PasswordAccountService,
    RosterService, bootstrap,
};
use eventhub::inbound::http::state::HttpState;
use eventhub::outbound::memory::InMemoryStore;
use eventhub::outbound::persistence::{
    DbPool, DieselEventRepository, DieselRegistrationStore, DieselUserRepository,
};

/// Where users, events, and registrations live.
pub(crate) enum Storage {
    Postgres(DbPool),
    Memory(Arc<InMemoryStore>),
}

/// Services and seeding inputs shared by every storage flavour.
pub(crate) struct Wiring<H> {
    pub(crate) hasher: Arc<H>,
    pub(crate) policy: EnrollmentPolicy,
    pub(crate) plan: BootstrapPlan,
}

/// Seed the store and build the handler state on top of it.
pub(crate) async fn build_http_state<H>(
    storage: &Storage,
    wiring: Wiring<H>,
) -> Result<web::Data<HttpState>, BootstrapError>
where
    H: CredentialHasher + 'static,
{
    match storage {
        Storage::Postgres(pool) => {
            assemble(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselEventRepository::new(pool.clone())),
                Arc::new(DieselRegistrationStore::new(pool.clone())),
                wiring,
            )
            .await
        }
        Storage::Memory(store) => {
            assemble(store.clone(), store.clone(), store.clone(), wiring).await
        }
    }
}

async fn assemble<U, E, R, H>(
    users: Arc<U>,
    events: Arc<E>,
    registrations: Arc<R>,
    wiring: Wiring<H>,
) -> Result<web::Data<HttpState>, BootstrapError>
where
    U: UserRepository + 'static,
    E: EventRepository + 'static,
    R: RegistrationStore + 'static,
    H: CredentialHasher + 'static,
{
    let Wiring {
        hasher,
        policy,
        plan,
    } = wiring;

    bootstrap(&plan, users.as_ref(), events.as_ref(), hasher.as_ref()).await?;

    let accounts = Arc::new(PasswordAccountService::new(users.clone(), hasher));
    let enrollment = Arc::new(EnrollmentService::new(
        users.clone(),
        events.clone(),
        registrations.clone(),
        policy,
    ));
    let rosters = Arc::new(RosterService::new(users, events, registrations));
    Ok(web::Data::new(HttpState::new(accounts, enrollment, rosters)))
}
