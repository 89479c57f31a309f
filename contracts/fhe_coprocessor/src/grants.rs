use soroban_sdk::{contracttype, Address, BytesN, Env, Vec};

use crate::handles::new_grant_id;
use crate::{CoprocessorError, DataKey, TTL_EXTEND_TO, TTL_THRESHOLD};

pub const SECONDS_PER_DAY: u64 = 86_400;
pub const MAX_GRANT_DAYS: u32 = 365;

/// A viewer's time-bounded permission to run user decryption against the
/// listed contracts.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptGrant {
    pub id: BytesN<32>,
    pub viewer: Address,
    pub contracts: Vec<Address>,
    pub start: u64,
    pub duration_days: u32,
}

impl DecryptGrant {
    pub fn expires_at(&self) -> u64 {
        self.start
            .saturating_add((self.duration_days as u64).saturating_mul(SECONDS_PER_DAY))
    }

    pub fn covers(&self, contract: &Address) -> bool {
        self.contracts.iter().any(|c| c == *contract)
    }
}

pub fn issue(
    env: &Env,
    viewer: &Address,
    contracts: Vec<Address>,
    duration_days: u32,
) -> Result<DecryptGrant, CoprocessorError> {
    if duration_days == 0 || duration_days > MAX_GRANT_DAYS {
        return Err(CoprocessorError::InvalidDuration);
    }
    if contracts.is_empty() {
        return Err(CoprocessorError::EmptyInput);
    }

    let grant = DecryptGrant {
        id: new_grant_id(env),
        viewer: viewer.clone(),
        contracts,
        start: env.ledger().timestamp(),
        duration_days,
    };
    let key = DataKey::Grant(grant.id.clone());
    env.storage().persistent().set(&key, &grant);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(grant)
}

/// Loads the grant and checks it authorizes `viewer` against `contract` at
/// the current ledger time.
pub fn require_valid(
    env: &Env,
    grant_id: &BytesN<32>,
    viewer: &Address,
    contract: &Address,
) -> Result<DecryptGrant, CoprocessorError> {
    let grant: DecryptGrant = env
        .storage()
        .persistent()
        .get(&DataKey::Grant(grant_id.clone()))
        .ok_or(CoprocessorError::GrantNotFound)?;

    if grant.viewer != *viewer || !grant.covers(contract) {
        return Err(CoprocessorError::NotAllowed);
    }
    let now = env.ledger().timestamp();
    if now < grant.start || now >= grant.expires_at() {
        return Err(CoprocessorError::GrantExpired);
    }
    Ok(grant)
}
