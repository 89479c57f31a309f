use soroban_sdk::{Address, BytesN, Env};

use crate::{CoprocessorError, DataKey, TTL_EXTEND_TO, TTL_THRESHOLD};

/// Records that `account` may compute on and decrypt `handle`.
///
/// Entries are never removed.
pub fn allow(env: &Env, handle: &BytesN<32>, account: &Address) {
    let key = DataKey::Acl(handle.clone(), account.clone());
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn is_allowed(env: &Env, handle: &BytesN<32>, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Acl(handle.clone(), account.clone()))
        .unwrap_or(false)
}

pub fn require_allowed(
    env: &Env,
    handle: &BytesN<32>,
    account: &Address,
) -> Result<(), CoprocessorError> {
    if !is_allowed(env, handle, account) {
        return Err(CoprocessorError::NotAllowed);
    }
    Ok(())
}
