use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::coprocessor::Confidential;
use crate::{ContractError, DataKey, DEPARTMENT_COUNT, TTL_EXTEND_TO, TTL_THRESHOLD};

/// Aggregation bucket a response contributes to.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Scope {
    Global,
    Department(u32),
}

/// Encrypted running sum of scores and encrypted response count.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Aggregates {
    pub total: BytesN<32>,
    pub count: BytesN<32>,
}

pub fn department_count(env: &Env) -> Result<u32, ContractError> {
    env.storage()
        .instance()
        .get(&DEPARTMENT_COUNT)
        .ok_or(ContractError::NotInitialized)
}

pub fn require_department(env: &Env, dept_id: u32) -> Result<(), ContractError> {
    if dept_id >= department_count(env)? {
        return Err(ContractError::InvalidDepartment);
    }
    Ok(())
}

pub fn load(env: &Env, scope: &Scope) -> Result<Aggregates, ContractError> {
    let key = DataKey::Aggregates(scope.clone());
    let aggregates: Aggregates = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(ContractError::NotInitialized)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(aggregates)
}

fn store(env: &Env, scope: &Scope, aggregates: &Aggregates) {
    let key = DataKey::Aggregates(scope.clone());
    env.storage().persistent().set(&key, aggregates);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Seeds `scope` with an encrypted-zero pair readable by `manager`.
pub fn seed(
    env: &Env,
    fhe: &Confidential,
    scope: &Scope,
    manager: &Address,
) -> Result<(), ContractError> {
    let aggregates = Aggregates {
        total: fhe.zero()?,
        count: fhe.zero()?,
    };
    share(fhe, &aggregates, manager)?;
    store(env, scope, &aggregates);
    Ok(())
}

/// Adds one verified response into `scope`. Both new handles are shared with
/// `manager` so the decrypt manager can always read the latest state.
pub fn accumulate(
    env: &Env,
    fhe: &Confidential,
    scope: &Scope,
    score: &BytesN<32>,
    one: &BytesN<32>,
    manager: &Address,
) -> Result<(), ContractError> {
    let current = load(env, scope)?;
    let next = Aggregates {
        total: fhe.add(&current.total, score)?,
        count: fhe.add(&current.count, one)?,
    };
    share(fhe, &next, manager)?;
    store(env, scope, &next);
    Ok(())
}

pub fn share(fhe: &Confidential, aggregates: &Aggregates, account: &Address) -> Result<(), ContractError> {
    fhe.allow(&aggregates.total, account)?;
    fhe.allow(&aggregates.count, account)
}
