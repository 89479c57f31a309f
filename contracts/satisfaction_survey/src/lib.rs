#![no_std]
#![allow(deprecated)] // events().publish migration tracked separately

pub mod aggregates;
pub mod coprocessor;
pub mod events;


use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Bytes, BytesN,
    Env, Symbol, Vec,
};

pub use aggregates::{Aggregates, Scope};
use coprocessor::Confidential;

// ── Storage keys ────────────────────────────────────────────────────────────────

const OWNER: Symbol = symbol_short!("OWNER");
const DEC_MGR: Symbol = symbol_short!("DEC_MGR");
pub(crate) const COPROCESSOR: Symbol = symbol_short!("COPROC");
pub(crate) const DEPARTMENT_COUNT: Symbol = symbol_short!("DEPT_CNT");

pub(crate) const TTL_THRESHOLD: u32 = 5_184_000;
pub(crate) const TTL_EXTEND_TO: u32 = 10_368_000;

/// Upper bound on the department table fixed at initialization.
pub const MAX_DEPARTMENTS: u32 = 32;

/// Identifier of the confidential-compute network this build targets.
pub const PROTOCOL_ID: u32 = 1;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Aggregates(Scope),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    InvalidDepartment = 4,
    InvalidDepartmentCount = 5,
    InvalidInputProof = 6,
    CoprocessorFailure = 7,
}

fn extend_ttl_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Contract ───────────────────────────────────────────────────────────────────

#[contract]
pub struct SatisfactionSurveyContract;

#[contractimpl]
impl SatisfactionSurveyContract {
    /// Records the owner, decrypt manager and coprocessor, and seeds Global
    /// and every department with encrypted-zero aggregates.
    pub fn initialize(
        env: Env,
        owner: Address,
        decrypt_manager: Address,
        coprocessor: Address,
        department_count: u32,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&OWNER) {
            return Err(ContractError::AlreadyInitialized);
        }
        if department_count == 0 || department_count > MAX_DEPARTMENTS {
            return Err(ContractError::InvalidDepartmentCount);
        }
        owner.require_auth();

        env.storage().instance().set(&OWNER, &owner);
        env.storage().instance().set(&DEC_MGR, &decrypt_manager);
        env.storage().instance().set(&COPROCESSOR, &coprocessor);
        env.storage()
            .instance()
            .set(&DEPARTMENT_COUNT, &department_count);
        extend_ttl_instance(&env);

        let fhe = Confidential::new(&env, &coprocessor);
        aggregates::seed(&env, &fhe, &Scope::Global, &decrypt_manager)?;
        for dept_id in 0..department_count {
            aggregates::seed(&env, &fhe, &Scope::Department(dept_id), &decrypt_manager)?;
        }

        events::publish_initialized(&env, owner, decrypt_manager, department_count);
        Ok(())
    }

    /// Folds one encrypted response into Global and `dept_id`.
    ///
    /// The score is not range-checked here: the submitting client is trusted
    /// to encrypt a value in 1..=10.
    pub fn submit_response(
        env: Env,
        submitter: Address,
        enc_score: BytesN<32>,
        score_proof: Bytes,
        dept_id: u32,
        enc_one: BytesN<32>,
        one_proof: Bytes,
    ) -> Result<(), ContractError> {
        submitter.require_auth();
        aggregates::require_department(&env, dept_id)?;
        let manager = Self::decrypt_manager(env.clone())?;

        let fhe = Confidential::load(&env)?;
        let score = fhe.verify(&submitter, &enc_score, &score_proof)?;
        let one = fhe.verify(&submitter, &enc_one, &one_proof)?;

        aggregates::accumulate(&env, &fhe, &Scope::Global, &score, &one, &manager)?;
        aggregates::accumulate(&env, &fhe, &Scope::Department(dept_id), &score, &one, &manager)?;
        extend_ttl_instance(&env);

        events::publish_response_submitted(&env, submitter, dept_id);
        Ok(())
    }

    pub fn get_global_aggregates(env: Env) -> Result<Aggregates, ContractError> {
        aggregates::load(&env, &Scope::Global)
    }

    pub fn get_department_aggregates(env: Env, dept_id: u32) -> Result<Aggregates, ContractError> {
        aggregates::require_department(&env, dept_id)?;
        aggregates::load(&env, &Scope::Department(dept_id))
    }

    /// Replaces the decrypt manager. Owner only.
    ///
    /// The new manager is put on the ACL of every current aggregate handle.
    pub fn set_decrypt_manager(
        env: Env,
        caller: Address,
        manager: Address,
    ) -> Result<(), ContractError> {
        Self::require_owner(&env, &caller)?;
        let previous = Self::decrypt_manager(env.clone())?;

        let fhe = Confidential::load(&env)?;
        aggregates::share(&fhe, &aggregates::load(&env, &Scope::Global)?, &manager)?;
        for dept_id in 0..aggregates::department_count(&env)? {
            let current = aggregates::load(&env, &Scope::Department(dept_id))?;
            aggregates::share(&fhe, &current, &manager)?;
        }

        env.storage().instance().set(&DEC_MGR, &manager);
        extend_ttl_instance(&env);

        events::publish_decrypt_manager_changed(&env, previous, manager);
        Ok(())
    }

    /// Lets `user` decrypt the current Global aggregates and those of every
    /// department in `dept_ids`. Decrypt manager or owner.
    ///
    /// Grants are additive and attach to the handles as they are now; a later
    /// submission produces new handles that need a new grant.
    pub fn allow_user_to_decrypt(
        env: Env,
        caller: Address,
        user: Address,
        dept_ids: Vec<u32>,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        if caller != Self::decrypt_manager(env.clone())? && caller != Self::owner(env.clone())? {
            return Err(ContractError::Unauthorized);
        }
        for dept_id in dept_ids.iter() {
            aggregates::require_department(&env, dept_id)?;
        }

        let fhe = Confidential::load(&env)?;
        aggregates::share(&fhe, &aggregates::load(&env, &Scope::Global)?, &user)?;
        for dept_id in dept_ids.iter() {
            let current = aggregates::load(&env, &Scope::Department(dept_id))?;
            aggregates::share(&fhe, &current, &user)?;
        }
        extend_ttl_instance(&env);

        events::publish_decrypt_access_granted(&env, user, dept_ids);
        Ok(())
    }

    pub fn decrypt_manager(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&DEC_MGR)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn owner(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&OWNER)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn department_count(env: Env) -> Result<u32, ContractError> {
        aggregates::department_count(&env)
    }

    pub fn coprocessor(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&COPROCESSOR)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn protocol_id(_env: Env) -> u32 {
        PROTOCOL_ID
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn require_owner(env: &Env, caller: &Address) -> Result<(), ContractError> {
        caller.require_auth();
        let owner = Self::owner(env.clone())?;
        if *caller != owner {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }
}
