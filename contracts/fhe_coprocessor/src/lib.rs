#![no_std]
#![allow(deprecated)] // events().publish migration tracked separately

//! In-ledger stand-in for the confidential-compute coprocessor.
//!
//! Values live in contract storage behind opaque 32-byte handles. The
//! contract reproduces the protocol surface a confidential-integer network
//! exposes to applications (input binding, homomorphic addition, an
//! append-only ACL and time-bounded user decryption) so that applications can
//! be deployed on local networks and exercised in tests. It performs no
//! encryption and must never hold real data.

pub mod acl;
pub mod grants;
pub mod handles;


use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Bytes, BytesN,
    Env, Vec,
};

pub use grants::DecryptGrant;

pub(crate) const TTL_THRESHOLD: u32 = 5_184_000;
pub(crate) const TTL_EXTEND_TO: u32 = 10_368_000;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Sequence,
    Value(BytesN<32>),
    Acl(BytesN<32>, Address),
    Input(BytesN<32>),
    Grant(BytesN<32>),
}

/// Result of client-side encryption: one handle per value plus a single proof
/// covering the whole batch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedInput {
    pub handles: Vec<BytesN<32>>,
    pub proof: Bytes,
}

/// The (contract, user) pair an input was encrypted for.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputBinding {
    pub contract: Address,
    pub user: Address,
    pub proof: Bytes,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum CoprocessorError {
    UnknownHandle = 1,
    NotAllowed = 2,
    InvalidProof = 3,
    BindingMismatch = 4,
    EmptyInput = 5,
    GrantNotFound = 6,
    GrantExpired = 7,
    InvalidDuration = 8,
}

#[contract]
pub struct FheCoprocessor;

#[contractimpl]
impl FheCoprocessor {
    /// Encrypts `values` for use by `contract` on behalf of `user`.
    pub fn encrypt_input(
        env: Env,
        user: Address,
        contract: Address,
        values: Vec<u32>,
    ) -> Result<EncryptedInput, CoprocessorError> {
        if values.is_empty() {
            return Err(CoprocessorError::EmptyInput);
        }

        let proof: Bytes = handles::new_proof(&env).into();
        let binding = InputBinding {
            contract,
            user,
            proof: proof.clone(),
        };

        let mut out = Vec::new(&env);
        for value in values.iter() {
            let handle = handles::store_value(&env, value);
            let key = DataKey::Input(handle.clone());
            env.storage().persistent().set(&key, &binding);
            env.storage()
                .persistent()
                .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
            out.push_back(handle);
        }

        Ok(EncryptedInput {
            handles: out,
            proof,
        })
    }

    /// Checks that `handle` was encrypted for (`caller`, `user`) under
    /// `proof`, then allows `caller` to compute on it.
    pub fn verify_input(
        env: Env,
        caller: Address,
        user: Address,
        handle: BytesN<32>,
        proof: Bytes,
    ) -> Result<BytesN<32>, CoprocessorError> {
        caller.require_auth();

        let binding: InputBinding = env
            .storage()
            .persistent()
            .get(&DataKey::Input(handle.clone()))
            .ok_or(CoprocessorError::UnknownHandle)?;

        if binding.proof != proof {
            return Err(CoprocessorError::InvalidProof);
        }
        if binding.contract != caller || binding.user != user {
            return Err(CoprocessorError::BindingMismatch);
        }

        acl::allow(&env, &handle, &caller);
        Ok(handle)
    }

    /// Returns a handle for the public constant `value`, allowed to `caller`.
    pub fn trivial_encrypt(env: Env, caller: Address, value: u32) -> BytesN<32> {
        caller.require_auth();
        let handle = handles::store_value(&env, value);
        acl::allow(&env, &handle, &caller);
        handle
    }

    /// Homomorphic addition. Wraps modulo 2^32.
    pub fn add(
        env: Env,
        caller: Address,
        lhs: BytesN<32>,
        rhs: BytesN<32>,
    ) -> Result<BytesN<32>, CoprocessorError> {
        caller.require_auth();
        acl::require_allowed(&env, &lhs, &caller)?;
        acl::require_allowed(&env, &rhs, &caller)?;

        let sum = handles::load_value(&env, &lhs)?.wrapping_add(handles::load_value(&env, &rhs)?);
        let handle = handles::store_value(&env, sum);
        acl::allow(&env, &handle, &caller);
        Ok(handle)
    }

    /// Extends the ACL of `handle` to `account`. Only an account already on
    /// the ACL may do so.
    pub fn allow(
        env: Env,
        caller: Address,
        handle: BytesN<32>,
        account: Address,
    ) -> Result<(), CoprocessorError> {
        caller.require_auth();
        handles::load_value(&env, &handle)?;
        acl::require_allowed(&env, &handle, &caller)?;
        acl::allow(&env, &handle, &account);
        Ok(())
    }

    pub fn is_allowed(env: Env, handle: BytesN<32>, account: Address) -> bool {
        acl::is_allowed(&env, &handle, &account)
    }

    /// Issues the viewer-signed authorization that user decryption requires.
    pub fn issue_decrypt_grant(
        env: Env,
        viewer: Address,
        contracts: Vec<Address>,
        duration_days: u32,
    ) -> Result<DecryptGrant, CoprocessorError> {
        viewer.require_auth();
        let grant = grants::issue(&env, &viewer, contracts, duration_days)?;
        env.events().publish(
            (symbol_short!("DEC_GRANT"), viewer),
            (grant.id.clone(), grant.expires_at()),
        );
        Ok(grant)
    }

    /// Reveals `handles` to `viewer`. Both the viewer and `contract` must be
    /// on every handle's ACL, and the grant must be live.
    pub fn user_decrypt(
        env: Env,
        viewer: Address,
        contract: Address,
        handles: Vec<BytesN<32>>,
        grant_id: BytesN<32>,
    ) -> Result<Vec<u32>, CoprocessorError> {
        viewer.require_auth();
        grants::require_valid(&env, &grant_id, &viewer, &contract)?;

        let mut out = Vec::new(&env);
        for handle in handles.iter() {
            acl::require_allowed(&env, &handle, &viewer)?;
            acl::require_allowed(&env, &handle, &contract)?;
            out.push_back(handles::load_value(&env, &handle)?);
        }
        Ok(out)
    }
}
