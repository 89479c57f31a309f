use soroban_sdk::{Address, Bytes, BytesN, Env};

use crate::{ContractError, COPROCESSOR};

/// Surface of the confidential-compute coprocessor this contract relies on.
///
/// Every call names the contract acting on the ciphertext as `caller`; the
/// coprocessor checks it against the handle ACL.
#[soroban_sdk::contractclient(name = "CoprocessorClient")]
#[allow(dead_code)]
pub trait CoprocessorInterface {
    fn verify_input(
        env: Env,
        caller: Address,
        user: Address,
        handle: BytesN<32>,
        proof: Bytes,
    ) -> BytesN<32>;

    fn trivial_encrypt(env: Env, caller: Address, value: u32) -> BytesN<32>;

    fn add(env: Env, caller: Address, lhs: BytesN<32>, rhs: BytesN<32>) -> BytesN<32>;

    fn allow(env: Env, caller: Address, handle: BytesN<32>, account: Address);
}

/// The coprocessor as seen from inside this contract.
pub struct Confidential<'a> {
    client: CoprocessorClient<'a>,
    this: Address,
}

impl<'a> Confidential<'a> {
    pub fn load(env: &'a Env) -> Result<Self, ContractError> {
        let address: Address = env
            .storage()
            .instance()
            .get(&COPROCESSOR)
            .ok_or(ContractError::NotInitialized)?;
        Ok(Self::new(env, &address))
    }

    pub fn new(env: &'a Env, address: &Address) -> Self {
        Self {
            client: CoprocessorClient::new(env, address),
            this: env.current_contract_address(),
        }
    }

    /// Encrypted zero, usable by this contract.
    pub fn zero(&self) -> Result<BytesN<32>, ContractError> {
        match self.client.try_trivial_encrypt(&self.this, &0u32) {
            Ok(Ok(handle)) => Ok(handle),
            _ => Err(ContractError::CoprocessorFailure),
        }
    }

    /// Accepts an external ciphertext encrypted for this contract by `user`.
    pub fn verify(
        &self,
        user: &Address,
        handle: &BytesN<32>,
        proof: &Bytes,
    ) -> Result<BytesN<32>, ContractError> {
        match self.client.try_verify_input(&self.this, user, handle, proof) {
            Ok(Ok(verified)) => Ok(verified),
            _ => Err(ContractError::InvalidInputProof),
        }
    }

    pub fn add(&self, lhs: &BytesN<32>, rhs: &BytesN<32>) -> Result<BytesN<32>, ContractError> {
        match self.client.try_add(&self.this, lhs, rhs) {
            Ok(Ok(sum)) => Ok(sum),
            _ => Err(ContractError::CoprocessorFailure),
        }
    }

    pub fn allow(&self, handle: &BytesN<32>, account: &Address) -> Result<(), ContractError> {
        match self.client.try_allow(&self.this, handle, account) {
            Ok(Ok(())) => Ok(()),
            _ => Err(ContractError::CoprocessorFailure),
        }
    }
}
