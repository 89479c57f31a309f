//! Seams between the client and the outside world: the survey contract, the
//! coprocessor's encryption endpoint and its decryption protocol.

use soroban_sdk::{Address, Bytes, BytesN};

use crate::error::ClientError;

const SECONDS_PER_DAY: u64 = 86_400;

pub fn is_zero_handle(handle: &BytesN<32>) -> bool {
    handle.to_array() == [0u8; 32]
}

/// Ciphertext handles for one scope's `(total, count)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeHandles {
    pub total: BytesN<32>,
    pub count: BytesN<32>,
}

impl ScopeHandles {
    /// `false` when either handle is the all-zero sentinel.
    pub fn has_data(&self) -> bool {
        !is_zero_handle(&self.total) && !is_zero_handle(&self.count)
    }
}

/// Output of client-side encryption: handles plus one proof for the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBatch {
    pub handles: Vec<BytesN<32>>,
    pub proof: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub submitter: Address,
    pub enc_score: BytesN<32>,
    pub score_proof: Bytes,
    pub dept_id: u32,
    pub enc_one: BytesN<32>,
    pub one_proof: Bytes,
}

/// Proof that a submission committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub submitter: Address,
    pub dept_id: u32,
    pub ledger_sequence: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkContext {
    pub network_id: [u8; 32],
    pub now: u64,
}

/// A viewer's authorization to decrypt, valid for `duration_days` from
/// `start` on one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptAuthorization {
    pub token: BytesN<32>,
    pub viewer: Address,
    pub network_id: [u8; 32],
    pub start: u64,
    pub duration_days: u32,
}

impl DecryptAuthorization {
    pub fn expires_at(&self) -> u64 {
        self.start
            .saturating_add((self.duration_days as u64).saturating_mul(SECONDS_PER_DAY))
    }

    pub fn is_usable(&self, viewer: &Address, network: &NetworkContext) -> bool {
        self.viewer == *viewer
            && self.network_id == network.network_id
            && network.now >= self.start
            && network.now < self.expires_at()
    }
}

pub trait SurveyLedger {
    fn survey_address(&self) -> Address;

    fn submit_response(&self, submission: &Submission) -> Result<SubmissionReceipt, ClientError>;

    fn global_aggregates(&self) -> Result<ScopeHandles, ClientError>;

    fn department_aggregates(&self, dept_id: u32) -> Result<ScopeHandles, ClientError>;
}

pub trait InputEncryptor {
    /// Encrypts `values` so that only `contract`, acting for `user`, can
    /// consume them.
    fn encrypt(
        &self,
        contract: &Address,
        user: &Address,
        values: &[u32],
    ) -> Result<EncryptedBatch, ClientError>;
}

pub trait DecryptionGateway {
    fn network(&self) -> NetworkContext;

    fn authorize(
        &self,
        viewer: &Address,
        contract: &Address,
        validity_days: u32,
    ) -> Result<DecryptAuthorization, ClientError>;

    /// Returns one plaintext per handle, in order.
    fn user_decrypt(
        &self,
        viewer: &Address,
        contract: &Address,
        handles: &[BytesN<32>],
        authorization: &DecryptAuthorization,
    ) -> Result<Vec<u32>, ClientError>;
}
