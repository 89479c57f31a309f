use soroban_sdk::{Bytes, BytesN, Env};

use crate::{CoprocessorError, DataKey, TTL_EXTEND_TO, TTL_THRESHOLD};

/// Domain tags keep handles, proofs and grant ids from colliding even though
/// all three are drawn from the same sequence.
const HANDLE_TAG: &[u8] = b"HANDLE:";
const PROOF_TAG: &[u8] = b"PROOF:";
const GRANT_TAG: &[u8] = b"GRANT:";

/// Returns the next value of the monotone sequence backing every identifier
/// this coprocessor hands out.
fn next_sequence(env: &Env) -> u64 {
    let seq: u64 = env
        .storage()
        .instance()
        .get(&DataKey::Sequence)
        .unwrap_or(0)
        + 1;
    env.storage().instance().set(&DataKey::Sequence, &seq);
    seq
}

/// `H(tag ‖ seq_be)`.
fn tagged_digest(env: &Env, tag: &[u8], seq: u64) -> BytesN<32> {
    let mut data = Bytes::from_slice(env, tag);
    data.extend_from_array(&seq.to_be_bytes());
    env.crypto().sha256(&data).into()
}

pub fn is_zero_handle(handle: &BytesN<32>) -> bool {
    handle.to_array() == [0u8; 32]
}

/// Allocates a fresh handle and stores `value` behind it.
///
/// A SHA-256 output of all zeroes would be indistinguishable from the "no
/// data" sentinel readers use, so such a draw is skipped.
pub fn store_value(env: &Env, value: u32) -> BytesN<32> {
    let mut handle = tagged_digest(env, HANDLE_TAG, next_sequence(env));
    while is_zero_handle(&handle) {
        handle = tagged_digest(env, HANDLE_TAG, next_sequence(env));
    }
    let key = DataKey::Value(handle.clone());
    env.storage().persistent().set(&key, &value);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    handle
}

pub fn load_value(env: &Env, handle: &BytesN<32>) -> Result<u32, CoprocessorError> {
    env.storage()
        .persistent()
        .get(&DataKey::Value(handle.clone()))
        .ok_or(CoprocessorError::UnknownHandle)
}

pub fn new_proof(env: &Env) -> BytesN<32> {
    tagged_digest(env, PROOF_TAG, next_sequence(env))
}

pub fn new_grant_id(env: &Env) -> BytesN<32> {
    tagged_digest(env, GRANT_TAG, next_sequence(env))
}
