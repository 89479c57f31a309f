use soroban_sdk::{symbol_short, Address, Env, Vec};

/// Event published when the survey is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub decrypt_manager: Address,
    pub department_count: u32,
    pub timestamp: u64,
}

/// Event published for every accepted response. Carries the department,
/// never the score.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseSubmittedEvent {
    pub submitter: Address,
    pub dept_id: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptManagerChangedEvent {
    pub previous: Address,
    pub current: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptAccessGrantedEvent {
    pub user: Address,
    pub dept_ids: Vec<u32>,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, owner: Address, decrypt_manager: Address, department_count: u32) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        owner,
        decrypt_manager,
        department_count,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_response_submitted(env: &Env, submitter: Address, dept_id: u32) {
    let topics = (symbol_short!("SUBMIT"), submitter.clone());
    let data = ResponseSubmittedEvent {
        submitter,
        dept_id,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_decrypt_manager_changed(env: &Env, previous: Address, current: Address) {
    let topics = (symbol_short!("DEC_MGR"),);
    let data = DecryptManagerChangedEvent {
        previous,
        current,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_decrypt_access_granted(env: &Env, user: Address, dept_ids: Vec<u32>) {
    let topics = (symbol_short!("DEC_ALLOW"), user.clone());
    let data = DecryptAccessGrantedEvent {
        user,
        dept_ids,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
