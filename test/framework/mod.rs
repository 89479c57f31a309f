//! # Survey Contract Testing Framework
//!
//! Reusable harness for property-based testing of the satisfaction survey
//! against the stand-in coprocessor.
//!
//! ## Architecture
//!
//! ```text
//! test/framework/
//! ├── mod.rs         TestEnv, SurveyTestHarness, snapshots, plaintext model
//! ├── generators.rs  proptest strategies for ratings, departments, actions
//! └── invariants.rs  aggregate invariants checked after every action
//! ```
//!
//! Every committed submission is mirrored into an [`ExpectedTally`]; a
//! [`SurveySnapshot`] decrypts the live aggregates through the decrypt
//! manager so invariants can compare ciphertext state against the model.

#![allow(clippy::unwrap_used, clippy::expect_used)]

extern crate std;

pub mod generators;

use fhe_coprocessor::{CoprocessorError, FheCoprocessor, FheCoprocessorClient};
use satisfaction_survey::{
    Aggregates, ContractError, SatisfactionSurveyContract, SatisfactionSurveyContractClient,
};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    vec, Address, Bytes, Env,
};

use generators::SurveyAction;

// ── Core Test Environment ────────────────────────────────────────────────────

/// Wraps the Soroban `Env` with address management and time control.
pub struct TestEnv {
    pub env: Env,
    generated_addresses: std::vec::Vec<Address>,
}

impl TestEnv {
    /// Create a new test environment with all auth mocked.
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        Self {
            env,
            generated_addresses: std::vec::Vec::new(),
        }
    }

    pub fn generate_address(&mut self) -> Address {
        let addr = Address::generate(&self.env);
        self.generated_addresses.push(addr.clone());
        addr
    }

    /// Generate `n` distinct addresses.
    pub fn generate_addresses(&mut self, n: usize) -> std::vec::Vec<Address> {
        (0..n).map(|_| self.generate_address()).collect()
    }

    pub fn set_timestamp(&self, ts: u64) {
        self.env.ledger().set_timestamp(ts);
    }

    /// Advance the ledger timestamp by `delta` seconds.
    pub fn advance_time(&self, delta: u64) {
        let current = self.env.ledger().timestamp();
        self.env.ledger().set_timestamp(current.saturating_add(delta));
    }

    pub fn timestamp(&self) -> u64 {
        self.env.ledger().timestamp()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

// ── Plaintext Model ──────────────────────────────────────────────────────────

/// Plaintext mirror of what the encrypted aggregates should decrypt to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedTally {
    pub global: (u32, u32),
    pub departments: std::vec::Vec<(u32, u32)>,
    pub accepted: usize,
}

impl ExpectedTally {
    pub fn new(department_count: u32) -> Self {
        Self {
            global: (0, 0),
            departments: std::vec![(0, 0); department_count as usize],
            accepted: 0,
        }
    }

    /// Encrypted 32-bit arithmetic wraps, so the model does too.
    pub fn record(&mut self, score: u32, dept_id: u32) {
        let add = |(total, count): (u32, u32)| (total.wrapping_add(score), count.wrapping_add(1));
        self.global = add(self.global);
        let slot = &mut self.departments[dept_id as usize];
        *slot = add(*slot);
        self.accepted += 1;
    }
}

// ── Survey Harness ───────────────────────────────────────────────────────────

/// Survey and coprocessor deployed together, with an owner that starts out
/// as decrypt manager.
pub struct SurveyTestHarness<'a> {
    pub env: &'a mut TestEnv,
    pub survey: SatisfactionSurveyContractClient<'static>,
    pub fhe: FheCoprocessorClient<'static>,
    pub owner: Address,
    pub department_count: u32,
    pub expected: ExpectedTally,
}

impl<'a> SurveyTestHarness<'a> {
    pub fn new(env: &'a mut TestEnv, department_count: u32) -> Self {
        let fhe_id = env.env.register(FheCoprocessor, ());
        let survey_id = env.env.register(SatisfactionSurveyContract, ());
        let fhe = FheCoprocessorClient::new(&env.env, &fhe_id);
        let survey = SatisfactionSurveyContractClient::new(&env.env, &survey_id);
        let owner = env.generate_address();

        survey.initialize(&owner, &owner, &fhe_id, &department_count);

        Self {
            env,
            survey,
            fhe,
            owner,
            department_count,
            expected: ExpectedTally::new(department_count),
        }
    }

    /// Encrypts `score` for `user` and submits it. Mirrors the submission
    /// into the model when it commits.
    pub fn submit(&mut self, user: &Address, score: u32, dept_id: u32) -> ActionOutcome {
        let input = self
            .fhe
            .encrypt_input(user, &self.survey.address, &vec![&self.env.env, score, 1u32]);
        let outcome = outcome_of(self.survey.try_submit_response(
            user,
            &input.handles.get(0).unwrap(),
            &input.proof,
            &dept_id,
            &input.handles.get(1).unwrap(),
            &input.proof,
        ));
        if outcome == ActionOutcome::Ok {
            self.expected.record(score, dept_id);
        }
        outcome
    }

    /// Submits with a forged count proof. Must never commit.
    pub fn submit_forged(&mut self, user: &Address, score: u32, dept_id: u32) -> ActionOutcome {
        let input = self
            .fhe
            .encrypt_input(user, &self.survey.address, &vec![&self.env.env, score, 1u32]);
        let forged = Bytes::from_array(&self.env.env, &[0xEE; 32]);
        outcome_of(self.survey.try_submit_response(
            user,
            &input.handles.get(0).unwrap(),
            &input.proof,
            &dept_id,
            &input.handles.get(1).unwrap(),
            &forged,
        ))
    }

    /// `attacker` submits a ciphertext that was encrypted for `victim`.
    pub fn submit_replayed(
        &mut self,
        victim: &Address,
        attacker: &Address,
        score: u32,
        dept_id: u32,
    ) -> ActionOutcome {
        let input = self
            .fhe
            .encrypt_input(victim, &self.survey.address, &vec![&self.env.env, score, 1u32]);
        outcome_of(self.survey.try_submit_response(
            attacker,
            &input.handles.get(0).unwrap(),
            &input.proof,
            &dept_id,
            &input.handles.get(1).unwrap(),
            &input.proof,
        ))
    }

    pub fn set_decrypt_manager(&mut self, caller: &Address, manager: &Address) -> ActionOutcome {
        outcome_of(self.survey.try_set_decrypt_manager(caller, manager))
    }

    pub fn grant(&mut self, viewer: &Address, dept_ids: &[u32]) -> ActionOutcome {
        let caller = self.survey.decrypt_manager();
        let ids = soroban_sdk::Vec::from_slice(&self.env.env, dept_ids);
        outcome_of(self.survey.try_allow_user_to_decrypt(&caller, viewer, &ids))
    }

    /// Decrypts one scope's pair as `viewer`.
    pub fn decrypt(
        &self,
        viewer: &Address,
        aggregates: &Aggregates,
    ) -> Result<(u32, u32), CoprocessorError> {
        let contracts = vec![&self.env.env, self.survey.address.clone()];
        let grant = self.fhe.issue_decrypt_grant(viewer, &contracts, &1);
        let handles = vec![
            &self.env.env,
            aggregates.total.clone(),
            aggregates.count.clone(),
        ];
        match self
            .fhe
            .try_user_decrypt(viewer, &self.survey.address, &handles, &grant.id)
        {
            Ok(Ok(clear)) => Ok((clear.get(0).unwrap(), clear.get(1).unwrap())),
            Err(Ok(e)) => Err(e),
            other => panic!("unexpected decrypt result: {other:?}"),
        }
    }

    /// Applies `action`, resolving user indices against `users`.
    pub fn apply(&mut self, action: &SurveyAction, users: &[Address]) -> ActionOutcome {
        let user = |i: usize| users[i % users.len()].clone();
        match action {
            SurveyAction::Submit {
                user_index,
                score,
                dept_id,
            } => self.submit(&user(*user_index), *score, *dept_id),
            SurveyAction::SubmitForged {
                user_index,
                score,
                dept_id,
            } => self.submit_forged(&user(*user_index), *score, *dept_id),
            SurveyAction::Replay {
                victim_index,
                attacker_index,
                score,
                dept_id,
            } => {
                let (victim, attacker) = (user(*victim_index), user(*attacker_index));
                if victim == attacker {
                    return self.submit(&victim, *score, *dept_id);
                }
                self.submit_replayed(&victim, &attacker, *score, *dept_id)
            }
            SurveyAction::SetManager {
                by_owner,
                caller_index,
                manager_index,
            } => {
                let caller = if *by_owner {
                    self.owner.clone()
                } else {
                    user(*caller_index)
                };
                self.set_decrypt_manager(&caller, &user(*manager_index))
            }
            SurveyAction::Grant {
                viewer_index,
                dept_ids,
            } => self.grant(&user(*viewer_index), dept_ids),
        }
    }

    /// Decrypts every scope as the current decrypt manager.
    pub fn snapshot(&self) -> SurveySnapshot {
        let manager = self.survey.decrypt_manager();
        let global_handles = self.survey.get_global_aggregates();
        let global = self
            .decrypt(&manager, &global_handles)
            .expect("decrypt manager can always read Global");

        let mut departments = std::vec::Vec::new();
        let mut department_handles = std::vec::Vec::new();
        for dept_id in 0..self.department_count {
            let handles = self.survey.get_department_aggregates(&dept_id);
            departments.push(
                self.decrypt(&manager, &handles)
                    .expect("decrypt manager can always read departments"),
            );
            department_handles.push(handles);
        }

        SurveySnapshot {
            timestamp: self.env.timestamp(),
            global,
            departments,
            global_handles,
            department_handles,
            expected: self.expected.clone(),
        }
    }
}

fn outcome_of<T, C, I: core::fmt::Debug>(
    result: Result<Result<T, C>, Result<ContractError, I>>,
) -> ActionOutcome {
    match result {
        Ok(Ok(_)) => ActionOutcome::Ok,
        Ok(Err(_)) => ActionOutcome::UnexpectedError("return value conversion failed".into()),
        Err(Ok(e)) => ActionOutcome::ExpectedError(e as u32),
        Err(Err(e)) => ActionOutcome::UnexpectedError(std::format!("{e:?}")),
    }
}

/// Decrypted survey state plus the model it is expected to match.
#[derive(Debug, Clone)]
pub struct SurveySnapshot {
    pub timestamp: u64,
    pub global: (u32, u32),
    pub departments: std::vec::Vec<(u32, u32)>,
    pub global_handles: Aggregates,
    pub department_handles: std::vec::Vec<Aggregates>,
    pub expected: ExpectedTally,
}

impl SurveySnapshot {
    /// Wrapping sums of all department `(total, count)` pairs.
    pub fn sum_departments(&self) -> (u32, u32) {
        self.departments
            .iter()
            .fold((0u32, 0u32), |(t, c), (dt, dc)| {
                (t.wrapping_add(*dt), c.wrapping_add(*dc))
            })
    }
}

// ── Test Outcome Tracking ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Ok,
    /// The contract rejected the call with this error code.
    ExpectedError(u32),
    UnexpectedError(std::string::String),
}

/// Summary of a property run.
#[derive(Debug, Clone, Default)]
pub struct TestRunSummary {
    pub actions_executed: usize,
    pub actions_rejected: usize,
    pub invariant_checks: usize,
    pub invariant_violations: std::vec::Vec<std::string::String>,
}

impl TestRunSummary {
    pub fn passed(&self) -> bool {
        self.invariant_violations.is_empty()
    }
}
