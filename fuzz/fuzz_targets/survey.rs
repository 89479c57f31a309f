#![no_main]

use arbitrary::Arbitrary;
use fhe_coprocessor::{FheCoprocessor, FheCoprocessorClient};
use libfuzzer_sys::fuzz_target;
use satisfaction_survey::{SatisfactionSurveyContract, SatisfactionSurveyContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    vec, Address, Bytes, BytesN, Env, Vec as SorobanVec,
};

const DEPARTMENTS: u32 = 5;

/// Survey entry points plus the ways a hostile submitter can tamper with
/// an encrypted input.
///
/// Department ids are taken modulo one past the table so out-of-range ids
/// are reached regularly.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Submit { score: u32, dept: u8 },
    SubmitForged { score: u32, dept: u8, proof: [u8; 4] },
    Replay { victim: u8, score: u32, dept: u8 },
    SwapHandles { score: u32, dept: u8 },
    SetManager { by_owner: bool, manager: u8 },
    Grant { viewer: u8, depts: std::vec::Vec<u8> },
    AdvanceTime { delta: u16 },
}

fuzz_target!(|actions: std::vec::Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let fhe_id = env.register(FheCoprocessor, ());
    let survey_id = env.register(SatisfactionSurveyContract, ());
    let fhe = FheCoprocessorClient::new(&env, &fhe_id);
    let survey = SatisfactionSurveyContractClient::new(&env, &survey_id);

    if survey
        .try_initialize(&owner, &owner, &fhe_id, &DEPARTMENTS)
        .is_err()
    {
        return;
    }

    let mut users = std::vec![owner.clone()];
    for _ in 0..4 {
        users.push(Address::generate(&env));
    }

    // Plaintext model: wrapping (total, count) for Global and each department.
    let mut global = (0u32, 0u32);
    let mut departments = [(0u32, 0u32); DEPARTMENTS as usize];

    for (i, action) in actions.into_iter().enumerate() {
        let caller = &users[i % users.len()];
        let dept_of = |d: u8| d as u32 % (DEPARTMENTS + 1);

        match action {
            FuzzAction::Submit { score, dept } => {
                let dept_id = dept_of(dept);
                let input = fhe.encrypt_input(caller, &survey_id, &vec![&env, score, 1u32]);
                let res = survey.try_submit_response(
                    caller,
                    &input.handles.get(0).unwrap(),
                    &input.proof,
                    &dept_id,
                    &input.handles.get(1).unwrap(),
                    &input.proof,
                );
                if dept_id < DEPARTMENTS {
                    assert!(res.is_ok(), "valid submission rejected: {:?}", res);
                    let add = |(t, c): (u32, u32)| (t.wrapping_add(score), c.wrapping_add(1));
                    global = add(global);
                    departments[dept_id as usize] = add(departments[dept_id as usize]);
                } else {
                    assert!(res.is_err(), "out-of-range department accepted");
                }
            }
            FuzzAction::SubmitForged { score, dept, proof } => {
                let input = fhe.encrypt_input(caller, &survey_id, &vec![&env, score, 1u32]);
                let forged = Bytes::from_slice(&env, &proof);
                let res = survey.try_submit_response(
                    caller,
                    &input.handles.get(0).unwrap(),
                    &forged,
                    &dept_of(dept),
                    &input.handles.get(1).unwrap(),
                    &input.proof,
                );
                assert!(res.is_err(), "forged proof accepted");
            }
            FuzzAction::Replay { victim, score, dept } => {
                let victim = &users[victim as usize % users.len()];
                if victim == caller {
                    continue;
                }
                let input = fhe.encrypt_input(victim, &survey_id, &vec![&env, score, 1u32]);
                let res = survey.try_submit_response(
                    caller,
                    &input.handles.get(0).unwrap(),
                    &input.proof,
                    &dept_of(dept),
                    &input.handles.get(1).unwrap(),
                    &input.proof,
                );
                assert!(res.is_err(), "input bound to another user accepted");
            }
            FuzzAction::SwapHandles { score, dept } => {
                // Score and count swapped: still verified, so it commits with
                // the roles reversed.
                let dept_id = dept_of(dept);
                let input = fhe.encrypt_input(caller, &survey_id, &vec![&env, score, 1u32]);
                let res = survey.try_submit_response(
                    caller,
                    &input.handles.get(1).unwrap(),
                    &input.proof,
                    &dept_id,
                    &input.handles.get(0).unwrap(),
                    &input.proof,
                );
                if res.is_ok() {
                    let add = |(t, c): (u32, u32)| (t.wrapping_add(1), c.wrapping_add(score));
                    global = add(global);
                    departments[dept_id as usize] = add(departments[dept_id as usize]);
                }
            }
            FuzzAction::SetManager { by_owner, manager } => {
                let manager = &users[manager as usize % users.len()];
                let from = if by_owner { &owner } else { caller };
                let res = survey.try_set_decrypt_manager(from, manager);
                assert_eq!(res.is_ok(), *from == owner, "manager change authorization");
            }
            FuzzAction::Grant { viewer, depts } => {
                let viewer = &users[viewer as usize % users.len()];
                let mut ids = SorobanVec::new(&env);
                for d in depts.iter().take(4) {
                    ids.push_back(dept_of(*d));
                }
                let manager = survey.decrypt_manager();
                let _ = survey.try_allow_user_to_decrypt(&manager, viewer, &ids);
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(delta as u64);
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let manager = survey.decrypt_manager();
        let grant = fhe.issue_decrypt_grant(&manager, &vec![&env, survey_id.clone()], &1);
        let reveal = |total: BytesN<32>, count: BytesN<32>| {
            let clear = fhe.user_decrypt(&manager, &survey_id, &vec![&env, total, count], &grant.id);
            (clear.get(0).unwrap(), clear.get(1).unwrap())
        };

        let g = survey.get_global_aggregates();
        assert_eq!(reveal(g.total, g.count), global, "INVARIANT VIOLATION: Global drifted");

        let mut sum = (0u32, 0u32);
        for dept_id in 0..DEPARTMENTS {
            let d = survey.get_department_aggregates(&dept_id);
            let pair = reveal(d.total, d.count);
            assert_eq!(
                pair, departments[dept_id as usize],
                "INVARIANT VIOLATION: department {} drifted", dept_id
            );
            sum = (sum.0.wrapping_add(pair.0), sum.1.wrapping_add(pair.1));
        }
        assert_eq!(sum, global, "INVARIANT VIOLATION: Global != sum(departments)");
    }
});
