//! # Property-Based Test Generators
//!
//! `proptest` strategies for survey inputs and action sequences.
//!
//! - Ratings are biased toward the 1 and 10 boundaries.
//! - The contract does not range-check scores, so a separate strategy yields
//!   out-of-band values including `u32::MAX` to exercise wrapping.
//! - Action sequences are dominated by honest submissions, with forged and
//!   replayed inputs and admin calls mixed in at low weight.

extern crate std;

use proptest::prelude::*;
use std::vec::Vec;

// ── Scalar Generators ────────────────────────────────────────────────────────

/// Ratings a well-behaved client would send.
pub fn rating_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        1 => Just(1u32),
        1 => Just(10u32),
        8 => (1u32..=10u32),
    ]
}

/// Scores a misbehaving client could encrypt.
pub fn unchecked_score_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        2 => Just(0u32),
        3 => (11u32..=1_000u32),
        1 => Just(u32::MAX),
    ]
}

pub fn department_strategy(department_count: u32) -> impl Strategy<Value = u32> {
    0..department_count
}

/// Department ids at or past the configured table.
pub fn invalid_department_strategy(department_count: u32) -> impl Strategy<Value = u32> {
    prop_oneof![
        3 => Just(department_count),
        1 => (department_count..=u32::MAX),
    ]
}

// ── Action Generators ────────────────────────────────────────────────────────

/// Every survey interaction the state model understands.
///
/// User indices select from a pool of test users (modular indexing).
#[derive(Debug, Clone)]
pub enum SurveyAction {
    Submit {
        user_index: usize,
        score: u32,
        dept_id: u32,
    },
    /// Valid score proof, forged count proof.
    SubmitForged {
        user_index: usize,
        score: u32,
        dept_id: u32,
    },
    /// Attacker submits a ciphertext encrypted for the victim.
    Replay {
        victim_index: usize,
        attacker_index: usize,
        score: u32,
        dept_id: u32,
    },
    SetManager {
        by_owner: bool,
        caller_index: usize,
        manager_index: usize,
    },
    Grant {
        viewer_index: usize,
        dept_ids: Vec<u32>,
    },
}

/// Strategy for individual actions. Department ids may fall one past the
/// table so rejection paths are covered.
pub fn survey_action_strategy(
    num_users: usize,
    department_count: u32,
) -> impl Strategy<Value = SurveyAction> {
    let user_idx = 0..num_users;
    let dept = 0..=department_count;

    prop_oneof![
        50 => (user_idx.clone(), rating_strategy(), dept.clone())
            .prop_map(|(u, s, d)| SurveyAction::Submit { user_index: u, score: s, dept_id: d }),
        8 => (user_idx.clone(), unchecked_score_strategy(), dept.clone())
            .prop_map(|(u, s, d)| SurveyAction::Submit { user_index: u, score: s, dept_id: d }),
        8 => (user_idx.clone(), rating_strategy(), dept.clone())
            .prop_map(|(u, s, d)| SurveyAction::SubmitForged { user_index: u, score: s, dept_id: d }),
        8 => (user_idx.clone(), user_idx.clone(), rating_strategy(), dept.clone())
            .prop_map(|(v, a, s, d)| SurveyAction::Replay {
                victim_index: v,
                attacker_index: a,
                score: s,
                dept_id: d,
            }),
        4 => (any::<bool>(), user_idx.clone(), user_idx.clone())
            .prop_map(|(o, c, m)| SurveyAction::SetManager {
                by_owner: o,
                caller_index: c,
                manager_index: m,
            }),
        6 => (user_idx.clone(), prop::collection::vec(dept.clone(), 0..=3))
            .prop_map(|(v, ids)| SurveyAction::Grant { viewer_index: v, dept_ids: ids }),
    ]
}

/// Produces 1–`max_len` actions.
pub fn survey_action_sequence(
    num_users: usize,
    department_count: u32,
    max_len: usize,
) -> impl Strategy<Value = Vec<SurveyAction>> {
    prop::collection::vec(survey_action_strategy(num_users, department_count), 1..=max_len)
}

/// A batch of honest `(score, dept_id)` submissions.
pub fn submission_batch(
    department_count: u32,
    max_len: usize,
) -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec(
        (rating_strategy(), department_strategy(department_count)),
        0..=max_len,
    )
}
