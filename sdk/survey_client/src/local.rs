//! Gateway over an in-process Soroban environment, with the survey and the
//! stand-in coprocessor deployed side by side.

use core::fmt::Debug;

use fhe_coprocessor::{CoprocessorError, FheCoprocessorClient};
use satisfaction_survey::{Aggregates, ContractError, SatisfactionSurveyContractClient};
use soroban_sdk::{vec, Address, BytesN, Env, Vec as SorobanVec};
use tracing::debug;

use crate::error::ClientError;
use crate::gateway::{
    DecryptAuthorization, DecryptionGateway, EncryptedBatch, InputEncryptor, NetworkContext,
    ScopeHandles, Submission, SubmissionReceipt, SurveyLedger,
};

pub struct LocalLedgerGateway<'a> {
    env: &'a Env,
    survey: SatisfactionSurveyContractClient<'a>,
    fhe: FheCoprocessorClient<'a>,
}

impl<'a> LocalLedgerGateway<'a> {
    pub fn new(env: &'a Env, survey: &Address, coprocessor: &Address) -> Self {
        Self {
            env,
            survey: SatisfactionSurveyContractClient::new(env, survey),
            fhe: FheCoprocessorClient::new(env, coprocessor),
        }
    }
}

fn survey_result<T, C: Debug, I: Debug>(
    result: Result<Result<T, C>, Result<ContractError, I>>,
) -> Result<T, ClientError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(conversion)) => Err(ClientError::Gateway(format!("{conversion:?}"))),
        Err(Ok(err)) => Err(ClientError::Reverted { code: err as u32 }),
        Err(Err(invoke)) => Err(ClientError::Gateway(format!("{invoke:?}"))),
    }
}

fn coprocessor_result<T, C: Debug, I: Debug>(
    result: Result<Result<T, C>, Result<CoprocessorError, I>>,
) -> Result<T, ClientError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(conversion)) => Err(ClientError::Gateway(format!("{conversion:?}"))),
        Err(Ok(CoprocessorError::NotAllowed)) => Err(ClientError::DecryptRejected),
        Err(Ok(CoprocessorError::GrantExpired | CoprocessorError::GrantNotFound)) => {
            Err(ClientError::AuthorizationExpired)
        }
        Err(Ok(CoprocessorError::InvalidDuration)) => Err(ClientError::Config(
            "decrypt validity is outside the coprocessor's accepted range".into(),
        )),
        Err(Ok(CoprocessorError::UnknownHandle)) => Err(ClientError::Gateway(
            "coprocessor does not know this handle".into(),
        )),
        Err(Ok(
            err @ (CoprocessorError::InvalidProof
            | CoprocessorError::BindingMismatch
            | CoprocessorError::EmptyInput),
        )) => Err(ClientError::MalformedInput(format!("{err:?}"))),
        Err(Err(invoke)) => Err(ClientError::Gateway(format!("{invoke:?}"))),
    }
}

impl From<Aggregates> for ScopeHandles {
    fn from(aggregates: Aggregates) -> Self {
        ScopeHandles {
            total: aggregates.total,
            count: aggregates.count,
        }
    }
}

impl SurveyLedger for LocalLedgerGateway<'_> {
    fn survey_address(&self) -> Address {
        self.survey.address.clone()
    }

    fn submit_response(&self, submission: &Submission) -> Result<SubmissionReceipt, ClientError> {
        survey_result(self.survey.try_submit_response(
            &submission.submitter,
            &submission.enc_score,
            &submission.score_proof,
            &submission.dept_id,
            &submission.enc_one,
            &submission.one_proof,
        ))?;
        Ok(SubmissionReceipt {
            submitter: submission.submitter.clone(),
            dept_id: submission.dept_id,
            ledger_sequence: self.env.ledger().sequence(),
        })
    }

    fn global_aggregates(&self) -> Result<ScopeHandles, ClientError> {
        survey_result(self.survey.try_get_global_aggregates()).map(ScopeHandles::from)
    }

    fn department_aggregates(&self, dept_id: u32) -> Result<ScopeHandles, ClientError> {
        survey_result(self.survey.try_get_department_aggregates(&dept_id)).map(ScopeHandles::from)
    }
}

impl InputEncryptor for LocalLedgerGateway<'_> {
    fn encrypt(
        &self,
        contract: &Address,
        user: &Address,
        values: &[u32],
    ) -> Result<EncryptedBatch, ClientError> {
        let values = SorobanVec::from_slice(self.env, values);
        let input = coprocessor_result(self.fhe.try_encrypt_input(user, contract, &values))?;
        Ok(EncryptedBatch {
            handles: input.handles.iter().collect(),
            proof: input.proof,
        })
    }
}

impl DecryptionGateway for LocalLedgerGateway<'_> {
    fn network(&self) -> NetworkContext {
        NetworkContext {
            network_id: self.env.ledger().network_id().to_array(),
            now: self.env.ledger().timestamp(),
        }
    }

    fn authorize(
        &self,
        viewer: &Address,
        contract: &Address,
        validity_days: u32,
    ) -> Result<DecryptAuthorization, ClientError> {
        let contracts = vec![self.env, contract.clone()];
        let grant = coprocessor_result(self.fhe.try_issue_decrypt_grant(
            viewer,
            &contracts,
            &validity_days,
        ))?;
        debug!(start = grant.start, days = grant.duration_days, "decrypt grant issued");
        Ok(DecryptAuthorization {
            token: grant.id,
            viewer: viewer.clone(),
            network_id: self.network().network_id,
            start: grant.start,
            duration_days: grant.duration_days,
        })
    }

    fn user_decrypt(
        &self,
        viewer: &Address,
        contract: &Address,
        handles: &[BytesN<32>],
        authorization: &DecryptAuthorization,
    ) -> Result<Vec<u32>, ClientError> {
        let handles = SorobanVec::from_slice(self.env, handles);
        let clear = coprocessor_result(self.fhe.try_user_decrypt(
            viewer,
            contract,
            &handles,
            &authorization.token,
        ))?;
        Ok(clear.iter().collect())
    }
}
