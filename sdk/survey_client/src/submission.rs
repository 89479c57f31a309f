use soroban_sdk::Address;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::{InputEncryptor, Submission, SubmissionReceipt, SurveyLedger};

/// Turns a rating into a verified on-chain submission.
pub struct SubmissionClient<'a, L, E> {
    ledger: &'a L,
    encryptor: &'a E,
    config: &'a ClientConfig,
}

impl<'a, L: SurveyLedger, E: InputEncryptor> SubmissionClient<'a, L, E> {
    pub fn new(ledger: &'a L, encryptor: &'a E, config: &'a ClientConfig) -> Self {
        Self {
            ledger,
            encryptor,
            config,
        }
    }

    /// Checks `rating` and `dept_id` against the configuration.
    pub fn validate(&self, rating: i64, dept_id: i64) -> Result<(u32, u32), ClientError> {
        let (min, max) = (self.config.min_rating, self.config.max_rating);
        if rating < min as i64 || rating > max as i64 {
            return Err(ClientError::RatingOutOfRange { rating, min, max });
        }
        let dept = u32::try_from(dept_id).map_err(|_| ClientError::InvalidDepartment(dept_id))?;
        if self.config.department(dept).is_none() {
            return Err(ClientError::InvalidDepartment(dept_id));
        }
        Ok((rating as u32, dept))
    }

    pub fn submit(
        &self,
        submitter: &Address,
        rating: i64,
        dept_id: i64,
    ) -> Result<SubmissionReceipt, ClientError> {
        let (score, dept) = self.validate(rating, dept_id)?;
        let survey = self.ledger.survey_address();

        let batch = self.encryptor.encrypt(&survey, submitter, &[score, 1])?;
        let [enc_score, enc_one] = batch.handles.as_slice() else {
            return Err(ClientError::MalformedInput(format!(
                "expected 2 handles, got {}",
                batch.handles.len()
            )));
        };
        debug!(dept_id = dept, "encrypted rating and counter increment");

        let submission = Submission {
            submitter: submitter.clone(),
            enc_score: enc_score.clone(),
            score_proof: batch.proof.clone(),
            dept_id: dept,
            enc_one: enc_one.clone(),
            one_proof: batch.proof,
        };

        match self.ledger.submit_response(&submission) {
            Ok(receipt) => {
                info!(
                    dept_id = dept,
                    ledger_sequence = receipt.ledger_sequence,
                    "survey response committed"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(dept_id = dept, error = %err, "survey response not committed");
                Err(err)
            }
        }
    }
}
