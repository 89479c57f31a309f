use std::fmt;

use soroban_sdk::{Address, BytesN};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::{DecryptAuthorization, DecryptionGateway, ScopeHandles, SurveyLedger};

/// Decrypted `(total, count)` of one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateView {
    pub total: u32,
    pub count: u32,
}

impl AggregateView {
    /// `None` when nothing has been counted yet.
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.total as f64 / self.count as f64)
    }
}

impl fmt::Display for AggregateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total: {} | Count: {} | Avg: ", self.total, self.count)?;
        match self.average() {
            Some(avg) => write!(f, "{avg:.2}"),
            None => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScopeReading {
    /// The contract returned the all-zero sentinel; nothing was decrypted.
    NoData,
    Revealed(AggregateView),
}

impl ScopeReading {
    pub fn view(&self) -> Option<&AggregateView> {
        match self {
            ScopeReading::NoData => None,
            ScopeReading::Revealed(view) => Some(view),
        }
    }
}

impl fmt::Display for ScopeReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeReading::NoData => f.write_str("no data"),
            ScopeReading::Revealed(view) => fmt::Display::fmt(view, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyResults {
    pub global: ScopeReading,
    pub dept_id: u32,
    pub department: ScopeReading,
}

/// Reads aggregate handles and reveals them for an authorized viewer.
///
/// Keeps the last decryption authorization and reuses it until it expires,
/// the viewer changes, or the network changes.
pub struct AggregateReader<'a, L, D> {
    ledger: &'a L,
    gateway: &'a D,
    config: &'a ClientConfig,
    cached: Option<DecryptAuthorization>,
}

impl<'a, L: SurveyLedger, D: DecryptionGateway> AggregateReader<'a, L, D> {
    pub fn new(ledger: &'a L, gateway: &'a D, config: &'a ClientConfig) -> Self {
        Self {
            ledger,
            gateway,
            config,
            cached: None,
        }
    }

    pub fn cached_authorization(&self) -> Option<&DecryptAuthorization> {
        self.cached.as_ref()
    }

    /// Reveals Global and `dept_id` behind a single authorization.
    pub fn reveal(&mut self, viewer: &Address, dept_id: u32) -> Result<SurveyResults, ClientError> {
        if self.config.department(dept_id).is_none() {
            return Err(ClientError::InvalidDepartment(dept_id as i64));
        }
        let global = self.ledger.global_aggregates()?;
        let department = self.ledger.department_aggregates(dept_id)?;

        let mut handles: Vec<BytesN<32>> = Vec::with_capacity(4);
        for scope in [&global, &department] {
            if scope.has_data() {
                handles.push(scope.total.clone());
                handles.push(scope.count.clone());
            }
        }

        if handles.is_empty() {
            debug!(dept_id, "no aggregate handles to decrypt");
            return Ok(SurveyResults {
                global: ScopeReading::NoData,
                dept_id,
                department: ScopeReading::NoData,
            });
        }

        let clear = self.decrypt_batch(viewer, &handles)?;
        let mut values = clear.into_iter();
        let mut next_reading = |scope: &ScopeHandles| -> ScopeReading {
            if !scope.has_data() {
                return ScopeReading::NoData;
            }
            match (values.next(), values.next()) {
                (Some(total), Some(count)) => ScopeReading::Revealed(AggregateView { total, count }),
                _ => ScopeReading::NoData,
            }
        };
        let results = SurveyResults {
            global: next_reading(&global),
            dept_id,
            department: next_reading(&department),
        };
        info!(dept_id, handles = handles.len(), "aggregates revealed");
        Ok(results)
    }

    fn decrypt_batch(
        &mut self,
        viewer: &Address,
        handles: &[BytesN<32>],
    ) -> Result<Vec<u32>, ClientError> {
        let contract = self.ledger.survey_address();
        let authorization = self.authorization(viewer, &contract)?;

        match self
            .gateway
            .user_decrypt(viewer, &contract, handles, &authorization)
        {
            Ok(clear) if clear.len() == handles.len() => Ok(clear),
            Ok(clear) => Err(ClientError::Gateway(format!(
                "asked to decrypt {} handles, got {} values",
                handles.len(),
                clear.len()
            ))),
            Err(err) => {
                if err == ClientError::AuthorizationExpired {
                    self.cached = None;
                }
                warn!(error = %err, "user decryption rejected");
                Err(err)
            }
        }
    }

    fn authorization(
        &mut self,
        viewer: &Address,
        contract: &Address,
    ) -> Result<DecryptAuthorization, ClientError> {
        let network = self.gateway.network();
        if let Some(cached) = &self.cached {
            if cached.is_usable(viewer, &network) {
                return Ok(cached.clone());
            }
            debug!(expires_at = cached.expires_at(), "cached authorization unusable");
        }

        let fresh = self
            .gateway
            .authorize(viewer, contract, self.config.decrypt_validity_days)?;
        self.cached = Some(fresh.clone());
        Ok(fresh)
    }
}
