use tracing::{debug, instrument, warn};

use crate::contract::model::{PersonName, ResolvedIdentity};
use crate::domain::error::DomainError;
use crate::domain::naming::{local_part, normalize_non_empty};
use crate::domain::ports::LoginOracle;

pub const DEFAULT_MAX_SUFFIX_ATTEMPTS: u32 = 100;

/// Which name parts produced a candidate local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    PrimarySurname1,
    PrimarySurname2,
    SecondarySurname1,
    SecondarySurname2,
    Suffixed(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub local_part: String,
    pub source: CandidateSource,
}

/// Normalized name components; the required ones are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LoginParts {
    primary: String,
    secondary: Option<String>,
    surname1: String,
    surname2: Option<String>,
}

impl LoginParts {
    fn from_name(name: &PersonName) -> Result<Self, DomainError> {
        let primary = normalize_non_empty(&name.primary_given)
            .ok_or_else(|| DomainError::invalid_name("primary_given"))?;
        let surname1 = normalize_non_empty(&name.surname1)
            .ok_or_else(|| DomainError::invalid_name("surname1"))?;

        Ok(Self {
            primary,
            secondary: name.secondary_given.as_deref().and_then(normalize_non_empty),
            surname1,
            surname2: name.surname2.as_deref().and_then(normalize_non_empty),
        })
    }

    /// Name-pair candidates in priority order, skipping absent components.
    fn pair_candidates(&self) -> Vec<Candidate> {
        use CandidateSource::*;

        let pairs = [
            (Some(&self.primary), Some(&self.surname1), PrimarySurname1),
            (Some(&self.primary), self.surname2.as_ref(), PrimarySurname2),
            (self.secondary.as_ref(), Some(&self.surname1), SecondarySurname1),
            (self.secondary.as_ref(), self.surname2.as_ref(), SecondarySurname2),
        ];

        pairs
            .into_iter()
            .filter_map(|(given, surname, source)| {
                Some(Candidate {
                    local_part: local_part(given?, surname?),
                    source,
                })
            })
            .collect()
    }

    /// Base of the numeric fallback: the richest primary-given combination.
    fn suffix_base(&self) -> String {
        local_part(
            &self.primary,
            self.surname2.as_deref().unwrap_or(self.surname1.as_str()),
        )
    }
}

/// Picks the first free login for a person by probing a [`LoginOracle`].
#[derive(Debug, Clone)]
pub struct LoginResolver {
    domain: String,
    max_suffix_attempts: u32,
}

impl LoginResolver {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            max_suffix_attempts: DEFAULT_MAX_SUFFIX_ATTEMPTS,
        }
    }

    pub fn with_max_suffix_attempts(mut self, attempts: u32) -> Self {
        self.max_suffix_attempts = attempts;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn full_login(&self, local_part: &str) -> String {
        format!("{}@{}", local_part, self.domain)
    }

    /// Try the name-pair candidates, then `base.1 ..= base.N`.
    ///
    /// Checks run strictly one after another; an oracle failure counts as
    /// "available" and the directory's create call settles any collision.
    #[instrument(
        name = "user_provisioning.resolver.resolve",
        skip(self, name, oracle),
        fields(domain = %self.domain)
    )]
    pub async fn resolve<O>(
        &self,
        name: &PersonName,
        oracle: &O,
    ) -> Result<ResolvedIdentity, DomainError>
    where
        O: LoginOracle + ?Sized,
    {
        let parts = LoginParts::from_name(name)?;

        for candidate in parts.pair_candidates() {
            if let Some(identity) = self.try_candidate(&candidate, oracle).await {
                return Ok(identity);
            }
        }

        let base = parts.suffix_base();
        for n in 1..=self.max_suffix_attempts {
            let candidate = Candidate {
                local_part: format!("{base}.{n}"),
                source: CandidateSource::Suffixed(n),
            };
            if let Some(identity) = self.try_candidate(&candidate, oracle).await {
                return Ok(identity);
            }
        }

        warn!(base = %base, attempts = self.max_suffix_attempts, "login suffix space exhausted");
        Err(DomainError::exhausted_suffix_space(
            base,
            self.max_suffix_attempts,
        ))
    }

    async fn try_candidate<O>(&self, candidate: &Candidate, oracle: &O) -> Option<ResolvedIdentity>
    where
        O: LoginOracle + ?Sized,
    {
        let full_login = self.full_login(&candidate.local_part);

        let taken = match oracle.login_exists(&full_login).await {
            Ok(taken) => taken,
            Err(e) => {
                warn!(login = %full_login, error = %e, "existence check failed, assuming login is free");
                false
            }
        };

        if taken {
            debug!(login = %full_login, source = ?candidate.source, "candidate taken");
            return None;
        }

        debug!(login = %full_login, source = ?candidate.source, "candidate selected");
        Some(ResolvedIdentity {
            local_part: candidate.local_part.clone(),
            full_login,
        })
    }
}
