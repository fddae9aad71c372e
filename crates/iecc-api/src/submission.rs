use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use iecc_registry::{Registry, RegistryError, certificate};
use iecc_types::api::SubmitAffirmationRequest;
use iecc_types::models::Affirmation;

use crate::policy::{ContentPolicy, PolicyViolation};

pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_NAME_CHARS: usize = 100;

/// Fresh certificate ids tried before giving up on a submission.
pub const MAX_CERTIFICATE_ATTEMPTS: usize = 8;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error("no unique certificate id after {0} attempts")]
    CertificateExhausted(usize),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Validates, screens and stores one submission.
///
/// Rejections never touch the registry. On a certificate collision a new id
/// is drawn and the insert retried.
pub fn submit(
    registry: &dyn Registry,
    policy: &dyn ContentPolicy,
    req: &SubmitAffirmationRequest,
) -> Result<Affirmation, SubmitError> {
    let full_name = validate(req)?;
    policy.check(full_name)?;
    issue(registry, full_name)
}

/// Structural checks. Returns the accepted name, untrimmed.
pub fn validate(req: &SubmitAffirmationRequest) -> Result<&str, SubmitError> {
    let full_name = req.full_name.as_deref().ok_or(SubmitError::Validation {
        field: "fullName",
        message: "fullName is required",
    })?;

    let len = full_name.chars().count();
    if len < MIN_NAME_CHARS {
        return Err(SubmitError::Validation {
            field: "fullName",
            message: "Name is too short",
        });
    }
    if len > MAX_NAME_CHARS {
        return Err(SubmitError::Validation {
            field: "fullName",
            message: "Name is too long",
        });
    }

    if req.consent != Some(true) {
        return Err(SubmitError::Validation {
            field: "consent",
            message: "Consent is required",
        });
    }

    Ok(full_name)
}

fn issue(registry: &dyn Registry, full_name: &str) -> Result<Affirmation, SubmitError> {
    for attempt in 1..=MAX_CERTIFICATE_ATTEMPTS {
        let certificate_id = certificate::generate(Utc::now());
        match registry.create_affirmation(full_name, true, &certificate_id) {
            Ok(affirmation) => {
                info!(
                    "Affirmation {} issued certificate {}",
                    affirmation.id, affirmation.certificate_id
                );
                return Ok(affirmation);
            }
            Err(RegistryError::DuplicateCertificate(id)) => {
                warn!("Certificate id collision on {} (attempt {})", id, attempt);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(SubmitError::CertificateExhausted(MAX_CERTIFICATE_ATTEMPTS))
}
