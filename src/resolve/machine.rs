//! The resolution state machine.
//!
//! ```text
//! AwaitingTagId -> FetchingOrParsing -> AwaitingPin -> Verifying -> Resolved
//!                                            ^             |
//!                                            +-- wrong PIN-+
//! ```
//!
//! Any fatal problem ends in `Failed { retryable: false }`. A store error
//! while fetching ends in `Failed { retryable: true }` and `load` may be
//! called again.

use tracing::{debug, warn};

use super::{PinPrompt, ResolveError, ServerlessPayload, TagSource, INCORRECT_PIN};
use crate::cipher::{CipherEnvelope, CipherMethod, Pin, PinError};
use crate::codec::{self, fields, flags, EncodedRecord};
use crate::profile::{BloodGroup, MedicalProfile};
use crate::store::{RecordStore, StoredRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    AwaitingTagId,
    FetchingOrParsing,
    AwaitingPin,
    Verifying,
    Resolved,
    Failed { retryable: bool },
}

/// The clear fields of an online tag, shown while the PIN is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub full_name: String,
    pub blood_group: BloodGroup,
}

/// What a PIN gets checked against.
#[derive(Debug, Clone)]
enum Locked {
    Online {
        placeholder: Placeholder,
        envelope: CipherEnvelope,
    },
    Serverless {
        envelope: CipherEnvelope,
    },
}

/// Drives one tag from scan to display.
#[derive(Debug)]
pub struct Resolver {
    state: ResolutionState,
    locked: Option<Locked>,
    profile: Option<MedicalProfile>,
    last_error: Option<String>,
    verifying: bool,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            state: ResolutionState::AwaitingTagId,
            locked: None,
            profile: None,
            last_error: None,
            verifying: false,
        }
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        match &self.locked {
            Some(Locked::Online { placeholder, .. }) => Some(placeholder),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&MedicalProfile> {
        self.profile.as_ref()
    }

    pub fn into_profile(self) -> Option<MedicalProfile> {
        self.profile
    }

    /// Message for the last rejected attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying
    }

    pub fn accepts_pin(&self) -> bool {
        self.state == ResolutionState::AwaitingPin && !self.verifying
    }

    pub fn prompt(&self) -> PinPrompt {
        PinPrompt {
            placeholder: self.placeholder().cloned(),
            error: self.last_error.clone(),
        }
    }

    /// Fetches (online) or parses (serverless) the tag.
    ///
    /// Ends in `AwaitingPin` for encrypted tags and in `Resolved` for an
    /// unencrypted online record.
    pub async fn load<S>(&mut self, source: &TagSource, store: &S) -> Result<(), ResolveError>
    where
        S: RecordStore + ?Sized,
    {
        match self.state {
            ResolutionState::AwaitingTagId | ResolutionState::Failed { retryable: true } => {}
            other => return Err(ResolveError::UnexpectedState(other)),
        }
        self.state = ResolutionState::FetchingOrParsing;

        let result = match source {
            TagSource::Online(tag_id) => self.fetch_online(tag_id, store).await,
            TagSource::Serverless(payload) => self.parse_serverless(payload),
        };

        if let Err(err) = &result {
            warn!(%err, "tag could not be loaded");
            self.state = ResolutionState::Failed {
                retryable: err.is_retryable(),
            };
        }
        result
    }

    async fn fetch_online<S>(&mut self, tag_id: &str, store: &S) -> Result<(), ResolveError>
    where
        S: RecordStore + ?Sized,
    {
        debug!(tag_id, "fetching online record");
        let record = store
            .get(tag_id)
            .await?
            .ok_or_else(|| ResolveError::NotFound(tag_id.to_string()))?;

        if !record.is_encrypted {
            let profile = parse_profile_json(record.encrypted_blob.as_bytes())?;
            self.resolve_with(merge_online(&record, profile));
            return Ok(());
        }

        let method = record.cipher_method()?;
        let envelope = CipherEnvelope::from_stored(method, &record.encrypted_blob)?;
        self.locked = Some(Locked::Online {
            placeholder: Placeholder {
                full_name: record.full_name,
                blood_group: record.blood_group,
            },
            envelope,
        });
        self.state = ResolutionState::AwaitingPin;
        Ok(())
    }

    fn parse_serverless(&mut self, payload: &str) -> Result<(), ResolveError> {
        let payload = ServerlessPayload::parse(payload)?;
        debug!(method = %payload.method, "parsed serverless payload");

        self.locked = Some(Locked::Serverless {
            envelope: payload.envelope()?,
        });
        self.state = ResolutionState::AwaitingPin;
        Ok(())
    }

    /// Claims the verification guard and hands out the work for `pin`.
    ///
    /// Refused with [`ResolveError::VerificationInFlight`] while another
    /// verification holds the guard; the state is left untouched then.
    ///
    /// The guard is only released by [`Resolver::finish`] or
    /// [`Resolver::abandon_verification`]. Dropping the returned
    /// [`Verification`] alone leaves the resolver in `Verifying`.
    pub fn begin_verification(&mut self, pin: Pin) -> Result<Verification, ResolveError> {
        if self.verifying {
            return Err(ResolveError::VerificationInFlight);
        }
        let locked = match (&self.state, &self.locked) {
            (ResolutionState::AwaitingPin, Some(locked)) => locked.clone(),
            _ => return Err(ResolveError::UnexpectedState(self.state)),
        };

        self.verifying = true;
        self.state = ResolutionState::Verifying;
        Ok(Verification { locked, pin })
    }

    /// Releases the guard and applies the outcome of a [`Verification`].
    ///
    /// A wrong PIN returns to `AwaitingPin` with [`INCORRECT_PIN`]; any
    /// other failure is fatal.
    pub fn finish(
        &mut self,
        outcome: Result<MedicalProfile, ResolveError>,
    ) -> Result<(), ResolveError> {
        self.verifying = false;

        match outcome {
            Ok(profile) => {
                self.resolve_with(profile);
                Ok(())
            }
            Err(ResolveError::AuthFailure) => {
                debug!("incorrect PIN");
                self.state = ResolutionState::AwaitingPin;
                self.last_error = Some(INCORRECT_PIN.to_string());
                Err(ResolveError::AuthFailure)
            }
            Err(err) => {
                warn!(%err, "verification failed");
                self.state = ResolutionState::Failed { retryable: false };
                Err(err)
            }
        }
    }

    /// Releases the guard without an outcome, e.g. when the task running a
    /// [`Verification`] was dropped. Returns to `AwaitingPin`; a no-op when
    /// nothing is in flight.
    pub fn abandon_verification(&mut self) {
        if self.verifying {
            debug!("verification abandoned");
            self.verifying = false;
            self.state = ResolutionState::AwaitingPin;
        }
    }

    /// Verifies `pin` in one step.
    pub fn submit_pin(&mut self, pin: Pin) -> Result<(), ResolveError> {
        let verification = self.begin_verification(pin)?;
        let outcome = verification.run();
        self.finish(outcome)
    }

    /// Records a PIN that could not be parsed. Nothing is verified.
    pub fn reject_input(&mut self, err: PinError) -> Result<(), ResolveError> {
        if !self.accepts_pin() {
            return Err(ResolveError::UnexpectedState(self.state));
        }
        let err = ResolveError::InvalidPin(err);
        self.last_error = Some(err.to_string());
        Err(err)
    }

    fn resolve_with(&mut self, profile: MedicalProfile) {
        debug!("tag resolved");
        self.profile = Some(profile);
        self.locked = None;
        self.last_error = None;
        self.state = ResolutionState::Resolved;
    }
}

/// One PIN check, detached from the [`Resolver`] that issued it.
#[derive(Debug)]
pub struct Verification {
    locked: Locked,
    pin: Pin,
}

impl Verification {
    /// Opens the envelope and decodes it.
    ///
    /// Pure: no resolver state is touched, so it can run on another task
    /// while the guard is held.
    pub fn run(&self) -> Result<MedicalProfile, ResolveError> {
        match &self.locked {
            Locked::Online {
                placeholder,
                envelope,
            } => {
                let plaintext = envelope.open(&self.pin)?;
                let profile = post_open(envelope.method, || parse_profile_json(&plaintext))?;
                Ok(merge_placeholder(placeholder, profile))
            }
            Locked::Serverless { envelope } => {
                let plaintext = envelope.open(&self.pin)?;
                post_open(envelope.method, || decode_serverless(&plaintext))
            }
        }
    }
}

/// Maps decode failures after a successful `open`.
///
/// XOR never detects a wrong PIN itself, so whatever fails to decode is
/// reported as a wrong PIN.
fn post_open<F>(method: CipherMethod, decode: F) -> Result<MedicalProfile, ResolveError>
where
    F: FnOnce() -> Result<MedicalProfile, ResolveError>,
{
    match decode() {
        Err(ResolveError::MalformedRecord(reason)) if !method.is_authenticated() => {
            debug!(%reason, "legacy envelope did not decode");
            Err(ResolveError::AuthFailure)
        }
        other => other,
    }
}

fn decode_serverless(plaintext: &[u8]) -> Result<MedicalProfile, ResolveError> {
    let text = std::str::from_utf8(plaintext)
        .map_err(|e| ResolveError::MalformedRecord(e.to_string()))?;
    let record = EncodedRecord::disassemble(text)?;

    let digits = fields::unpack_digits(&record.numeric)?;
    if !fields::has_plausible_birth_year(&digits) {
        return Err(ResolveError::AuthFailure);
    }

    let scalars = fields::ScalarFields::from_digits(&digits)?;
    let flags = flags::unpack(&record.binary)?;
    let contact = fields::unpack_contact(&record.contact)?;

    Ok(codec::assemble_profile(&record.name, scalars, flags, contact))
}

fn parse_profile_json(bytes: &[u8]) -> Result<MedicalProfile, ResolveError> {
    serde_json::from_slice(bytes).map_err(|e| ResolveError::MalformedRecord(e.to_string()))
}

fn merge_online(record: &StoredRecord, profile: MedicalProfile) -> MedicalProfile {
    merge_placeholder(
        &Placeholder {
            full_name: record.full_name.clone(),
            blood_group: record.blood_group,
        },
        profile,
    )
}

/// The store's clear name and blood group win over the sealed copy.
fn merge_placeholder(placeholder: &Placeholder, mut profile: MedicalProfile) -> MedicalProfile {
    profile.full_name = placeholder.full_name.clone();
    profile.blood_group = placeholder.blood_group;
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{issue_online, issue_online_plain, issue_serverless, issue_serverless_with};
    use crate::profile::{Allergy, SubstanceUse};
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    fn profile() -> MedicalProfile {
        let mut profile = MedicalProfile::new(
            "Jane Roe",
            NaiveDate::from_ymd_opt(1990, 5, 15).unwrap(),
            175,
            70,
            BloodGroup::OPositive,
            SubstanceUse::TobaccoOnly,
            "5551234567",
        );
        profile.allergies.insert(Allergy::Peanuts);
        profile.organ_donor = true;
        profile
    }

    fn pin(s: &str) -> Pin {
        Pin::parse(s).unwrap()
    }

    async fn loaded_serverless(pin_text: &str) -> Resolver {
        let payload = issue_serverless(&profile(), &pin(pin_text)).unwrap();
        let mut resolver = Resolver::new();
        resolver
            .load(&TagSource::Serverless(payload.to_query()), &MemoryStore::new())
            .await
            .unwrap();
        resolver
    }

    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn get(&self, _tag_id: &str) -> Result<Option<StoredRecord>, StoreError> {
            Err(StoreError::Backend("offline".to_string()))
        }

        async fn put(&self, _tag_id: &str, _record: StoredRecord) -> Result<(), StoreError> {
            Err(StoreError::Backend("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_serverless_happy_path() {
        let mut resolver = loaded_serverless("1234").await;
        assert_eq!(resolver.state(), ResolutionState::AwaitingPin);
        assert!(resolver.placeholder().is_none());

        resolver.submit_pin(pin("1234")).unwrap();
        assert_eq!(resolver.state(), ResolutionState::Resolved);
        assert_eq!(resolver.profile(), Some(&profile()));
    }

    #[tokio::test]
    async fn test_wrong_pin_returns_to_awaiting_pin() {
        let mut resolver = loaded_serverless("1234").await;

        for attempt in ["0000", "4321", "9999"] {
            assert!(matches!(
                resolver.submit_pin(pin(attempt)),
                Err(ResolveError::AuthFailure)
            ));
            assert_eq!(resolver.state(), ResolutionState::AwaitingPin);
            assert_eq!(resolver.last_error(), Some(INCORRECT_PIN));
        }

        resolver.submit_pin(pin("1234")).unwrap();
        assert_eq!(resolver.last_error(), None);
    }

    #[tokio::test]
    async fn test_guard_refuses_second_verification() {
        let mut resolver = loaded_serverless("1234").await;

        let first = resolver.begin_verification(pin("1234")).unwrap();
        assert!(resolver.is_verifying());
        assert_eq!(resolver.state(), ResolutionState::Verifying);

        assert!(matches!(
            resolver.begin_verification(pin("1234")),
            Err(ResolveError::VerificationInFlight)
        ));
        assert_eq!(resolver.state(), ResolutionState::Verifying);
        assert!(!resolver.accepts_pin());

        let outcome = first.run();
        resolver.finish(outcome).unwrap();
        assert!(!resolver.is_verifying());
        assert_eq!(resolver.state(), ResolutionState::Resolved);
    }

    #[tokio::test]
    async fn test_abandoned_verification_releases_guard() {
        let mut resolver = loaded_serverless("1234").await;

        drop(resolver.begin_verification(pin("0000")).unwrap());
        assert!(resolver.is_verifying());

        resolver.abandon_verification();
        assert!(!resolver.is_verifying());
        assert_eq!(resolver.state(), ResolutionState::AwaitingPin);
        assert!(resolver.accepts_pin());

        // Nothing in flight: no-op
        resolver.abandon_verification();
        assert_eq!(resolver.state(), ResolutionState::AwaitingPin);

        resolver.submit_pin(pin("1234")).unwrap();
        assert_eq!(resolver.state(), ResolutionState::Resolved);
    }

    #[tokio::test]
    async fn test_pin_before_load_is_refused() {
        let mut resolver = Resolver::new();
        assert!(matches!(
            resolver.submit_pin(pin("1234")),
            Err(ResolveError::UnexpectedState(ResolutionState::AwaitingTagId))
        ));
    }

    #[tokio::test]
    async fn test_implausible_year_is_incorrect_pin() {
        // Year 3001 survives every codec check but fails the plausibility rule
        let mut odd = profile();
        odd.date_of_birth = NaiveDate::from_ymd_opt(3001, 1, 1).unwrap();
        let record = codec::encode_profile(&odd).unwrap().assemble();
        let envelope = CipherEnvelope::seal(CipherMethod::AesGcm, record.as_bytes(), &pin("1234")).unwrap();
        let payload = ServerlessPayload::from_envelope(&envelope);

        let mut resolver = Resolver::new();
        resolver
            .load(&TagSource::Serverless(payload.to_query()), &MemoryStore::new())
            .await
            .unwrap();
        assert!(matches!(
            resolver.submit_pin(pin("1234")),
            Err(ResolveError::AuthFailure)
        ));
        assert_eq!(resolver.state(), ResolutionState::AwaitingPin);
    }

    #[tokio::test]
    async fn test_authenticated_garbage_is_malformed() {
        let envelope = CipherEnvelope::seal(CipherMethod::AesGcm, b"not-a-record", &pin("1234")).unwrap();
        let payload = ServerlessPayload::from_envelope(&envelope);

        let mut resolver = Resolver::new();
        resolver
            .load(&TagSource::Serverless(payload.to_query()), &MemoryStore::new())
            .await
            .unwrap();
        assert!(matches!(
            resolver.submit_pin(pin("1234")),
            Err(ResolveError::MalformedRecord(_))
        ));
        assert_eq!(resolver.state(), ResolutionState::Failed { retryable: false });
    }

    #[tokio::test]
    async fn test_legacy_garbage_is_incorrect_pin() {
        // Same bytes as above, but XOR cannot tell a bad record from a bad PIN
        let envelope = CipherEnvelope::seal(CipherMethod::Xor, b"not-a-record", &pin("1234")).unwrap();
        let payload = ServerlessPayload::from_envelope(&envelope);

        let mut resolver = Resolver::new();
        resolver
            .load(&TagSource::Serverless(payload.data.clone()), &MemoryStore::new())
            .await
            .unwrap();
        assert!(matches!(
            resolver.submit_pin(pin("1234")),
            Err(ResolveError::AuthFailure)
        ));
        assert_eq!(resolver.state(), ResolutionState::AwaitingPin);
    }

    #[tokio::test]
    async fn test_legacy_tag_resolves() {
        let payload = issue_serverless_with(&profile(), &pin("1234"), CipherMethod::Xor).unwrap();
        assert_eq!(payload.to_query(), format!("data={}", payload.data));

        let mut resolver = Resolver::new();
        resolver
            .load(&TagSource::Serverless(payload.to_query()), &MemoryStore::new())
            .await
            .unwrap();
        resolver.submit_pin(pin("1234")).unwrap();
        assert_eq!(resolver.profile(), Some(&profile()));
    }

    #[tokio::test]
    async fn test_malformed_serverless_payload_is_fatal() {
        let mut resolver = Resolver::new();
        let result = resolver
            .load(&TagSource::Serverless("data=a".to_string()), &MemoryStore::new())
            .await;
        assert!(matches!(result, Err(ResolveError::MalformedRecord(_))));
        assert_eq!(resolver.state(), ResolutionState::Failed { retryable: false });
    }

    #[tokio::test]
    async fn test_online_merge_prefers_store_fields() {
        let store = MemoryStore::new();
        let mut record = issue_online(&profile(), &pin("5555")).unwrap();
        record.full_name = "Jane A. Roe".to_string();
        record.blood_group = BloodGroup::ONegative;
        store.put("tag-1", record).await.unwrap();

        let mut resolver = Resolver::new();
        resolver.load(&TagSource::Online("tag-1".into()), &store).await.unwrap();
        assert_eq!(
            resolver.placeholder(),
            Some(&Placeholder {
                full_name: "Jane A. Roe".to_string(),
                blood_group: BloodGroup::ONegative,
            })
        );

        resolver.submit_pin(pin("5555")).unwrap();
        let resolved = resolver.profile().unwrap();
        assert_eq!(resolved.full_name, "Jane A. Roe");
        assert_eq!(resolved.blood_group, BloodGroup::ONegative);
        assert_eq!(resolved.allergies, profile().allergies);
        assert_eq!(resolved.substance_use, SubstanceUse::TobaccoOnly);
    }

    #[tokio::test]
    async fn test_unencrypted_online_record_needs_no_pin() {
        let store = MemoryStore::new();
        store.put("open", issue_online_plain(&profile()).unwrap()).await.unwrap();

        let mut resolver = Resolver::new();
        resolver.load(&TagSource::Online("open".into()), &store).await.unwrap();
        assert_eq!(resolver.state(), ResolutionState::Resolved);
        assert_eq!(resolver.profile(), Some(&profile()));
    }

    #[tokio::test]
    async fn test_store_failure_can_be_retried() {
        let mut resolver = Resolver::new();
        let source = TagSource::Online("tag-1".into());

        let result = resolver.load(&source, &BrokenStore).await;
        assert!(matches!(result, Err(ResolveError::Store(_))));
        assert_eq!(resolver.state(), ResolutionState::Failed { retryable: true });

        let store = MemoryStore::new();
        store
            .put("tag-1", issue_online(&profile(), &pin("5555")).unwrap())
            .await
            .unwrap();
        resolver.load(&source, &store).await.unwrap();
        assert_eq!(resolver.state(), ResolutionState::AwaitingPin);
    }

    #[tokio::test]
    async fn test_not_found_is_fatal() {
        let mut resolver = Resolver::new();
        let source = TagSource::Online("missing".into());
        assert!(matches!(
            resolver.load(&source, &MemoryStore::new()).await,
            Err(ResolveError::NotFound(_))
        ));
        assert!(matches!(
            resolver.load(&source, &MemoryStore::new()).await,
            Err(ResolveError::UnexpectedState(ResolutionState::Failed { retryable: false }))
        ));
    }
}
