//! Tag resolution: from a scanned tag to a displayed profile.
//!
//! [`Resolver`] is the state machine; [`resolve`] drives it to completion
//! with a [`PinProvider`], retrying wrong PINs without limit.

mod machine;
mod payload;

pub use machine::{Placeholder, ResolutionState, Resolver, Verification};
pub use payload::ServerlessPayload;

use std::collections::VecDeque;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::cipher::{CipherError, Pin, PinError};
use crate::codec::CodecError;
use crate::profile::MedicalProfile;
use crate::store::{RecordStore, StoreError};

/// Shown to the user after a rejected PIN.
pub const INCORRECT_PIN: &str = "Incorrect PIN";

/// Errors that can occur while resolving a tag.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("OpenTag might be damaged: {0}")]
    MalformedRecord(String),

    #[error("Incorrect PIN")]
    AuthFailure,

    #[error("Crypto platform unavailable: {0}")]
    PlatformUnavailable(String),

    #[error("No tag found with ID {0}")]
    NotFound(String),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("PIN entry cancelled")]
    Cancelled,

    #[error("A PIN is already being verified")]
    VerificationInFlight,

    #[error("Invalid PIN: {0}")]
    InvalidPin(#[from] PinError),

    #[error("Operation not allowed in state {0:?}")]
    UnexpectedState(ResolutionState),
}

impl ResolveError {
    /// Whether the same resolution may continue after this error.
    ///
    /// Store I/O may succeed on a second `load`; a store whose contents do
    /// not parse will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ResolveError::Store(StoreError::Json(_)) => false,
            ResolveError::AuthFailure
            | ResolveError::InvalidPin(_)
            | ResolveError::VerificationInFlight
            | ResolveError::Store(_) => true,
            _ => false,
        }
    }
}

impl From<CipherError> for ResolveError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::AuthFailure => ResolveError::AuthFailure,
            CipherError::PlatformUnavailable(msg) => ResolveError::PlatformUnavailable(msg),
            other => ResolveError::MalformedRecord(other.to_string()),
        }
    }
}

impl From<CodecError> for ResolveError {
    fn from(err: CodecError) -> Self {
        ResolveError::MalformedRecord(err.to_string())
    }
}

/// Where a scanned tag points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSource {
    /// A tag ID looked up in the record store.
    Online(String),
    /// A serverless tag URL, query string or bare envelope token.
    Serverless(String),
}

/// What the user sees while being asked for a PIN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinPrompt {
    /// Name and blood group of an online tag, shown before unlocking.
    pub placeholder: Option<Placeholder>,
    /// Message for the previous attempt, if it was rejected.
    pub error: Option<String>,
}

/// Source of user-entered PINs.
#[async_trait]
pub trait PinProvider: Send {
    /// Asks for a PIN. `None` means the user gave up.
    async fn request_pin(&mut self, prompt: &PinPrompt) -> Option<String>;
}

/// Replays a fixed list of PIN attempts, then gives up.
#[derive(Debug, Default)]
pub struct ScriptedPins {
    attempts: VecDeque<String>,
    prompts: Vec<PinPrompt>,
}

impl ScriptedPins {
    pub fn new<I, S>(attempts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attempts: attempts.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> &[PinPrompt] {
        &self.prompts
    }
}

#[async_trait]
impl PinProvider for ScriptedPins {
    async fn request_pin(&mut self, prompt: &PinPrompt) -> Option<String> {
        self.prompts.push(prompt.clone());
        self.attempts.pop_front()
    }
}

/// Resolves a tag to a profile.
///
/// Wrong and badly formatted PINs are retried until the provider returns
/// `None`. Giving up after a rejected attempt reports that attempt's error
/// (a wrong PIN stays [`ResolveError::AuthFailure`]); giving up before any
/// attempt is [`ResolveError::Cancelled`].
pub async fn resolve<S, P>(
    source: &TagSource,
    store: &S,
    pins: &mut P,
) -> Result<MedicalProfile, ResolveError>
where
    S: RecordStore + ?Sized,
    P: PinProvider + ?Sized,
{
    let mut resolver = Resolver::new();
    resolver.load(source, store).await?;

    let mut rejected = None;
    while resolver.accepts_pin() {
        let prompt = resolver.prompt();
        let Some(input) = pins.request_pin(&prompt).await else {
            return Err(rejected.unwrap_or(ResolveError::Cancelled));
        };

        let result = match Pin::parse(&input) {
            Ok(pin) => resolver.submit_pin(pin),
            Err(err) => resolver.reject_input(err),
        };

        match result {
            Err(err) if err.is_retryable() => {
                debug!(%err, "PIN attempt rejected");
                rejected = Some(err);
            }
            Err(err) => return Err(err),
            Ok(()) => {}
        }
    }

    let state = resolver.state();
    resolver
        .into_profile()
        .ok_or(ResolveError::UnexpectedState(state))
}
