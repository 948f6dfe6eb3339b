//! # OpenTag - emergency medical profiles on a QR code
//!
//! OpenTag lets a person carry their medical profile on a QR code so first
//! responders can identify them. Sensitive fields are protected behind a
//! 4-digit PIN.
//!
//! ## Delivery modes
//!
//! - **Online**: the profile lives in a record store, the QR code carries a
//!   short tag ID. Name and blood group stay readable without the PIN.
//! - **Serverless**: the whole profile is packed into a compact record string,
//!   sealed under the PIN and embedded in the QR code's URL. No backend lookup.
//!
//! ## Record format
//!
//! ```text
//! numericPart-binaryPart-name-contactPart
//! ```
//!
//! - `numericPart`: base62 of `DOB(8) ∥ height(3) ∥ weight(3) ∥ blood(1) ∥ substance(1)`
//! - `binaryPart`: base62 of a 17-bit flag vector, or the sentinel `"0"`
//! - `contactPart`: base62 of the emergency phone number
//!
//! ## Example Usage
//!
//! ```rust
//! use opentag::codec::{decode_record, encode_profile};
//! use opentag::cipher::{CipherMethod, Pin};
//! use opentag::profile::{BloodGroup, MedicalProfile, SubstanceUse};
//! use chrono::NaiveDate;
//!
//! let profile = MedicalProfile::new(
//!     "Jane Roe",
//!     NaiveDate::from_ymd_opt(1990, 5, 15).unwrap(),
//!     175,
//!     70,
//!     BloodGroup::OPositive,
//!     SubstanceUse::Neither,
//!     "5551234567",
//! );
//!
//! let record = encode_profile(&profile).unwrap().assemble();
//! let pin = Pin::parse("0007").unwrap();
//!
//! let sealed = CipherMethod::AesGcm.seal(record.as_bytes(), &pin).unwrap();
//! let opened = CipherMethod::AesGcm.open(&sealed, &pin).unwrap();
//!
//! let decoded = decode_record(&String::from_utf8(opened).unwrap().parse().unwrap()).unwrap();
//! assert_eq!(decoded, profile);
//! ```
//!
//! ## Modules
//!
//! - [`codec`]: base62 integers, fixed-width fields, flag bits, record assembly
//! - [`cipher`]: PIN handling, legacy XOR and AES-GCM envelopes, transport encodings
//! - [`profile`]: the medical profile model, catalogs and derived metrics
//! - [`store`]: the record store contract used by online tags
//! - [`issue`]: building tags from a profile
//! - [`resolve`]: the scan-side state machine for both delivery modes
//! - [`config`]: CLI configuration file

pub mod cipher;
pub mod codec;
pub mod config;
pub mod issue;
pub mod profile;
pub mod resolve;
pub mod store;

// Re-export commonly used types at the crate root
pub use cipher::{CipherEnvelope, CipherError, CipherMethod, Pin, PinEntry, PinError};
pub use codec::{decode_record, encode_profile, CodecError, EncodedRecord};
pub use issue::{issue, DeliveryMode, IssueError, Issued};
pub use profile::{BloodGroup, MedicalProfile, SubstanceUse};
pub use resolve::{
    resolve, PinPrompt, PinProvider, ResolutionState, ResolveError, Resolver, ScriptedPins,
    ServerlessPayload, TagSource,
};
pub use store::{FileStore, MemoryStore, RecordStore, StoreError, StoredRecord};
