//! Resolution engine for bitmap districts.
//!
//! Maps a district number to the satoshi it was inscribed on using the
//! paged, delta-encoded sat index, then asks an ord server which inscription
//! sits on that sat. Inscription metadata is decoded for display with
//! [`decode_metadata`].
//!
//! All I/O goes through [`NetworkProvider`]; [`HttpNetwork`] covers native
//! targets and `WebNetwork` the browser.

pub mod config;
pub mod delta_page;
pub mod district;
pub mod error;
pub mod inscription_id;
pub mod metadata;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock_provider;
#[cfg(not(target_arch = "wasm32"))]
pub mod network;
pub mod ord;
pub mod overrides;
pub mod resolver;
pub mod sat_index;
pub mod traits;
#[cfg(target_arch = "wasm32")]
pub mod wasm;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use bitmap_support::{decode_all, BinaryValueDecoder, ByteReader, DecodeError, Decoded, Value};
pub use config::SatIndexConfig;
pub use delta_page::{reconstruct, DeltaPageParser};
pub use district::{District, DISTRICT_COUNT, PAGE_COUNT, PAGE_SIZE};
pub use error::{Result, SatIndexError};
pub use inscription_id::InscriptionId;
pub use metadata::{decode_metadata, MetadataDisplay, MetadataPayload};
#[cfg(any(test, feature = "test-utils"))]
pub use mock_provider::MockNetwork;
#[cfg(not(target_arch = "wasm32"))]
pub use network::HttpNetwork;
pub use ord::{OrdEndpoints, SatInscription, SatInscriptions};
pub use overrides::InscriptionOffsetOverrides;
pub use resolver::{DistrictInscription, SatResolver};
pub use sat_index::{PageStatus, SatIndexCache};
pub use traits::NetworkProvider;
#[cfg(target_arch = "wasm32")]
pub use web::WebNetwork;
