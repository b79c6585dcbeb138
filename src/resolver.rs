//! District -> sat -> inscription resolution against an ord server.

use crate::config::SatIndexConfig;
use crate::district::District;
use crate::inscription_id::InscriptionId;
use crate::metadata::{decode_metadata, MetadataDisplay};
use crate::ord::{OrdEndpoints, SatInscription, SatInscriptions};
use crate::overrides::InscriptionOffsetOverrides;
use crate::sat_index::SatIndexCache;
use crate::traits::NetworkProvider;
use crate::{Result, SatIndexError};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Every step of a district resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictInscription {
    pub district: District,
    pub sat: u64,
    pub offset: u64,
    pub inscription_id: InscriptionId,
}

pub struct SatResolver<N> {
    cache: SatIndexCache<N>,
    endpoints: OrdEndpoints,
    overrides: InscriptionOffsetOverrides,
}

impl<N: NetworkProvider + 'static> SatResolver<N> {
    pub fn new(network: N, config: &SatIndexConfig) -> Result<Self> {
        let cache = SatIndexCache::new(network, config)?;
        Ok(Self::from_parts(
            cache,
            OrdEndpoints::new(&config.ord_url),
            InscriptionOffsetOverrides::new(config.offset_overrides.clone()),
        ))
    }

    pub fn from_parts(
        cache: SatIndexCache<N>,
        endpoints: OrdEndpoints,
        overrides: InscriptionOffsetOverrides,
    ) -> Self {
        Self {
            cache,
            endpoints,
            overrides,
        }
    }

    pub fn cache(&self) -> &SatIndexCache<N> {
        &self.cache
    }

    pub fn endpoints(&self) -> &OrdEndpoints {
        &self.endpoints
    }

    pub async fn resolve_inscription(&self, district: i64) -> Result<InscriptionId> {
        Ok(self.resolve_district(district).await?.inscription_id)
    }

    /// Resolve a district number to its sat, the inscription offset used on
    /// that sat, and the inscription found there.
    pub async fn resolve_district(&self, district: i64) -> Result<DistrictInscription> {
        let district = District::new(district)?;
        let sat = self
            .cache
            .lookup(district)
            .await?
            .ok_or(SatIndexError::DistrictUnmapped(district.number()))?;
        let offset = self.overrides.get(district);
        debug!("{district} is on sat {sat}, looking up inscription {offset}");

        let lookup_failed = |reason: String| SatIndexError::InscriptionLookupFailed {
            sat,
            offset,
            reason,
        };
        let body = self
            .cache
            .network()
            .get(&self.endpoints.sat_inscription_at(sat, offset))
            .await
            .map_err(|e| lookup_failed(e.to_string()))?;
        let reply: SatInscription =
            serde_json::from_slice(&body).map_err(|e| lookup_failed(e.to_string()))?;
        let inscription_id = reply
            .id
            .ok_or_else(|| lookup_failed("no inscription at this offset".to_string()))?;

        info!("{district} resolved to {inscription_id}");
        Ok(DistrictInscription {
            district,
            sat,
            offset,
            inscription_id,
        })
    }

    pub async fn metadata(&self, inscription: &InscriptionId) -> Result<MetadataDisplay> {
        let body = self
            .cache
            .network()
            .get(&self.endpoints.metadata(inscription))
            .await
            .map_err(|e| SatIndexError::MetadataLookupFailed {
                inscription: inscription.to_string(),
                reason: e.to_string(),
            })?;
        Ok(decode_metadata(&body))
    }

    pub async fn sat_inscriptions(&self, sat: u64, page: u64) -> Result<SatInscriptions> {
        let body = self
            .cache
            .network()
            .get(&self.endpoints.sat_inscriptions(sat, page))
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
