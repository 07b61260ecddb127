//! Session State
//!
//! Everything one user's analysis session owns. Passed explicitly to every
//! command handler; nothing is shared between sessions.

use uuid::Uuid;

use crate::config::Settings;
use crate::geo::{CachingGeocoder, PostalIndex};
use crate::store::DonationStore;

pub struct Session {
    pub id: Uuid,
    pub store: DonationStore,
    pub settings: Settings,
    /// Loaded on demand by `sync_postal_index`
    pub geocoder: Option<CachingGeocoder<PostalIndex>>,
    /// Names seen in the last `sync_uploads` call
    pub last_uploaded: Vec<String>,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let id = Uuid::new_v4();
        log::info!("Starting session {}", id);
        Self {
            id,
            store: DonationStore::new(),
            settings,
            geocoder: None,
            last_uploaded: Vec::new(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
