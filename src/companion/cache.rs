//! Lifetime-bound companion cache.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::panel::ConfigPanel;
use crate::system::{StereoSystem, SystemId};

type CompanionFactory<C> = Box<dyn Fn(&Arc<StereoSystem>) -> C + Send + Sync>;
type SharedEntries<C> = Arc<Mutex<Entries<C>>>;

struct Entries<C> {
    companions: HashMap<SystemId, Weak<C>>,
    /// Systems whose destruction already evicts their entry.
    subscribed: HashSet<SystemId>,
}

impl<C> Default for Entries<C> {
    fn default() -> Self {
        Self {
            companions: HashMap::new(),
            subscribed: HashSet::new(),
        }
    }
}

/// Maps live systems to their companion.
///
/// Neither systems nor companions are kept alive by the cache. An entry is
/// removed when its system is destroyed; a companion dropped by every caller
/// is rebuilt on the next lookup.
pub struct CompanionCache<C> {
    entries: SharedEntries<C>,
    factory: CompanionFactory<C>,
}

impl Default for CompanionCache<ConfigPanel> {
    fn default() -> Self {
        Self::new(ConfigPanel::for_system)
    }
}

impl<C: Send + Sync + 'static> CompanionCache<C> {
    /// Create a cache building companions with `factory`.
    ///
    /// The factory runs under the cache lock and must not call back into
    /// the same cache.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Arc<StereoSystem>) -> C + Send + Sync + 'static,
    {
        Self {
            entries: Arc::new(Mutex::new(Entries::default())),
            factory: Box::new(factory),
        }
    }

    /// Companion for `system`, created on first request.
    ///
    /// Each system is subscribed to at most once, however often its entry
    /// is removed and rebuilt.
    pub fn get(&self, system: &Arc<StereoSystem>) -> Arc<C> {
        let id = system.id();
        let mut entries = self.entries.lock();

        if let Some(companion) = entries.companions.get(&id).and_then(Weak::upgrade) {
            return companion;
        }

        let companion = Arc::new((self.factory)(system));
        let rebuilt = entries
            .companions
            .insert(id, Arc::downgrade(&companion))
            .is_some();

        if entries.subscribed.insert(id) {
            let shared = Arc::downgrade(&self.entries);
            system.on_destroy(move || {
                if let Some(shared) = shared.upgrade() {
                    let mut entries = shared.lock();
                    entries.subscribed.remove(&id);
                    if entries.companions.remove(&id).is_some() {
                        tracing::debug!(system = %id, "Evicted companion of destroyed system");
                    }
                }
            });
        }

        tracing::debug!(system = %id, kind = ?system.kind(), rebuilt, "Created companion");
        companion
    }

    /// Companion for `id` if one is cached and still alive.
    pub fn peek(&self, id: SystemId) -> Option<Arc<C>> {
        self.entries.lock().companions.get(&id).and_then(Weak::upgrade)
    }

    pub fn contains(&self, id: SystemId) -> bool {
        self.entries.lock().companions.contains_key(&id)
    }

    /// Drop the entry for `id`. Returns whether one was present.
    pub fn remove(&self, id: SystemId) -> bool {
        self.entries.lock().companions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().companions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().companions.is_empty()
    }
}
