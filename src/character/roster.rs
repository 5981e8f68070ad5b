//! Lifecycle and change detection for a set of characters.
//!
//! The application shell hands the roster the full list of characters it
//! wants on screen each update. The roster spawns newcomers, rebuilds
//! characters whose asset changed, forwards changed inputs to the matching
//! instance setters and despawns characters that left. A character that fails
//! to set up is reported and skipped; its siblings are unaffected.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::assets::SharedAsset;
use crate::character::instance::CharacterInstance;
use crate::character::props::CharacterProps;
use crate::character::settings::CharacterSettings;
use crate::errors::TroupeError;
use crate::scene::Scene;

/// Outcome of one [`CharacterRoster::sync`] call. Ids appear in input order,
/// except `despawned`, which is sorted.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub spawned: Vec<String>,
    pub rebuilt: Vec<String>,
    pub updated: Vec<String>,
    pub despawned: Vec<String>,
    pub failed: Vec<(String, TroupeError)>,
}

impl SyncReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

struct RosterEntry {
    instance: CharacterInstance,
    props: CharacterProps,
    /// Requested asset whose rebuild already failed; not retried while it
    /// stays requested
    failed_asset: Option<SharedAsset>,
}

#[derive(Default)]
pub struct CharacterRoster {
    settings: CharacterSettings,
    entries: FxHashMap<String, RosterEntry>,
    /// Characters whose spawn failed, with the asset that failed
    failed_spawns: FxHashMap<String, SharedAsset>,
}

impl CharacterRoster {
    #[must_use]
    pub fn new(settings: CharacterSettings) -> Self {
        Self {
            settings,
            entries: FxHashMap::default(),
            failed_spawns: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &CharacterSettings {
        &self.settings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CharacterInstance> {
        self.entries.get(id).map(|e| &e.instance)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Brings the roster in line with `characters`.
    ///
    /// Characters missing from the list are despawned. When an id appears
    /// more than once the last entry wins.
    pub fn sync<'a, I>(&mut self, scene: &mut Scene, characters: I) -> SyncReport
    where
        I: IntoIterator<Item = (&'a CharacterProps, &'a SharedAsset)>,
    {
        let mut report = SyncReport::default();
        let mut wanted: FxHashSet<&str> = FxHashSet::default();

        for (props, asset) in characters {
            wanted.insert(&props.character_id);
            self.upsert(scene, props, asset, &mut report);
        }

        let mut leaving: Vec<String> = self
            .entries
            .keys()
            .filter(|id| !wanted.contains(id.as_str()))
            .cloned()
            .collect();
        leaving.sort();

        for id in leaving {
            if let Some(entry) = self.entries.remove(&id) {
                entry.instance.despawn(scene);
                report.despawned.push(id);
            }
        }
        self.failed_spawns.retain(|id, _| wanted.contains(id.as_str()));

        report
    }

    /// Despawns one character. Returns whether it existed.
    pub fn remove(&mut self, scene: &mut Scene, id: &str) -> bool {
        self.failed_spawns.remove(id);
        match self.entries.remove(id) {
            Some(entry) => {
                entry.instance.despawn(scene);
                true
            }
            None => false,
        }
    }

    /// Despawns every character.
    pub fn clear(&mut self, scene: &mut Scene) {
        for (_, entry) in self.entries.drain() {
            entry.instance.despawn(scene);
        }
        self.failed_spawns.clear();
    }

    fn upsert(
        &mut self,
        scene: &mut Scene,
        props: &CharacterProps,
        asset: &SharedAsset,
        report: &mut SyncReport,
    ) {
        let id = props.character_id.clone();

        let Some(entry) = self.entries.get_mut(&id) else {
            if self.failed_spawns.get(&id).is_some_and(|failed| Arc::ptr_eq(failed, asset)) {
                return;
            }
            match CharacterInstance::spawn(scene, SharedAsset::clone(asset), props, &self.settings) {
                Ok(instance) => {
                    self.failed_spawns.remove(&id);
                    self.entries.insert(
                        id.clone(),
                        RosterEntry {
                            instance,
                            props: props.clone(),
                            failed_asset: None,
                        },
                    );
                    report.spawned.push(id);
                }
                Err(err) => {
                    log::error!("Failed to spawn character '{id}': {err}");
                    self.failed_spawns.insert(id.clone(), SharedAsset::clone(asset));
                    report.failed.push((id, err));
                }
            }
            return;
        };

        // Asset identity first: a rebuild re-applies height itself
        let mut rebuilt = false;
        if entry.instance.uses_asset(asset) {
            entry.failed_asset = None;
        } else if !entry.failed_asset.as_ref().is_some_and(|failed| Arc::ptr_eq(failed, asset)) {
            match entry.instance.set_asset(scene, SharedAsset::clone(asset)) {
                Ok(done) => {
                    rebuilt = done;
                    entry.failed_asset = None;
                }
                Err(err) => {
                    log::error!("Failed to rebuild character '{id}' from asset '{}': {err}", asset.name);
                    entry.failed_asset = Some(SharedAsset::clone(asset));
                    report.failed.push((id.clone(), err));
                }
            }
        }

        let changed = apply_changes(scene, &mut entry.instance, &entry.props, props);
        entry.props = props.clone();

        if rebuilt {
            report.rebuilt.push(id);
        } else if changed {
            report.updated.push(id);
        }
    }
}

/// Forwards every input that differs between `old` and `new`. Returns whether
/// anything was forwarded.
fn apply_changes(
    scene: &mut Scene,
    instance: &mut CharacterInstance,
    old: &CharacterProps,
    new: &CharacterProps,
) -> bool {
    let mut changed = false;

    if old.position != new.position {
        instance.set_position(scene, new.position);
        changed = true;
    }
    if old.facing_rotation != new.facing_rotation {
        instance.set_facing(scene, new.facing_rotation);
        changed = true;
    }
    if old.morph_weights != new.morph_weights {
        instance.set_morph_weights(scene, new.morph_weights);
        changed = true;
    }
    if old.pose != new.pose {
        instance.set_pose(scene, &new.pose);
        changed = true;
    }
    if old.height != new.height {
        if let Some(height) = new.height {
            instance.set_height(scene, height);
        }
        changed = true;
    }
    if old.character_type != new.character_type || old.model_settings != new.model_settings {
        if let Some(data) = scene.get_user_data_mut(instance.group()) {
            data.character_type.clone_from(&new.character_type);
            data.model_settings.clone_from(&new.model_settings);
        }
        changed = true;
    }

    changed
}
