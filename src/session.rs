//! Import session: one opened archive and its object tree.
//!
//! Loading walks the archive depth first and stores one
//! [`GeometryObject`] per node in an arena, so [`ObjectId`]s follow
//! depth-first pre-order. Updating refreshes every object at the session
//! time; objects are independent and refresh in parallel.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::core::{ArchiveFormat, ArchiveReader, NodeReader};
use crate::geom::{GeometryObject, ObjectId};
use crate::memory::default_formats;
use crate::settings::ImportSettings;
use crate::util::{Chrono, Error, Result};

/// Open `path` with the first format that accepts it.
pub fn open_archive(path: &Path, formats: &[Box<dyn ArchiveFormat>]) -> Result<Box<dyn ArchiveReader>> {
    let mut reasons = Vec::with_capacity(formats.len());
    for format in formats {
        match format.open(path) {
            Ok(archive) => {
                debug!("{} opened as {}", path.display(), format.name());
                return Ok(archive);
            }
            Err(e) => {
                debug!("{} is not {}: {}", path.display(), format.name(), e);
                reasons.push(format!("{}: {}", format.name(), e));
            }
        }
    }
    Err(Error::ArchiveOpen {
        path: path.to_path_buf(),
        reason: if reasons.is_empty() { "no formats registered".into() } else { reasons.join("; ") },
    })
}

/// Outcome of [`Session::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Objects refreshed successfully.
    pub updated: usize,
    /// Objects whose refresh failed; they keep their previous sample.
    pub failed: usize,
}

/// One loaded archive with its object arena.
pub struct Session {
    settings: ImportSettings,
    formats: Vec<Box<dyn ArchiveFormat>>,
    archive: Option<Box<dyn ArchiveReader>>,
    objects: Vec<GeometryObject>,
    current: Option<ObjectId>,
    time: Chrono,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ImportSettings::default())
    }
}

impl Session {
    /// Create an unloaded session using the built-in formats.
    pub fn new(settings: ImportSettings) -> Self {
        Self::with_formats(settings, default_formats())
    }

    /// Create an unloaded session with custom formats, tried in order.
    pub fn with_formats(settings: ImportSettings, formats: Vec<Box<dyn ArchiveFormat>>) -> Self {
        Self {
            settings,
            formats,
            archive: None,
            objects: Vec::new(),
            current: None,
            time: 0.0,
        }
    }

    /// Open the archive at `path`, replacing any loaded one.
    ///
    /// On failure the session is left unloaded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.unload();
        let archive = open_archive(path, &self.formats)?;
        info!("Opened archive: {}", path.display());
        self.load_archive(archive);
        Ok(())
    }

    /// Take ownership of an already opened archive and enumerate it.
    pub fn load_archive(&mut self, archive: Box<dyn ArchiveReader>) {
        self.unload();
        let root = archive.root();
        self.archive = Some(archive);
        self.build_tree(root, None);
        debug!("Enumerated {} objects", self.objects.len());
    }

    /// Drop the archive and every object.
    pub fn unload(&mut self) {
        self.objects.clear();
        self.archive = None;
        self.current = None;
    }

    fn build_tree(&mut self, node: Arc<dyn NodeReader>, parent: Option<ObjectId>) -> ObjectId {
        let id = ObjectId(self.objects.len());
        let num_children = node.num_children();
        self.objects.push(GeometryObject::new(Arc::clone(&node), parent, self.settings.mesh_flags()));
        self.objects[id.0].set_time(self.time);

        for i in 0..num_children {
            match node.child(i) {
                Ok(child) => {
                    let child_id = self.build_tree(child, Some(id));
                    self.objects[id.0].children.push(child_id);
                }
                Err(e) => warn!("Skipping child {} of {}: {}", i, node.full_name(), e),
            }
        }
        id
    }

    /// Check if an archive is loaded.
    pub fn is_loaded(&self) -> bool {
        self.archive.is_some()
    }

    /// Loaded archive.
    pub fn archive(&self) -> Option<&dyn ArchiveReader> {
        self.archive.as_deref()
    }

    /// Settings in effect.
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Replace the settings and push the new flags to every object.
    pub fn set_settings(&mut self, settings: ImportSettings) {
        self.settings = settings;
        let flags = self.settings.mesh_flags();
        for obj in &mut self.objects {
            obj.set_flags(flags);
        }
    }

    /// Root object, when loaded.
    pub fn root(&self) -> Option<ObjectId> {
        (!self.objects.is_empty()).then_some(ObjectId(0))
    }

    /// All objects in depth-first pre-order.
    pub fn objects(&self) -> &[GeometryObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&GeometryObject> {
        self.objects.get(id.0)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GeometryObject> {
        self.objects.get_mut(id.0)
    }

    /// Find an object by full path, e.g. `/group/mesh`.
    pub fn find(&self, path: &str) -> Result<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.full_name() == path)
            .map(ObjectId)
            .ok_or_else(|| Error::ObjectNotFound(path.to_string()))
    }

    /// Visit every object depth first.
    pub fn for_each_object(&self, mut f: impl FnMut(ObjectId, &GeometryObject)) {
        for (i, obj) in self.objects.iter().enumerate() {
            f(ObjectId(i), obj);
        }
    }

    /// Visit the direct children of `id`.
    pub fn for_each_child(&self, id: ObjectId, mut f: impl FnMut(ObjectId, &GeometryObject)) {
        let Some(obj) = self.object(id) else { return };
        for &child in obj.children() {
            if let Some(c) = self.object(child) {
                f(child, c);
            }
        }
    }

    /// Select the object later calls operate on.
    pub fn set_current_object(&mut self, id: ObjectId) -> Result<()> {
        if id.0 >= self.objects.len() {
            return Err(Error::ObjectNotFound(id.to_string()));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Currently selected object.
    pub fn current_object(&self) -> Option<&GeometryObject> {
        self.current.and_then(|id| self.object(id))
    }

    pub fn current_object_mut(&mut self) -> Option<&mut GeometryObject> {
        self.current.and_then(|id| self.objects.get_mut(id.0))
    }

    /// Session time.
    pub fn time(&self) -> Chrono {
        self.time
    }

    /// Set the time every object samples at (floor sample) on the next update.
    pub fn set_time(&mut self, time: Chrono) {
        self.time = time;
        for obj in &mut self.objects {
            obj.set_time(time);
        }
    }

    /// Refresh every object at the session time.
    ///
    /// Failing objects are logged and keep their previous sample.
    pub fn update(&mut self) -> Result<UpdateStats> {
        if !self.is_loaded() {
            return Err(Error::NotLoaded);
        }
        let _span = tracing::info_span!("session_update", time = self.time).entered();

        let failed = self
            .objects
            .par_iter_mut()
            .filter_map(|obj| match obj.update() {
                Ok(_) => None,
                Err(e) => {
                    warn!("Refresh failed for {}: {}", obj.full_name(), e);
                    Some(())
                }
            })
            .count();

        Ok(UpdateStats { updated: self.objects.len() - failed, failed })
    }
}
