//! Threaded interface for generating clabjects in a shared hierarchy.
//!
//! A [`Hierarchy`] itself has no internal locking. This module wraps it in
//! an `Arc<Mutex<_>>` so that several threads may generate clabjects from the
//! same parent. Each generation runs while holding the lock, which serializes
//! the append to the parent's direct instances and its speed bookkeeping.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::construct::{Hierarchy, Instantiation};
use crate::datatype::Clabject;
use crate::error::{ClabjectError, Result};

/// Handle to a generation running on a background thread.
pub struct GenerationHandle {
    name: String,
    started: Instant,
    join: JoinHandle<Result<Clabject>>,
}
impl GenerationHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Elapsed time since the generation was submitted.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
    /// Wait for the generation to finish.
    pub fn join(self) -> Result<Clabject> {
        self.join
            .join()
            .map_err(|_| ClabjectError::Lock(format!("generation of '{}' panicked", self.name)))?
    }
}

#[derive(Clone, Debug)]
pub struct SharedHierarchy(Arc<Mutex<Hierarchy>>);

impl SharedHierarchy {
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self(Arc::new(Mutex::new(hierarchy)))
    }
    fn lock(&self) -> Result<MutexGuard<'_, Hierarchy>> {
        self.0.lock().map_err(|e| ClabjectError::Lock(e.to_string()))
    }
    /// Run a closure with exclusive access to the hierarchy.
    pub fn with<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Hierarchy) -> Result<R>,
    {
        let mut hierarchy = self.lock()?;
        f(&mut hierarchy)
    }
    pub fn generate(&self, parent: &Clabject, instantiation: Instantiation) -> Result<Clabject> {
        self.lock()?.generate(parent, instantiation)
    }
    /// Submit a generation for execution on a background thread.
    pub fn spawn_generate(&self, parent: Clabject, instantiation: Instantiation) -> GenerationHandle {
        let name = instantiation.name().to_owned();
        let shared = self.clone();
        let join = std::thread::spawn(move || {
            debug!(clabject = %instantiation.name(), parent = %parent, "generating on worker thread");
            shared.generate(&parent, instantiation)
        });
        GenerationHandle {
            name,
            started: Instant::now(),
            join,
        }
    }
    /// Take the hierarchy back once no other handle is left.
    pub fn into_inner(self) -> Result<Hierarchy> {
        Arc::try_unwrap(self.0)
            .map_err(|_| ClabjectError::Lock("the hierarchy is still shared".to_owned()))?
            .into_inner()
            .map_err(|e| ClabjectError::Lock(e.to_string()))
    }
}
