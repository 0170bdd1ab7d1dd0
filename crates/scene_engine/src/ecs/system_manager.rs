//! System manager
//!
//! Runs registered systems in a fixed order. Systems handed over by the
//! application run first, in the order given; systems the engine registers
//! for itself run after them.

use super::error::EcsError;
use super::system::{System, SystemContext};

/// Ordered collection of systems
#[derive(Default)]
pub struct SystemManager {
    external: Vec<Box<dyn System>>,
    internal: Vec<Box<dyn System>>,
    initialized: bool,
}

impl SystemManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register application systems; they run before engine systems
    pub fn register_systems(&mut self, systems: Vec<Box<dyn System>>) {
        for system in &systems {
            log::info!("Registered system {}", system.name());
        }
        self.external.extend(systems);
    }

    /// Register an engine-owned system
    pub fn register_system<S: System + 'static>(&mut self, system: S) {
        log::info!("Registered engine system {}", system.name());
        self.internal.push(Box::new(system));
    }

    fn systems_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn System>> {
        self.external.iter_mut().chain(self.internal.iter_mut())
    }

    /// Names of every system in execution order
    pub fn system_names(&self) -> Vec<&str> {
        self.external
            .iter()
            .chain(self.internal.iter())
            .map(|system| system.name())
            .collect()
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.external.len() + self.internal.len()
    }

    /// Initialize every system once
    pub fn init(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        if self.initialized {
            return Ok(());
        }
        for system in self.systems_mut() {
            system.init(ctx)?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Run one frame: each system does pre-update, update and post-update in
    /// turn
    pub fn update(&mut self, ctx: &mut SystemContext<'_>, delta_time: f32) -> Result<(), EcsError> {
        for system in self.systems_mut() {
            system.pre_update(ctx)?;
            system.update(ctx, delta_time)?;
            system.post_update(ctx)?;
        }
        Ok(())
    }

    /// Shut every system down. All systems are visited; the first error is
    /// returned.
    pub fn shutdown(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        let mut first_error = None;
        for system in self.systems_mut() {
            if let Err(err) = system.shutdown(ctx) {
                log::warn!("System {} failed to shut down: {}", system.name(), err);
                first_error.get_or_insert(err);
            }
        }
        self.initialized = false;
        first_error.map_or(Ok(()), Err)
    }
}
