//! # Shipped Probe Strategies
//!
//! One probe per well-known machine type, plus the registry builder that
//! binds them. The checks are simulated; swapping in a real transport
//! means implementing [`Probe`] and binding it here or in a caller's own
//! registry.
//!
//! [`Probe`]: diagr_core::machine::Probe

mod checks;
mod generic;
mod network_device;
mod server;

pub use generic::GenericProbe;
pub use network_device::NetworkDeviceProbe;
pub use server::ServerProbe;

use std::sync::Arc;

use diagr_common::machine::machine_type::MachineType;
use diagr_core::machine::{Probe, ProbeRegistry};

/// Registry with the three shipped bindings; the generic probe doubles as
/// the fallback for permitted unknown types.
pub fn default_registry() -> ProbeRegistry {
    let mut registry = ProbeRegistry::new();
    registry.bind(MachineType::server(), Arc::new(ServerProbe));
    registry.bind(MachineType::network_device(), Arc::new(NetworkDeviceProbe));

    let generic: Arc<dyn Probe> = Arc::new(GenericProbe);
    registry.bind(MachineType::generic(), generic.clone());
    registry.set_fallback(generic);
    registry
}
