pub mod aircraft;
pub mod component;
pub mod equipment;
pub mod escrow;
pub mod events;
pub mod roles;
