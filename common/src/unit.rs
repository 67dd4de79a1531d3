//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity modification.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker type describing an entity cancellation.
#[derive(Clone, Copy, Debug)]
pub struct Cancellation;

/// Marker type describing a car pickup.
#[derive(Clone, Copy, Debug)]
pub struct Pickup;

/// Marker type describing a car return.
#[derive(Clone, Copy, Debug)]
pub struct Return;

/// Marker type describing a client not showing up.
#[derive(Clone, Copy, Debug)]
pub struct NoShow;
