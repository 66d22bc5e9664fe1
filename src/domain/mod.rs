// Domain layer: deployment model, the privilege capability and the collaborator ports.
// No process spawning or IO lives here.

pub mod model;
pub mod ports;
pub mod privilege;
