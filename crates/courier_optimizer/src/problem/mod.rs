pub mod fleet;
pub mod location;
pub mod order;
pub mod route_point;
pub mod vehicle;
