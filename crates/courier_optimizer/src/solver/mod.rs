pub mod assignment;
pub mod feasibility;
pub mod optimized_route;
pub mod optimizer_params;
pub mod route_plan;
pub mod route_solver;
