#[derive(Clone, Debug)]
pub struct OptimizerParams {
    /// Travel speed in units per second.
    pub speed: f64,
    pub battery_efficiency: f64,
    /// Battery percentage that must remain once a route is completed.
    pub min_battery_reserve: u8,
    /// Vehicles below this battery percentage are never assigned new orders.
    pub min_assignment_battery: u8,
    /// Cost added per 100 units travelled.
    pub battery_cost_factor: f64,
    /// Cost added when the vehicle is already moving.
    pub workload_penalty: f64,
    pub threads: Threads,
}

pub const DEFAULT_SPEED: f64 = 5.0;
pub const DEFAULT_BATTERY_EFFICIENCY: f64 = 1.0;
pub const DEFAULT_MIN_BATTERY_RESERVE: u8 = 10;
pub const DEFAULT_MIN_ASSIGNMENT_BATTERY: u8 = 20;

impl Default for OptimizerParams {
    fn default() -> Self {
        OptimizerParams {
            speed: DEFAULT_SPEED,
            battery_efficiency: DEFAULT_BATTERY_EFFICIENCY,
            min_battery_reserve: DEFAULT_MIN_BATTERY_RESERVE,
            min_assignment_battery: DEFAULT_MIN_ASSIGNMENT_BATTERY,
            battery_cost_factor: 10.0,
            workload_penalty: 20.0,
            threads: Threads::Single,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}
