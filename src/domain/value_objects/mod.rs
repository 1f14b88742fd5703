pub mod amount;
pub mod order;
pub mod params;
pub mod positional;
