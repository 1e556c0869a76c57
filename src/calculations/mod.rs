pub mod dependencies;
pub mod duration;
pub mod status;

pub use dependencies::{
    DependencyResolver, PlacedItem, Resolution, ResolutionStrategy, ResolutionWarning,
};
pub use duration::{
    HOURS_PER_WORKING_DAY, MAX_DURATION_HOURS, compute_end_date, end_date_for_hours,
};
pub use status::classify;
