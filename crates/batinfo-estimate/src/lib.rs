//! Battery estimates for batinfo
//!
//! Pure computations behind the battery screen: the displayed current charge,
//! the remaining-time estimate, validation of the two user overrides, and the
//! sectioned report the viewer renders.

pub mod estimate;
pub mod input;
pub mod report;

pub use estimate::{
    RemainingTime, actual_capacity, current_capacity, estimate_remaining, format_current_charge,
    health_percent, parse_capacity,
};
pub use input::{EditOutcome, EditState, OverrideEditor, OverrideField, Validation, validate};
pub use report::{BatteryReport, ReportInputs, Row, RowAction, Section, Strings};
