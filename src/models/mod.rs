//! Rostering domain models.
//!
//! Provides the core data types for representing a rostering problem
//! and its rendered solution.
//!
//! # Domain Mappings
//!
//! | u-roster | Hospital | Retail | Support desk |
//! |----------|----------|--------|--------------|
//! | Staff | Doctor/Nurse | Cashier | Agent |
//! | Specialty | Cardiology | Checkout | Tier-2 |
//! | LeaveInterval | Annual leave | Day off | PTO |
//! | RosterResult | Duty roster | Shift plan | On-call rota |

mod availability;
mod calendar;
mod request;
mod roster;
mod staff;

pub use availability::{Availability, LeaveInterval};
pub use calendar::{
    date_range, is_weekend, DayInfo, HolidayCalendar, HolidayTable, InLieuPolicy, NoHolidays,
    RosterCalendar,
};
pub use request::{GenerateRosterRequest, RosterRules, Strategy};
pub use roster::{AlgorithmUsed, DayRoster, RosterResult, SolveDiagnostics};
pub use staff::{distinct_specialties, Staff};
