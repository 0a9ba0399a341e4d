//! Derived views: pure folds over already-fetched records.
//!
//! No builder performs I/O or keeps state between calls; the same input
//! always yields the same output.

pub mod bookings;
pub mod category;
pub mod financial;
pub mod reviews;
pub mod score;

pub use bookings::{BookingStats, booking_stats};
pub use category::{
    CategoryRollupOptions, CategoryTotal, StatusScope, UNCATEGORIZED, category_rollup,
};
pub use financial::{FinancialSummary, MonthBucket, MonthlyRollup, month_label, monthly_rollup, summary};
pub use reviews::{RatingSummary, rating_summary};
pub use score::{
    Checklist, ChecklistItem, CompletionScore, deployment_checklist, provider_profile_checklist,
};
