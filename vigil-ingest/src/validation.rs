//! Upload date preconditions, checked before any write.

use chrono::NaiveDate;

use vigil_core::errors::{ValidationError, VigilResult};
use vigil_core::types::UploadContext;

/// A scan must not be dated in the future, and must be strictly newer
/// than everything already ingested for the product/plugin pair. The
/// one exception is an overwrite of the exact same day.
pub fn validate_dates(
    ctx: &UploadContext,
    max_last_update: Option<NaiveDate>,
    today: NaiveDate,
) -> VigilResult<()> {
    if ctx.scan_date > today {
        return Err(ValidationError::FutureScanDate {
            scan_date: ctx.scan_date,
        }
        .into());
    }
    if let Some(last_update) = max_last_update {
        let same_day_overwrite = ctx.overwrite && ctx.scan_date == last_update;
        if !same_day_overwrite && ctx.scan_date <= last_update {
            return Err(ValidationError::StaleScanDate {
                scan_date: ctx.scan_date,
                last_update,
            }
            .into());
        }
    }
    Ok(())
}
