//! Clock readings at the precision PostgreSQL stores.

use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;

/// Current UTC time truncated to microseconds, so a freshly built record
/// equals the same record read back from `timestamptz`.
pub(crate) fn stored_now(clock: &dyn Clock) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(6)
}
