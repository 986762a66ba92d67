/*
[INPUT]:  Persisted session tokens
[OUTPUT]: Decoded claims, expiry status and session state
[POS]:    Session layer - client-side session gating
[UPDATE]: When token format or gating policy changes
*/

pub mod guard;
pub mod token;

pub use guard::{ExpiryPolicy, ProfileFailurePolicy, ProfileFetcher, SessionGuard, SessionState};
pub use token::{TokenPayload, decode, is_expired, is_expired_at, time_until_expiry, time_until_expiry_at};
