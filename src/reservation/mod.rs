pub mod draft;
pub mod record;
pub mod timestamp;

pub use draft::ReservationDraft;
pub use record::ReservationRecord;
pub use timestamp::parse_timestamp;
