mod datetime;
mod parser;
mod text;

pub use datetime::{parse_date_value, DecodedStart};
pub use parser::{parse_ics, Event, ParseOutcome};
pub use text::{normalize_description, normalize_title};
