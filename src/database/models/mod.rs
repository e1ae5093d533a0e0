pub mod admin;
pub mod record;
pub mod surveyor;

pub use admin::{AdminAccount, NewAdmin};
pub use record::{Record, RecordFields, RecordInput, RecordPatch, RecordPatchInput};
pub use surveyor::SurveyorAccount;
