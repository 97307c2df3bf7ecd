mod commune;
mod result;

pub use commune::CommuneRecord;
pub use result::{ResultRecord, SOURCE_HUBEAU};
