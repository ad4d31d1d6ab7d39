mod ids;
mod paragraph;
mod record;
mod result;
mod session;
mod settings;

pub use ids::{ParagraphId, ParseIdError, ResultId};
pub use paragraph::{Paragraph, ParagraphError};
pub use record::{ParagraphRecord, RecordError, ResultRecord};
pub use result::{QuizResult, SentenceProgress};
pub use session::{Judgement, Mismatch, QuizSession, SessionError, SessionPhase};
pub use settings::{QuizSettings, QuizSettingsDraft, SettingsError};
