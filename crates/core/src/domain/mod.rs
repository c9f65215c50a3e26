pub mod answer;
pub mod category;
pub mod evidence;
pub mod query;
pub mod response;
pub mod verdict;

pub use answer::DraftAnswer;
pub use category::Category;
pub use evidence::{Evidence, EvidenceValue};
pub use query::{Audience, ParseAudienceError, Query, QueryContext, RequestId};
pub use response::Response;
pub use verdict::{Decision, GuardrailKind, GuardrailVerdict, Outcome};
